use crate::queue::CancelToken;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigint(_: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Turn the first Ctrl-C into a batch cancel. A second Ctrl-C gets the
/// default behaviour and ends the process.
#[cfg(unix)]
pub fn cancel_on_interrupt(token: CancelToken) -> std::io::Result<()> {
    use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::SA_RESETHAND,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe
    unsafe { sigaction(Signal::SIGINT, &action) }.map_err(std::io::Error::from)?;

    spawn_watcher(token)
}

#[cfg(not(unix))]
pub fn cancel_on_interrupt(_token: CancelToken) -> std::io::Result<()> {
    Ok(())
}

fn spawn_watcher(token: CancelToken) -> std::io::Result<()> {
    thread::Builder::new()
        .name("avsplit-sigint".to_string())
        .spawn(move || {
            while !INTERRUPTED.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(50));
            }
            info!("Interrupted, cancelling batch");
            token.cancel();
        })?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use nix::sys::signal::{Signal, raise};
    use std::time::Instant;

    #[test]
    fn test_sigint_cancels_token() {
        let token = CancelToken::new();
        cancel_on_interrupt(token.clone()).unwrap();

        raise(Signal::SIGINT).unwrap();

        let started = Instant::now();
        while !token.is_cancelled() && started.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(token.is_cancelled());
    }
}
