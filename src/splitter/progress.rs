//! Heuristic progress extraction from ffmpeg's diagnostic output.
//!
//! ffmpeg prints the input duration once in its header
//! (`Duration: 00:01:23.45, start: ...`) and then keeps rewriting a status
//! line ending in `\r` that carries the current position (`time=00:00:12.34`).

use regex::Regex;
use std::io::{self, BufRead};
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("duration pattern")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("time pattern")
});

fn captures_to_secs(re: &Regex, line: &str) -> Option<f64> {
    let caps = re.captures(line)?;
    let hours = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let minutes = caps.get(2)?.as_str().parse::<f64>().ok()?;
    let seconds = caps.get(3)?.as_str().parse::<f64>().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Input duration in seconds from a `Duration:` header line
pub fn parse_duration(line: &str) -> Option<f64> {
    captures_to_secs(&DURATION_RE, line)
}

/// Current output position in seconds from a `time=` status line
pub fn parse_time(line: &str) -> Option<f64> {
    captures_to_secs(&TIME_RE, line)
}

/// Turns a stream of diagnostic lines into a bounded, non-decreasing percentage
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    duration: Option<f64>,
    percent: f32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Feed one line. Returns the new percentage when it advanced.
    pub fn feed(&mut self, line: &str) -> Option<f32> {
        if self.duration.is_none()
            && let Some(duration) = parse_duration(line).filter(|d| *d > 0.0)
        {
            self.duration = Some(duration);
            return None;
        }

        let duration = self.duration?;
        let position = parse_time(line)?;
        let percent = ((position / duration) * 100.0).clamp(0.0, 100.0) as f32;

        if percent > self.percent {
            self.percent = percent;
            Some(percent)
        } else {
            None
        }
    }
}

/// Splits a byte stream on both `\r` and `\n`, skipping empty segments
pub struct OutputLines<R> {
    reader: R,
}

impl<R: BufRead> OutputLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };

            if available.is_empty() {
                if line.is_empty() {
                    return None;
                }
                return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
            }

            match available.iter().position(|&b| b == b'\r' || b == b'\n') {
                Some(pos) => {
                    line.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    if !line.is_empty() {
                        return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
                    }
                }
                None => {
                    let len = available.len();
                    line.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }
}
