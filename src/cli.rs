use crate::config::{AppConfig, AudioFormat, VideoFormat};
use crate::queue::{
    BatchReport, BatchRunner, LogBuffer, LogLevel, QueueState, RunStatus, SplitJob, WorkerMessage,
};
use crate::splitter::SplitSettings;
use crate::tui;
use crate::utils::{SystemActions, cancel_on_interrupt, format_duration, format_file_size};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "avsplit",
    version,
    about = "Split video files into separate audio and video streams using ffmpeg"
)]
pub struct Cli {
    /// Video files, or directories to search for video files
    pub inputs: Vec<PathBuf>,

    /// Audio output format
    #[arg(short, long, value_enum)]
    pub audio: Option<AudioFormat>,

    /// Video output container
    #[arg(short, long, value_enum)]
    pub video: Option<VideoFormat>,

    /// Write outputs here instead of next to each input
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Let ffmpeg pick a hardware decoder
    #[arg(long)]
    pub hwaccel: bool,

    /// ffmpeg binary to run
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// Use this config file instead of the default one
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not open the output directory when done
    #[arg(long)]
    pub no_reveal: bool,

    /// Do not ring the terminal bell when done
    #[arg(long)]
    pub no_sound: bool,

    /// Print progress lines instead of the interactive view
    #[arg(long)]
    pub plain: bool,

    /// Print the batch report as JSON and nothing else
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Config file values with command line overrides applied
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AppConfig::load(),
        };

        if let Some(ffmpeg) = &self.ffmpeg {
            config.tool.ffmpeg_path = ffmpeg.clone();
        }
        if self.no_reveal {
            config.notify.reveal_output = false;
        }
        if self.no_sound {
            config.notify.sound = false;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn settings(&self, config: &AppConfig) -> SplitSettings {
        SplitSettings {
            audio_format: self.audio.unwrap_or(config.output.audio_format),
            video_format: self.video.unwrap_or(config.output.video_format),
            output_dir: self
                .output_dir
                .clone()
                .or_else(|| config.output.output_directory.as_ref().map(PathBuf::from)),
            hwaccel: self.hwaccel || config.output.hwaccel,
        }
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    let settings = cli.settings(&config);
    let job = SplitJob::new(crate::queue::collect_inputs(&cli.inputs), settings);

    let runner = BatchRunner::new(config, Arc::new(SystemActions));
    let (inputs, rx) = runner.start(job).context("Cannot start batch")?;

    let report = if cli.plain || cli.json {
        // The terminal view reads Ctrl-C as a key; here it arrives as SIGINT
        if let Err(e) = cancel_on_interrupt(runner.cancel_token()) {
            warn!("Ctrl-C will not cancel cleanly: {}", e);
        }
        run_plain(inputs, rx, &runner.log(), cli.json)?
    } else {
        tui::run_tui(&runner, inputs, rx)?
    };

    Ok(exit_code(report.status))
}

fn exit_code(status: RunStatus) -> ExitCode {
    match status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::Cancelled => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}

/// Line-oriented front end: one line per file and per 10% step
fn run_plain(
    inputs: Vec<PathBuf>,
    rx: Receiver<WorkerMessage>,
    log: &LogBuffer,
    json: bool,
) -> Result<BatchReport> {
    let mut state = QueueState::new(inputs);
    let total = state.files.len();
    let mut last_step: Option<(usize, u32)> = None;
    state.start();

    for message in rx {
        if !json {
            print_message(&state, &message, total, &mut last_step);
        }
        state.apply(message);
        if state.is_finished() {
            break;
        }
    }

    let report = state
        .report
        .take()
        .context("Worker stopped without a report")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, log);
    }
    Ok(report)
}

fn print_message(
    state: &QueueState,
    message: &WorkerMessage,
    total: usize,
    last_step: &mut Option<(usize, u32)>,
) {
    let name = |index: usize| {
        state
            .files
            .get(index)
            .map(|f| f.filename())
            .unwrap_or_default()
    };

    match message {
        WorkerMessage::Started(index) => println!("[{}/{}] {}", index + 1, total, name(*index)),
        WorkerMessage::Progress(index, progress) => {
            let step = (*progress / 10.0) as u32 * 10;
            if step > 0 && *last_step != Some((*index, step)) {
                println!("  {:3}%", step);
                *last_step = Some((*index, step));
            }
        }
        WorkerMessage::Done(_, outputs) => {
            for output in outputs {
                println!("  -> {}", output.display());
            }
        }
        WorkerMessage::Error(_, error) => {
            eprintln!("  failed:");
            for line in error.lines() {
                eprintln!("    {}", line);
            }
        }
        WorkerMessage::Cancelled(index) => println!("  cancelled {}", name(*index)),
        WorkerMessage::Finished(_) => {}
    }
}

fn print_summary(report: &BatchReport, log: &LogBuffer) {
    println!();
    println!("{}", report.status);
    println!(
        "  {} succeeded, {} failed, {} unfinished",
        report.succeeded,
        report.failures.len(),
        report.unfinished
    );
    println!(
        "  {} written in {}",
        format_file_size(report.output_bytes),
        format_duration(Duration::from_secs_f64(report.elapsed_secs))
    );
    if log.count(LogLevel::Warn) > 0 {
        for entry in log.entries().iter().filter(|e| e.level == LogLevel::Warn) {
            println!("  ! {}", entry.message);
        }
    }
    for failure in &report.failures {
        let first_line = failure.message.lines().next().unwrap_or_default();
        println!("  ✗ {}: {}", failure.input.display(), first_line);
    }
}
