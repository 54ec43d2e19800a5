use crate::config::{AudioFormat, VideoFormat};
use std::path::{Path, PathBuf};

/// Output selection shared by every file in a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSettings {
    pub audio_format: AudioFormat,
    pub video_format: VideoFormat,
    /// Next to each input when `None`
    pub output_dir: Option<PathBuf>,
    pub hwaccel: bool,
}

impl SplitSettings {
    /// Number of tool invocations per input file
    pub fn pass_count(&self) -> usize {
        usize::from(self.audio_format.is_enabled()) + usize::from(self.video_format.is_enabled())
    }
}

/// Which elementary stream a pass extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

impl StreamKind {
    pub fn label(&self) -> &'static str {
        match self {
            StreamKind::Audio => "audio",
            StreamKind::Video => "video",
        }
    }
}

/// One planned tool invocation
#[derive(Debug, Clone)]
pub struct PassPlan {
    pub kind: StreamKind,
    pub output: PathBuf,
    pub args: Vec<String>,
}

/// `<dir>/<stem>_<kind>.<ext>`
pub fn output_path(input: &Path, output_dir: Option<&Path>, kind: StreamKind, ext: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir
        .or_else(|| input.parent())
        .unwrap_or(Path::new("."));
    dir.join(format!("{}_{}.{}", stem, kind.label(), ext))
}

fn input_args(input: &Path, hwaccel: bool) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-y".to_string(),
    ];
    if hwaccel {
        args.extend(["-hwaccel".to_string(), "auto".to_string()]);
    }
    args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);
    args
}

/// Build FFmpeg arguments for the audio-only output
pub fn build_audio_args(input: &Path, output: &Path, codec: &str, hwaccel: bool) -> Vec<String> {
    let mut args = input_args(input, hwaccel);
    args.extend([
        "-vn".to_string(),
        "-c:a".to_string(),
        codec.to_string(),
        output.to_string_lossy().to_string(),
    ]);
    args
}

/// Build FFmpeg arguments for the video-only output. The stream is copied.
pub fn build_video_args(input: &Path, output: &Path, hwaccel: bool) -> Vec<String> {
    let mut args = input_args(input, hwaccel);
    args.extend([
        "-an".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        output.to_string_lossy().to_string(),
    ]);
    args
}

/// Plan the passes for one input, audio first
pub fn plan_passes(input: &Path, settings: &SplitSettings) -> Vec<PassPlan> {
    let output_dir = settings.output_dir.as_deref();
    let mut passes = Vec::with_capacity(2);

    if let (Some(ext), Some(codec)) = (
        settings.audio_format.extension(),
        settings.audio_format.codec(),
    ) {
        let output = output_path(input, output_dir, StreamKind::Audio, ext);
        passes.push(PassPlan {
            kind: StreamKind::Audio,
            args: build_audio_args(input, &output, codec, settings.hwaccel),
            output,
        });
    }

    if let Some(ext) = settings.video_format.extension() {
        let output = output_path(input, output_dir, StreamKind::Video, ext);
        passes.push(PassPlan {
            kind: StreamKind::Video,
            args: build_video_args(input, &output, settings.hwaccel),
            output,
        });
    }

    passes
}
