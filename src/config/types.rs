use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio elementary stream format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Aac,
    /// Do not extract audio
    #[serde(rename = "none")]
    #[value(name = "none")]
    Off,
}

impl AudioFormat {
    /// Output file extension, `None` when audio is not extracted
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            AudioFormat::Mp3 => Some("mp3"),
            AudioFormat::Wav => Some("wav"),
            AudioFormat::Aac => Some("aac"),
            AudioFormat::Off => None,
        }
    }

    /// FFmpeg audio encoder name
    pub fn codec(&self) -> Option<&'static str> {
        match self {
            AudioFormat::Mp3 => Some("libmp3lame"),
            AudioFormat::Wav => Some("pcm_s16le"),
            AudioFormat::Aac => Some("aac"),
            AudioFormat::Off => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != AudioFormat::Off
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().unwrap_or("none"))
    }
}

/// Video elementary stream container. The video stream itself is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    #[default]
    Mp4,
    Mkv,
    Avi,
    /// Do not extract video
    #[serde(rename = "none")]
    #[value(name = "none")]
    Off,
}

impl VideoFormat {
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            VideoFormat::Mp4 => Some("mp4"),
            VideoFormat::Mkv => Some("mkv"),
            VideoFormat::Avi => Some("avi"),
            VideoFormat::Off => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != VideoFormat::Off
    }
}

impl std::fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().unwrap_or("none"))
    }
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,
    /// How long the supervisor waits for output before re-checking cancellation
    pub poll_interval_ms: u64,
}

impl ToolConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            poll_interval_ms: 100,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub audio_format: AudioFormat,
    pub video_format: VideoFormat,
    /// Custom output directory, next to each input when unset
    pub output_directory: Option<String>,
    /// Ask ffmpeg to pick a hardware decoder
    pub hwaccel: bool,
}

/// What happens after a batch finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Open the output directory in the platform file manager
    pub reveal_output: bool,
    /// Ring the terminal bell
    pub sound: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            reveal_output: true,
            sound: true,
        }
    }
}
