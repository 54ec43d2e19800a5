use crate::error::AppError;
use crate::queue::LogBuffer;
use crate::splitter::{SplitSettings, plan_passes};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Status of a file in the batch
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Waiting to be processed
    Pending,
    /// External tool running
    Splitting { progress: f32 },
    /// All outputs written
    Done,
    /// Not attempted
    Skipped { reason: String },
    /// Tool failed
    Error { message: String },
    /// Stopped by the user while running
    Cancelled { progress: f32 },
}

impl FileStatus {
    /// Contribution of this file to the batch percentage
    pub fn progress(&self) -> f32 {
        match self {
            FileStatus::Pending | FileStatus::Skipped { .. } => 0.0,
            FileStatus::Splitting { progress } | FileStatus::Cancelled { progress } => *progress,
            FileStatus::Done | FileStatus::Error { .. } => 100.0,
        }
    }
}

/// A batch request from the front end
#[derive(Debug, Clone)]
pub struct SplitJob {
    pub inputs: Vec<PathBuf>,
    pub settings: SplitSettings,
}

impl SplitJob {
    pub fn new(inputs: Vec<PathBuf>, settings: SplitSettings) -> Self {
        Self { inputs, settings }
    }

    /// Reject jobs that cannot produce anything, and drop unusable inputs.
    ///
    /// Nothing is spawned here. Returns the inputs that will be processed,
    /// in their original order.
    pub fn validate(&self, log: &LogBuffer) -> Result<Vec<PathBuf>, AppError> {
        if self.inputs.is_empty() {
            return Err(AppError::InvalidJob("no input files given".to_string()));
        }
        if self.settings.pass_count() == 0 {
            return Err(AppError::InvalidJob(
                "select at least one of audio or video output".to_string(),
            ));
        }
        if let Some(dir) = &self.settings.output_dir
            && !dir.is_dir()
        {
            return Err(AppError::InvalidJob(format!(
                "output directory {} does not exist",
                dir.display()
            )));
        }

        let mut candidates = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !input.is_file() {
                log.warn(format!("Skipping {}: file not found", input.display()));
            } else if !is_video_file(input) {
                log.warn(format!("Skipping {}: not a video file", input.display()));
            } else {
                candidates.push(input.clone());
            }
        }

        // No two inputs may write the same output, and no output may replace an input
        let input_set: HashSet<&Path> = candidates.iter().map(PathBuf::as_path).collect();
        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let mut accepted = Vec::with_capacity(candidates.len());
        for input in &candidates {
            if claimed.contains(input) {
                log.warn(format!(
                    "Skipping {}: it would be overwritten by an earlier file's output",
                    input.display()
                ));
                continue;
            }

            let outputs: Vec<PathBuf> = plan_passes(input, &self.settings)
                .into_iter()
                .map(|pass| pass.output)
                .collect();
            if let Some(clash) = outputs
                .iter()
                .find(|o| claimed.contains(*o) || input_set.contains(o.as_path()))
            {
                log.warn(format!(
                    "Skipping {}: output {} is already used in this batch",
                    input.display(),
                    clash.display()
                ));
                continue;
            }

            claimed.extend(outputs);
            accepted.push(input.clone());
        }

        if accepted.is_empty() {
            return Err(AppError::InvalidJob(
                "none of the inputs is a usable video file".to_string(),
            ));
        }
        Ok(accepted)
    }
}

/// Check if a path is a video file
pub fn is_video_file(path: &Path) -> bool {
    const VIDEO_EXTENSIONS: [&str; 9] = [
        "mp4", "mkv", "avi", "mov", "webm", "m4v", "ts", "wmv", "flv",
    ];

    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// True for files named like our own outputs (`<stem>_audio.*`, `<stem>_video.*`)
pub fn is_split_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.ends_with("_audio") || s.ends_with("_video"))
        .unwrap_or(false)
}

/// Expand directories into the video files below them, sorted by path.
/// Outputs of earlier runs found in a directory are left out.
/// Plain file arguments are kept as given so validation can report them.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.file_type().is_file()
                        && is_video_file(e.path())
                        && !is_split_output(e.path())
                })
                .map(|e| e.into_path())
                .collect();
            found.sort();
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AudioFormat, VideoFormat};

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("a.MKV")));
        assert!(is_video_file(Path::new("/x/y.mp4")));
        assert!(!is_video_file(Path::new("notes.txt")));
        assert!(!is_video_file(Path::new("noext")));
    }

    #[test]
    fn test_empty_job_rejected() {
        let job = SplitJob::new(Vec::new(), SplitSettings::default());
        assert!(matches!(
            job.validate(&LogBuffer::new()),
            Err(AppError::InvalidJob(_))
        ));
    }

    #[test]
    fn test_nothing_selected_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SplitSettings {
            audio_format: AudioFormat::Off,
            video_format: VideoFormat::Off,
            ..Default::default()
        };
        let job = SplitJob::new(vec![touch(dir.path(), "a.mp4")], settings);
        assert!(job.validate(&LogBuffer::new()).is_err());
    }

    #[test]
    fn test_all_invalid_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogBuffer::new();
        let job = SplitJob::new(
            vec![touch(dir.path(), "readme.txt"), dir.path().join("gone.mp4")],
            SplitSettings::default(),
        );

        assert!(job.validate(&log).is_err());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_invalid_inputs_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let good = touch(dir.path(), "b.mkv");
        let job = SplitJob::new(
            vec![touch(dir.path(), "readme.txt"), good.clone()],
            SplitSettings::default(),
        );
        assert_eq!(job.validate(&LogBuffer::new()).unwrap(), vec![good]);
    }

    #[test]
    fn test_missing_output_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SplitSettings {
            output_dir: Some(dir.path().join("nope")),
            ..Default::default()
        };
        let job = SplitJob::new(vec![touch(dir.path(), "a.mp4")], settings);
        assert!(job.validate(&LogBuffer::new()).is_err());
    }

    #[test]
    fn test_same_name_in_shared_output_dir_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        for season in ["s1", "s2"] {
            std::fs::create_dir(dir.path().join(season)).unwrap();
        }
        let first = touch(&dir.path().join("s1"), "ep1.mp4");
        let second = touch(&dir.path().join("s2"), "ep1.mp4");

        let log = LogBuffer::new();
        let settings = SplitSettings {
            output_dir: Some(out),
            ..Default::default()
        };
        let job = SplitJob::new(vec![first.clone(), second], settings);

        assert_eq!(job.validate(&log).unwrap(), vec![first]);
        assert_eq!(log.count(crate::queue::LogLevel::Warn), 1);
    }

    #[test]
    fn test_same_stem_next_to_each_other_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mp4 = touch(dir.path(), "a.mp4");
        let mkv = touch(dir.path(), "a.mkv");

        let job = SplitJob::new(vec![mp4.clone(), mkv], SplitSettings::default());
        assert_eq!(job.validate(&LogBuffer::new()).unwrap(), vec![mp4]);
    }

    #[test]
    fn test_output_never_replaces_an_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch(dir.path(), "b.mp4");
        let previous = touch(dir.path(), "b_video.mp4");

        // b.mp4 would write b_video.mp4, which is itself an input
        let job = SplitJob::new(vec![source, previous.clone()], SplitSettings::default());
        assert_eq!(job.validate(&LogBuffer::new()).unwrap(), vec![previous]);
    }

    #[test]
    fn test_duplicate_argument_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let source = touch(dir.path(), "c.mp4");
        let job = SplitJob::new(vec![source.clone(), source], SplitSettings::default());
        assert_eq!(job.validate(&LogBuffer::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_collect_inputs_skips_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let clip = touch(dir.path(), "clip.mp4");
        touch(dir.path(), "clip_video.mp4");
        touch(dir.path(), "clip_audio.aac");

        assert_eq!(collect_inputs(&[dir.path().to_path_buf()]), vec![clip]);
        assert!(is_split_output(Path::new("x/talk_audio.mp3")));
        assert!(!is_split_output(Path::new("x/audio.mp4")));
    }

    #[test]
    fn test_collect_inputs_expands_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("season1");
        std::fs::create_dir(&nested).unwrap();
        let b = touch(&nested, "b.mp4");
        let a = touch(dir.path(), "a.mkv");
        touch(dir.path(), "cover.jpg");

        let explicit = PathBuf::from("/elsewhere/c.avi");
        let inputs = collect_inputs(&[dir.path().to_path_buf(), explicit.clone()]);

        assert_eq!(inputs, vec![a, b, explicit]);
    }
}
