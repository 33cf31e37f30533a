use std::fmt;
use std::path::PathBuf;

/// Static description of a video stream, fixed once the container has been
/// probed. Read-only afterwards, so it is safe to share across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub path: PathBuf,
    pub stream_index: usize,
    pub width: u32,
    pub height: u32,
    /// Container duration in microseconds (`AV_TIME_BASE` units).
    pub duration_us: i64,
    /// Declared by the container when available, otherwise estimated as
    /// `round(fps * duration)`.
    pub frame_count: usize,
    pub fps: f64,
    pub format_name: String,
    pub format_long_name: String,
    pub codec_name: String,
    pub codec_long_name: String,
}

impl VideoMetadata {
    pub fn duration_secs(&self) -> f64 {
        self.duration_us as f64 / 1e6
    }
}

impl fmt::Display for VideoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Video file: {}; Format: {} ({}); Codec: {} ({}); Time: {:.2} s ({} @ {:.2} Hz); Size (w x h): {} x {} pixels",
            self.path.display(),
            self.format_long_name,
            self.format_name,
            self.codec_long_name,
            self.codec_name,
            self.duration_secs(),
            self.frame_count,
            self.fps,
            self.width,
            self.height,
        )
    }
}
