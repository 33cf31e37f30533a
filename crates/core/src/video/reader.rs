use std::fmt;
use std::path::Path;

use ndarray::{ArrayViewMut, Axis, IxDyn};

use crate::shared::error::VideoError;
use crate::shared::typeinfo::TypeInfo;
use crate::video::iterator::FrameIterator;
use crate::video::metadata::VideoMetadata;
use crate::video::probe::probe;

/// Facade over one video file: immutable metadata plus iteration and
/// bulk-load entry points.
///
/// All fields are fixed at [`open`](Self::open) time, so a reader may be
/// shared across threads; every traversal opens its own independent
/// [`crate::DecoderSession`], and distinct iterators never synchronize.
#[derive(Debug)]
pub struct VideoReader {
    metadata: VideoMetadata,
    frame_type: TypeInfo,
    video_type: TypeInfo,
}

impl VideoReader {
    /// Probes the container at `path` and computes the single-frame and
    /// bulk buffer descriptors. Probe failures propagate unmodified.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VideoError> {
        let metadata = probe(path.as_ref())?;
        let frame_type = TypeInfo::frame(metadata.height as usize, metadata.width as usize);
        let video_type = TypeInfo::video(
            metadata.frame_count,
            metadata.height as usize,
            metadata.width as usize,
        );
        Ok(Self {
            metadata,
            frame_type,
            video_type,
        })
    }

    /// Fresh traversal from frame 0. Opens a new decoder session, which
    /// can fail; a zero-frame stream yields the end sentinel directly.
    pub fn begin(&self) -> Result<FrameIterator<'_>, VideoError> {
        FrameIterator::begin(self)
    }

    /// Loop-termination sentinel; owns no decoder resources.
    pub fn end(&self) -> FrameIterator<'_> {
        FrameIterator::end(self)
    }

    /// Decodes the whole stream into `buffer`, a
    /// `(frame_count, 3, height, width)` uint8 buffer, and returns how
    /// many frames were written.
    ///
    /// With `strict = false` (the usual choice for bulk loads) a
    /// mid-stream decode failure stops the loop and the partial count is
    /// returned; with `strict = true` the first failure propagates. A
    /// buffer of the wrong shape is always rejected before any write.
    pub fn load(
        &self,
        mut buffer: ArrayViewMut<'_, u8, IxDyn>,
        strict: bool,
    ) -> Result<usize, VideoError> {
        let actual = TypeInfo::of_view(&buffer.view());
        if !self.video_type.is_compatible(&actual) {
            return Err(VideoError::BufferShape {
                expected: self.video_type.clone(),
                actual,
            });
        }

        let mut it = self.begin()?;
        let mut frames_read = 0;
        while frames_read < self.frame_count() {
            let sink = buffer.index_axis_mut(Axis(0), frames_read);
            if it.read(sink, strict)? {
                frames_read += 1;
            } else {
                break;
            }
        }

        log::debug!(
            "loaded {frames_read} of {} advertised frames from {}",
            self.frame_count(),
            self.path().display()
        );
        Ok(frames_read)
    }

    pub fn path(&self) -> &Path {
        &self.metadata.path
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn frame_count(&self) -> usize {
        self.metadata.frame_count
    }

    pub fn fps(&self) -> f64 {
        self.metadata.fps
    }

    pub fn duration_us(&self) -> i64 {
        self.metadata.duration_us
    }

    pub fn duration_secs(&self) -> f64 {
        self.metadata.duration_secs()
    }

    pub fn format_name(&self) -> &str {
        &self.metadata.format_name
    }

    pub fn codec_name(&self) -> &str {
        &self.metadata.codec_name
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Descriptor a single-frame sink must satisfy: `(3, height, width)`.
    pub fn frame_type(&self) -> &TypeInfo {
        &self.frame_type
    }

    /// Descriptor a bulk-load sink must satisfy:
    /// `(frame_count, 3, height, width)`.
    pub fn video_type(&self) -> &TypeInfo {
        &self.video_type
    }
}

impl fmt::Display for VideoReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.metadata.fmt(f)
    }
}
