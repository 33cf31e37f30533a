use std::ptr;

use ndarray::{Array3, ArrayViewMut, IxDyn};

use crate::shared::error::VideoError;
use crate::shared::typeinfo::TypeInfo;
use crate::video::reader::VideoReader;
use crate::video::session::{DecodeOutcome, DecoderSession};

/// Restartable lazy traversal over the frames of one [`VideoReader`].
///
/// An iterator is either active, owning its own [`DecoderSession`] and a
/// cursor pointing at the next frame to produce, or exhausted, owning
/// nothing. The cursor only increases; once the session is released the
/// iterator cannot be reused without being reconstructed from
/// [`VideoReader::begin`].
///
/// Two exhausted iterators compare equal (the end sentinel), an exhausted
/// iterator never equals an active one, and two active iterators are equal
/// only when they come from the same `VideoReader` instance and sit at the
/// same cursor. Iterators from different readers over the same file are
/// never equal.
pub struct FrameIterator<'a> {
    reader: &'a VideoReader,
    session: Option<DecoderSession>,
    cursor: usize,
}

impl<'a> FrameIterator<'a> {
    /// Active iterator at frame 0, or the end sentinel immediately when
    /// the stream has no frames (in which case no session is opened).
    pub(crate) fn begin(reader: &'a VideoReader) -> Result<Self, VideoError> {
        if reader.frame_count() == 0 {
            return Ok(Self::end(reader));
        }
        let session = DecoderSession::open(reader.path())?;
        Ok(Self {
            reader,
            session: Some(session),
            cursor: 0,
        })
    }

    /// The end sentinel: exhausted, no session.
    pub(crate) fn end(reader: &'a VideoReader) -> Self {
        Self {
            reader,
            session: None,
            cursor: 0,
        }
    }

    /// Index of the next frame this iterator would produce. Only
    /// meaningful while the iterator is active.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.session.is_none()
    }

    /// Skips past the next frame without materializing its pixels.
    ///
    /// On success the cursor moves forward; skipping the last frame
    /// releases the session, so advancing `frame_count` times from
    /// `begin()` lands exactly on the end sentinel. A premature end of
    /// stream or a decode failure also releases the session, silently.
    ///
    /// Unlike `advance`, [`read`](Self::read) leaves the session alive when
    /// its cursor reaches `frame_count`; an `advance` on such an iterator
    /// skips nothing and only releases the session. Advancing an already
    /// exhausted iterator is a programming error and returns
    /// [`VideoError::UseAfterEnd`].
    pub fn advance(&mut self) -> Result<(), VideoError> {
        let Some(session) = self.session.as_mut() else {
            return Err(VideoError::UseAfterEnd {
                path: self.reader.path().to_path_buf(),
            });
        };

        let total = self.reader.frame_count();
        if self.cursor >= total {
            self.session = None;
            return Ok(());
        }

        match session.skip_next() {
            DecodeOutcome::Decoded => {
                self.cursor += 1;
                if self.cursor >= total {
                    self.session = None;
                }
                Ok(())
            }
            DecodeOutcome::EndOfStream => {
                self.session = None;
                Ok(())
            }
            DecodeOutcome::Failed(e) => {
                log::warn!(
                    "skip failed at frame {} of {}: {e}",
                    self.cursor,
                    self.reader.path().display()
                );
                self.session = None;
                Ok(())
            }
        }
    }

    /// Decodes the next frame into `sink`, a `(3, height, width)` uint8
    /// buffer written in the sink's own stride layout.
    ///
    /// Returns `Ok(true)` when a frame was written. Past the last frame it
    /// releases the session and returns `Ok(false)`, or
    /// [`VideoError::ReadPastEnd`] when `strict`. A mid-stream decode
    /// failure likewise exhausts the iterator and is reported as `false`
    /// or [`VideoError::Decode`] depending on `strict`. A sink of the
    /// wrong shape is always rejected with [`VideoError::BufferShape`],
    /// before anything is written.
    pub fn read(
        &mut self,
        sink: ArrayViewMut<'_, u8, IxDyn>,
        strict: bool,
    ) -> Result<bool, VideoError> {
        let expected = self.reader.frame_type();
        let actual = TypeInfo::of_view(&sink.view());
        if !expected.is_compatible(&actual) {
            return Err(VideoError::BufferShape {
                expected: expected.clone(),
                actual,
            });
        }

        let Some(session) = self.session.as_mut() else {
            return Err(VideoError::UseAfterEnd {
                path: self.reader.path().to_path_buf(),
            });
        };

        let total = self.reader.frame_count();
        if self.cursor >= total {
            self.session = None;
            if strict {
                return Err(VideoError::ReadPastEnd {
                    path: self.reader.path().to_path_buf(),
                    frame: self.cursor,
                    total,
                });
            }
            return Ok(false);
        }

        match session.decode_next(sink) {
            DecodeOutcome::Decoded => {
                self.cursor += 1;
                Ok(true)
            }
            DecodeOutcome::EndOfStream => {
                self.session = None;
                if strict {
                    Err(VideoError::Decode {
                        path: self.reader.path().to_path_buf(),
                        frame: self.cursor,
                        source: ffmpeg_next::Error::Eof,
                    })
                } else {
                    Ok(false)
                }
            }
            DecodeOutcome::Failed(e) => {
                log::warn!(
                    "decode failed at frame {} of {}: {e}",
                    self.cursor,
                    self.reader.path().display()
                );
                self.session = None;
                if strict {
                    Err(VideoError::Decode {
                        path: self.reader.path().to_path_buf(),
                        frame: self.cursor,
                        source: e,
                    })
                } else {
                    Ok(false)
                }
            }
        }
    }

    /// Duplicates this iterator at the same logical position.
    ///
    /// There is no O(1) clone: a brand-new session is opened and then
    /// skipped forward `cursor` times, so the cost is proportional to the
    /// current position. Cloning an exhausted iterator yields the end
    /// sentinel.
    pub fn try_clone(&self) -> Result<FrameIterator<'a>, VideoError> {
        if self.session.is_none() {
            return Ok(FrameIterator::end(self.reader));
        }
        let mut clone = FrameIterator::begin(self.reader)?;
        for _ in 0..self.cursor {
            if clone.is_exhausted() {
                break;
            }
            clone.advance()?;
        }
        Ok(clone)
    }
}

impl PartialEq for FrameIterator<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.session, &other.session) {
            (None, None) => true,
            (Some(_), Some(_)) => {
                ptr::eq(self.reader, other.reader) && self.cursor == other.cursor
            }
            _ => false,
        }
    }
}

/// Owned-frame traversal: each item is a freshly allocated channel-major
/// `(3, height, width)` array. The natural end of the stream terminates
/// the iteration; a decode failure is yielded once, after which the
/// iterator is exhausted.
impl Iterator for FrameIterator<'_> {
    type Item = Result<Array3<u8>, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        let session = self.session.as_ref()?;
        let (height, width) = (session.height(), session.width());
        let mut frame = Array3::<u8>::zeros((3, height, width));
        match self.read(frame.view_mut().into_dyn(), true) {
            Ok(true) => Some(Ok(frame)),
            Ok(false) => None,
            Err(VideoError::ReadPastEnd { .. }) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
