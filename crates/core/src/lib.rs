//! Sequential video decoding into fixed-shape, channel-major pixel buffers.
//!
//! [`VideoReader`] opens a container, probes its best video stream and
//! exposes decoded frames either one at a time through a restartable
//! [`FrameIterator`] or in bulk through [`VideoReader::load`]. Every frame
//! lands in a caller-supplied `uint8` buffer of shape `(3, height, width)`;
//! bulk loads fill `(frames, 3, height, width)`. Buffer shapes are checked
//! against [`TypeInfo`] descriptors before any byte is written.

pub mod shared;
pub mod video;

pub use shared::error::VideoError;
pub use shared::typeinfo::{Dtype, TypeInfo};
pub use video::iterator::FrameIterator;
pub use video::metadata::VideoMetadata;
pub use video::reader::VideoReader;
pub use video::session::{DecodeOutcome, DecoderSession};
