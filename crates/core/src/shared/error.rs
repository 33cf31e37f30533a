use std::path::PathBuf;

use thiserror::Error;

use crate::shared::typeinfo::TypeInfo;

/// Everything that can go wrong while opening or decoding a video.
///
/// `Open`, `NoVideoStream` and `UnsupportedCodec` occur at construction
/// time and always surface to the caller. `Decode` and `ReadPastEnd` are
/// raised only when the caller asked for strict reads; non-strict callers
/// get a `false`/partial-count result instead. `BufferShape` is raised
/// unconditionally, before any byte is written.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: ffmpeg_next::Error,
    },

    #[error("no video stream found in {}", path.display())]
    NoVideoStream { path: PathBuf },

    #[error("no decoder available for codec {codec} in {}", path.display())]
    UnsupportedCodec { path: PathBuf, codec: String },

    #[error("buffer ({actual}) does not conform to the video specifications ({expected})")]
    BufferShape { expected: TypeInfo, actual: TypeInfo },

    #[error("failed to decode frame {frame} of {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        frame: usize,
        #[source]
        source: ffmpeg_next::Error,
    },

    #[error(
        "trying to read past the end of {} (next frame would be {frame}, file has {total})",
        path.display()
    )]
    ReadPastEnd {
        path: PathBuf,
        frame: usize,
        total: usize,
    },

    #[error("iterator for {} has already reached its end and was released", path.display())]
    UseAfterEnd { path: PathBuf },
}
