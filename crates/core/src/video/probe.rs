use std::path::Path;

use crate::shared::error::VideoError;
use crate::video::metadata::VideoMetadata;

/// libavformat duration unit: microseconds per second.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Process-wide codec library setup. libavformat registration is
/// idempotent and tied to process lifetime; there is no teardown.
pub(crate) fn init_backend(path: &Path) -> Result<(), VideoError> {
    ffmpeg_next::init().map_err(|e| VideoError::Open {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Opens a container, locates its best video stream and extracts static
/// metadata. Opens a decoder to validate codec support and to read the
/// frame geometry, but performs no decoding.
pub fn probe(path: &Path) -> Result<VideoMetadata, VideoError> {
    init_backend(path)?;

    let input = ffmpeg_next::format::input(path).map_err(|e| VideoError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let format_name = input.format().name().to_string();
    let format_long_name = input.format().description().to_string();

    let stream = input
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or_else(|| VideoError::NoVideoStream {
            path: path.to_path_buf(),
        })?;
    let stream_index = stream.index();
    let parameters = stream.parameters();

    let codec =
        ffmpeg_next::decoder::find(parameters.id()).ok_or_else(|| VideoError::UnsupportedCodec {
            path: path.to_path_buf(),
            codec: format!("{:?}", parameters.id()),
        })?;
    let codec_name = codec.name().to_string();
    let codec_long_name = codec.description().to_string();

    let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)
        .and_then(|ctx| ctx.decoder().video())
        .map_err(|_| VideoError::UnsupportedCodec {
            path: path.to_path_buf(),
            codec: codec_name.clone(),
        })?;

    let rate = stream.rate();
    let stream_fps = if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    };

    let duration_us = input.duration().max(0);
    let declared_frames = stream.frames().max(0) as usize;

    // When the container declares a frame count, trust it and derive the
    // rate from count/duration; otherwise estimate the count from the
    // stream rate.
    let (frame_count, fps) = if declared_frames > 0 {
        let fps = if duration_us > 0 {
            declared_frames as f64 * AV_TIME_BASE / duration_us as f64
        } else {
            stream_fps
        };
        (declared_frames, fps)
    } else {
        let estimated = (stream_fps * duration_us as f64 / AV_TIME_BASE).round() as usize;
        (estimated, stream_fps)
    };

    let metadata = VideoMetadata {
        path: path.to_path_buf(),
        stream_index,
        width: decoder.width(),
        height: decoder.height(),
        duration_us,
        frame_count,
        fps,
        format_name,
        format_long_name,
        codec_name,
        codec_long_name,
    };

    log::debug!(
        "probed {}: stream {} {}x{}, {} frames @ {:.2} Hz",
        path.display(),
        metadata.stream_index,
        metadata.width,
        metadata.height,
        metadata.frame_count,
        metadata.fps,
    );

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::test_support::{create_garbage_file, create_test_video, create_test_wav};

    #[test]
    fn test_probe_reads_geometry_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 10, 160, 120, 25.0);

        let meta = probe(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert_eq!(meta.frame_count, 10);
        assert!(meta.fps > 0.0);
        assert!(meta.duration_us > 0);
        assert_eq!(meta.codec_name, "mpeg4");
        assert!(!meta.format_name.is_empty());
    }

    #[test]
    fn test_probe_nonexistent_path_is_open_error() {
        let err = probe(Path::new("/nonexistent/clip.mp4")).unwrap_err();
        assert!(matches!(err, VideoError::Open { .. }), "got {err:?}");
    }

    #[test]
    fn test_probe_garbage_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.mp4");
        create_garbage_file(&path);

        let err = probe(&path).unwrap_err();
        assert!(matches!(err, VideoError::Open { .. }), "got {err:?}");
    }

    #[test]
    fn test_probe_audio_only_container_has_no_video_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        create_test_wav(&path);

        let err = probe(&path).unwrap_err();
        assert!(matches!(err, VideoError::NoVideoStream { .. }), "got {err:?}");
    }
}
