//! In-process fixtures for decoder tests: a tiny MPEG4 encoder, a
//! truncated stream, an audio-only WAV and an unparseable file.

use std::path::Path;

/// Encodes `num_frames` synthetic RGB frames into a container at `path`
/// (the extension selects the muxer).
///
/// Frame `i` is filled with a solid color that keeps R > G > B (so the
/// channel order survives the lossy YUV round trip) and that differs per
/// frame (so positional tests can tell frames apart).
pub(crate) fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: f64) {
    ffmpeg_next::init().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();

    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
    let mut ost = octx.add_stream(Some(codec)).unwrap();

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();

    encoder_ctx.set_width(width);
    encoder_ctx.set_height(height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps as i32));
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps as i32, 1)));

    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder_ctx
        .open_with(ffmpeg_next::Dictionary::new())
        .unwrap();
    ost.set_parameters(&encoder);

    octx.write_header().unwrap();

    let ost_time_base = octx.stream(0).unwrap().time_base();

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        ffmpeg_next::format::Pixel::RGB24,
        width,
        height,
        ffmpeg_next::format::Pixel::YUV420P,
        width,
        height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .unwrap();

    for i in 0..num_frames {
        let mut rgb_frame =
            ffmpeg_next::util::frame::video::Video::new(ffmpeg_next::format::Pixel::RGB24, width, height);
        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);

        let shade = (i % 10) as u8 * 8;
        let (r, g, b) = (200 - shade, 120, 40 + shade);
        for row in 0..height as usize {
            for col in 0..width as usize {
                let offset = row * stride + col * 3;
                data[offset] = r;
                data[offset + 1] = g;
                data[offset + 2] = b;
            }
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
        yuv_frame.set_pts(Some(i as i64));

        encoder.send_frame(&yuv_frame).unwrap();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            // Without an explicit duration the mp4 muxer records the last
            // sample as zero-length and the demuxer drops it.
            encoded.set_duration(1);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }
    }

    encoder.send_eof().unwrap();
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.set_duration(1);
        encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
        encoded.write_interleaved(&mut octx).unwrap();
    }

    octx.write_trailer().unwrap();
}

/// Encodes `num_frames` frames into an AVI at `path`, then cuts off the
/// tail of the file. The AVI header sits at the front and keeps
/// advertising the full frame count, while the packet data behind it ends
/// early, so decoding comes up short of the advertised count.
pub(crate) fn create_truncated_video(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    fps: f64,
) {
    create_test_video(path, num_frames, width, height, fps);

    let len = std::fs::metadata(path).unwrap().len();
    let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(len * 3 / 5).unwrap();
}

/// Writes a minimal valid WAV file (mono, 8 kHz, one second of silence):
/// a container libavformat recognizes but with no video track.
pub(crate) fn create_test_wav(path: &Path) {
    let sample_rate: u32 = 8000;
    let data_len: u32 = sample_rate * 2; // one second of 16-bit mono

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    std::fs::write(path, bytes).unwrap();
}

/// Writes bytes no demuxer will accept.
pub(crate) fn create_garbage_file(path: &Path) {
    std::fs::write(path, b"this is definitely not a media container\n").unwrap();
}
