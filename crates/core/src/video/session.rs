use std::path::Path;

use ndarray::{ArrayView3, ArrayViewMut, IxDyn};

use crate::shared::error::VideoError;
use crate::video::probe::init_backend;

/// Result of one demux-and-decode step.
///
/// Strict and non-strict behavior is not decided here: the session only
/// reports what happened, and the caller (iterator or reader) chooses
/// whether an outcome turns into an error or a soft stop.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// One frame was produced.
    Decoded,
    /// The stream has no more frames.
    EndOfStream,
    /// The codec rejected a packet or frame.
    Failed(ffmpeg_next::Error),
}

/// One live decode context: format context, video decoder, colorspace
/// scaler and scratch buffer. Exclusively owned by a single iterator;
/// concurrent traversals of the same file each open their own session.
pub struct DecoderSession {
    // Field order matters: dropping the session releases the scaler, then
    // the codec context, then the format context.
    scaler: ffmpeg_next::software::scaling::Context,
    decoder: ffmpeg_next::decoder::Video,
    input: ffmpeg_next::format::context::Input,
    decoded: ffmpeg_next::util::frame::video::Video,
    rgb: ffmpeg_next::util::frame::video::Video,
    scratch: Vec<u8>,
    stream_index: usize,
    width: usize,
    height: usize,
    flushing: bool,
}

impl std::fmt::Debug for DecoderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderSession")
            .field("stream_index", &self.stream_index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("flushing", &self.flushing)
            .finish_non_exhaustive()
    }
}

// Safety: DecoderSession is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for DecoderSession {}

impl DecoderSession {
    /// Opens an independent format and codec context against `path`.
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        init_backend(path)?;

        let input = ffmpeg_next::format::input(path).map_err(|e| VideoError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| VideoError::NoVideoStream {
                path: path.to_path_buf(),
            })?;
        let stream_index = stream.index();
        let parameters = stream.parameters();
        let codec_id = parameters.id();

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|_| VideoError::UnsupportedCodec {
                path: path.to_path_buf(),
                codec: format!("{codec_id:?}"),
            })?;

        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| VideoError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            scaler,
            decoder,
            input,
            decoded: ffmpeg_next::util::frame::video::Video::empty(),
            rgb: ffmpeg_next::util::frame::video::Video::empty(),
            scratch: Vec::with_capacity(width as usize * height as usize * 3),
            stream_index,
            width: width as usize,
            height: height as usize,
            flushing: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Decodes the next frame and writes it into `sink` in channel-major
    /// `(3, height, width)` order, honoring the sink's strides. The sink
    /// shape must already have been validated by the caller.
    pub fn decode_next(&mut self, mut sink: ArrayViewMut<'_, u8, IxDyn>) -> DecodeOutcome {
        match self.pump() {
            DecodeOutcome::Decoded => {}
            other => return other,
        }

        if let Err(e) = self.scaler.run(&self.decoded, &mut self.rgb) {
            return DecodeOutcome::Failed(e);
        }

        // libswscale may pad each row; strip the padding into the packed
        // scratch buffer before transposing.
        let stride = self.rgb.stride(0);
        let data = self.rgb.data(0);
        self.scratch.clear();
        for row in 0..self.height {
            let start = row * stride;
            self.scratch
                .extend_from_slice(&data[start..start + self.width * 3]);
        }

        let rows = ArrayView3::from_shape((self.height, self.width, 3), &self.scratch[..])
            .expect("scratch buffer matches frame dimensions");
        sink.assign(&rows.permuted_axes([2, 0, 1]));

        DecodeOutcome::Decoded
    }

    /// Demuxes and decodes the next frame but discards it without running
    /// the colorspace conversion. A cheaper fast-forward with the same
    /// outcome semantics as [`decode_next`](Self::decode_next).
    pub fn skip_next(&mut self) -> DecodeOutcome {
        self.pump()
    }

    /// Feeds packets of the selected stream into the decoder until it
    /// yields a frame (into `self.decoded`), the stream ends, or the codec
    /// reports an error.
    fn pump(&mut self) -> DecodeOutcome {
        loop {
            // Drain a frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                return DecodeOutcome::Decoded;
            }

            if self.flushing {
                // EOF was sent and the decoder is drained.
                return DecodeOutcome::EndOfStream;
            }

            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        if let Err(e) = self.decoder.send_packet(&packet) {
                            return DecodeOutcome::Failed(e);
                        }
                    }
                    // Packets of other streams are discarded undecoded.
                }
                Err(ffmpeg_next::Error::Eof) => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                }
                Err(e) => return DecodeOutcome::Failed(e),
            }
        }
    }
}
