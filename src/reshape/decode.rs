use std::path::Path;

use ffmpeg::util::frame::video::Video;
use ffmpeg_next::{self as ffmpeg, codec, decoder, format, media, software, Rational};
use image::RgbImage;

use super::canvas;
use crate::error::{Error, Result};

/// Fallback when the container reports no usable frame rate
pub const DEFAULT_FRAME_RATE: Rational = Rational(30, 1);

fn unreadable<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::SourceUnreadable(format!("{context}: {e}"))
}

/// Read-once, forward-only video stream of a file.
pub struct FrameSource {
    input: format::context::Input,
    decoder: decoder::Video,
    stream_index: usize,
    frame_rate: Option<Rational>,
    resizer: Option<Resizer>,
    eof_sent: bool,
}

/// Cached swscale context, rebuilt when the source geometry changes.
struct Resizer {
    key: (format::Pixel, u32, u32, u32, u32),
    context: software::scaling::Context,
}

impl FrameSource {
    pub fn open(path: &Path) -> Result<Self> {
        super::init()?;

        let input = format::input(&path).map_err(unreadable("open"))?;
        let stream = input
            .streams()
            .best(media::Type::Video)
            .ok_or_else(|| Error::SourceUnreadable("no video stream".into()))?;
        let stream_index = stream.index();

        let frame_rate = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|r| r.numerator() > 0 && r.denominator() > 0);

        let decoder = codec::context::Context::from_parameters(stream.parameters())
            .map_err(unreadable("decoder parameters"))?
            .decoder()
            .video()
            .map_err(unreadable("open decoder"))?;

        Ok(Self {
            input,
            decoder,
            stream_index,
            frame_rate,
            resizer: None,
            eof_sent: false,
        })
    }

    /// Container frame rate, if it reports one
    pub fn frame_rate(&self) -> Option<Rational> {
        self.frame_rate
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /// Decode the next frame in presentation order, `None` once exhausted.
    pub fn next_frame(&mut self) -> Result<Option<Video>> {
        let mut decoded = Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }
            if self.eof_sent {
                return Ok(None);
            }

            let mut fed = false;
            for (stream, packet) in self.input.packets() {
                if stream.index() == self.stream_index {
                    self.decoder
                        .send_packet(&packet)
                        .map_err(unreadable("decode"))?;
                    fed = true;
                    break;
                }
            }
            if !fed {
                self.decoder.send_eof().map_err(unreadable("decode"))?;
                self.eof_sent = true;
            }
        }
    }

    /// Convert a decoded frame to packed RGB at `width` x `height` with
    /// bilinear interpolation.
    pub fn to_rgb(&mut self, frame: &Video, width: u32, height: u32) -> Result<RgbImage> {
        let key = (frame.format(), frame.width(), frame.height(), width, height);
        let resizer = match self.resizer.take() {
            Some(resizer) if resizer.key == key => resizer,
            _ => Resizer {
                key,
                context: software::scaling::Context::get(
                    frame.format(),
                    frame.width(),
                    frame.height(),
                    format::Pixel::RGB24,
                    width,
                    height,
                    software::scaling::Flags::BILINEAR,
                )
                .map_err(unreadable("resizer"))?,
            },
        };
        let resizer = self.resizer.insert(resizer);

        let mut rgb = Video::empty();
        resizer
            .context
            .run(frame, &mut rgb)
            .map_err(unreadable("resize"))?;

        canvas::from_strided(rgb.width(), rgb.height(), rgb.stride(0), rgb.data(0))
            .ok_or_else(|| Error::SourceUnreadable("resized frame has unexpected layout".into()))
    }
}
