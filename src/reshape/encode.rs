//! RGB frame sink writing an MP4 file.

use std::path::Path;

use ffmpeg::util::frame::video::Video;
use ffmpeg_next::{self as ffmpeg, codec, encoder, format, software, Dictionary, Packet, Rational};
use image::RgbImage;
use tracing::{debug, warn};

use super::canvas;
use crate::error::{Error, Result};

fn encode_err<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::EncodeFailed(format!("{context}: {e}"))
}

/// Writes RGB frames of a fixed size as H.264 (or MPEG-4 Part 2 when the
/// linked FFmpeg has no H.264 encoder) into an MP4 container, one output
/// frame per call at a constant rate.
pub struct FrameEncoder {
    output: format::context::Output,
    encoder: encoder::Video,
    converter: software::scaling::Context,
    stream_index: usize,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    width: u32,
    height: u32,
    next_pts: i64,
}

impl FrameEncoder {
    pub fn create(path: &Path, width: u32, height: u32, frame_rate: Rational) -> Result<Self> {
        super::init()?;

        let mut output = format::output_as(&path, "mp4").map_err(encode_err("open output"))?;
        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        let codec = match encoder::find(codec::Id::H264) {
            Some(codec) => codec,
            None => {
                warn!("no H.264 encoder available, falling back to MPEG-4");
                encoder::find(codec::Id::MPEG4)
                    .ok_or_else(|| Error::EncodeFailed("no usable video encoder".into()))?
            }
        };
        debug!(codec = codec.name(), width, height, %frame_rate, "creating encoder");

        let mut stream = output.add_stream(codec).map_err(encode_err("add stream"))?;
        let stream_index = stream.index();
        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(encode_err("encoder context"))?;
        let encoder_time_base = frame_rate.invert();
        video.set_width(width);
        video.set_height(height);
        video.set_format(format::Pixel::YUV420P);
        video.set_frame_rate(Some(frame_rate));
        video.set_time_base(encoder_time_base);
        if global_header {
            video.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut opts = Dictionary::new();
        opts.set("preset", "medium");
        let encoder = video.open_with(opts).map_err(encode_err("open encoder"))?;
        stream.set_parameters(&encoder);
        stream.set_time_base(encoder_time_base);
        stream.set_avg_frame_rate(frame_rate);

        output.write_header().map_err(encode_err("write header"))?;
        let stream_time_base = output
            .stream(stream_index)
            .ok_or_else(|| Error::EncodeFailed("output stream vanished".into()))?
            .time_base();

        let converter = software::scaling::Context::get(
            format::Pixel::RGB24,
            width,
            height,
            format::Pixel::YUV420P,
            width,
            height,
            software::scaling::Flags::BILINEAR,
        )
        .map_err(encode_err("colour converter"))?;

        Ok(Self {
            output,
            encoder,
            converter,
            stream_index,
            encoder_time_base,
            stream_time_base,
            width,
            height,
            next_pts: 0,
        })
    }

    /// Append one frame; it must match the encoder dimensions.
    pub fn write(&mut self, image: &RgbImage) -> Result<()> {
        if image.dimensions() != (self.width, self.height) {
            return Err(Error::EncodeFailed(format!(
                "frame is {}x{}, encoder expects {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            )));
        }

        let mut rgb = Video::new(format::Pixel::RGB24, self.width, self.height);
        let stride = rgb.stride(0);
        canvas::to_strided(image, stride, rgb.data_mut(0));

        let mut yuv = Video::empty();
        self.converter
            .run(&rgb, &mut yuv)
            .map_err(encode_err("colour conversion"))?;
        yuv.set_pts(Some(self.next_pts));
        self.next_pts += 1;

        self.encoder
            .send_frame(&yuv)
            .map_err(encode_err("send frame"))?;
        self.drain()
    }

    /// Flush the encoder and write the trailer. Returns the frame count.
    pub fn finish(mut self) -> Result<u64> {
        self.encoder.send_eof().map_err(encode_err("send eof"))?;
        self.drain()?;
        self.output
            .write_trailer()
            .map_err(encode_err("write trailer"))?;
        Ok(self.next_pts as u64)
    }

    fn drain(&mut self) -> Result<()> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(encode_err("write packet"))?;
        }
        Ok(())
    }
}
