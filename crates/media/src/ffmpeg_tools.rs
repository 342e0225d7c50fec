//! This module contains the FFmpeg implementations of the [codec] traits and a
//! demuxer that fills a [PacketQueue] from a video file.
//!
//! [codec]: crate::codec

use std::path::Path;
#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicBool, Ordering};

use ctor::ctor;

use ffmpeg::codec::Context as FFmpegCodecContext;
use ffmpeg::codec::Parameters as FFmpegCodecParameters;
use ffmpeg::codec::decoder::Video as FFmpegVideoDecoder;
use ffmpeg::format::Pixel as FFmpegPixelFormat;
use ffmpeg::format::context::Input as FFmpegInputFormatContext;
use ffmpeg::format::stream::Stream as FFmpegStream;
use ffmpeg::frame::Video as FFmpegVideoFrame;
use ffmpeg::media::Type as FFmpegMediaType;
use ffmpeg::software::scaling::Context as FFmpegScalingContext;
use ffmpeg::software::scaling::flag::Flags as FFmpegScalingFlags;
use ffmpeg_next as ffmpeg;

use crate::codec::{CodecStatus, DecodedPicture, Rescaler, StreamDescriptor, VideoCodec};
use crate::config::ScalingFilter;
use crate::errors::VideoStreamError;
use crate::frame::{Dimensions, RgbaFrameBuffer};
use crate::packet::{EncodedPacket, PacketQueue};
use crate::time::Rational;

/// A [DecodedPicture] stored in an FFmpeg video frame.
pub struct FFmpegPicture(FFmpegVideoFrame);

impl FFmpegPicture {
    /// The underlying [FFmpegVideoFrame] ([ffmpeg::frame::Video]).
    pub fn as_ffmpeg_frame(&self) -> &FFmpegVideoFrame {
        &self.0
    }
}

impl DecodedPicture for FFmpegPicture {
    fn best_effort_timestamp(&self) -> Option<i64> {
        self.0.timestamp()
    }

    fn size(&self) -> (u32, u32) {
        (self.0.width(), self.0.height())
    }
}

/// A [VideoCodec] backed by an FFmpeg video decoder.
///
/// FFmpeg decoders take whole packets and hand pictures back separately, so a
/// decode call either consumes all of a packet (it was accepted) or none of it
/// (the decoder is full and wants pictures taken out first). Each call takes
/// out at most one picture.
pub struct FFmpegVideoCodec {
    decoder: FFmpegVideoDecoder,
    descriptor: StreamDescriptor,
}

impl FFmpegVideoCodec {
    /// Create a decoder for a stream of an opened input.
    pub fn from_stream(stream: &FFmpegStream) -> Result<Self, VideoStreamError> {
        Self::from_parameters(stream.parameters(), stream.time_base(), stream.start_time())
    }

    /// Create a decoder from a stream's codec parameters, time base and start
    /// time ([ffmpeg::ffi::AV_NOPTS_VALUE] if unknown).
    pub fn from_parameters(
        parameters: FFmpegCodecParameters,
        time_base: ffmpeg::Rational,
        start_time: i64,
    ) -> Result<Self, VideoStreamError> {
        // This gathers the information we'll need for decoding the stream (e.g.
        // codec, resolution). We need this to create a decoder.
        let decoder_context = FFmpegCodecContext::from_parameters(parameters)
            .map_err(|_| VideoStreamError::DecoderCreateFailure)?;

        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|_| VideoStreamError::DecoderCreateFailure)?;

        let dimensions = Dimensions::new(decoder.width(), decoder.height())
            .ok_or_else(|| VideoStreamError::ZeroLengthSide(decoder.width(), decoder.height()))?;

        let descriptor = StreamDescriptor {
            dimensions,
            time_base: Rational::new(time_base.numerator(), time_base.denominator()),
            start_time: (start_time != ffmpeg::ffi::AV_NOPTS_VALUE).then_some(start_time),
        };

        Ok(Self {
            decoder,
            descriptor,
        })
    }

    /// The decoder's native pixel format.
    pub fn format(&self) -> FFmpegPixelFormat {
        self.decoder.format()
    }

    fn send(&mut self, packet: &EncodedPacket) -> Result<usize, VideoStreamError> {
        // An empty packet would tell the decoder the stream is over.
        if packet.remaining_len() == 0 {
            return Ok(0);
        }

        let mut ffmpeg_packet = ffmpeg::Packet::copy(packet.remaining());
        ffmpeg_packet.set_pts(packet.pts());
        ffmpeg_packet.set_dts(packet.dts());

        match self.decoder.send_packet(&ffmpeg_packet) {
            Ok(()) => Ok(packet.remaining_len()),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::ffi::EAGAIN => Ok(0),
            Err(_) => Err(VideoStreamError::DecodeFailure),
        }
    }

    fn receive(&mut self, picture: &mut FFmpegPicture) -> Result<bool, VideoStreamError> {
        match self.decoder.receive_frame(&mut picture.0) {
            Ok(()) => Ok(true),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::ffi::EAGAIN => Ok(false),
            Err(ffmpeg::Error::Eof) => Ok(false),
            Err(_) => Err(VideoStreamError::DecodeFailure),
        }
    }
}

impl VideoCodec for FFmpegVideoCodec {
    type Picture = FFmpegPicture;
    type Rescaler = FFmpegRescaler;

    fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }

    fn alloc_picture(&self) -> Result<FFmpegPicture, VideoStreamError> {
        let frame = FFmpegVideoFrame::empty();

        // SAFETY: The pointer is only compared, never dereferenced.
        if unsafe { frame.as_ptr() }.is_null() {
            return Err(VideoStreamError::PictureAllocFailure);
        }

        Ok(FFmpegPicture(frame))
    }

    fn create_rescaler(
        &self,
        dimensions: Dimensions,
        filter: ScalingFilter,
    ) -> Result<FFmpegRescaler, VideoStreamError> {
        FFmpegRescaler::new(self.format(), dimensions, filter)
    }

    fn decode(
        &mut self,
        packet: &EncodedPacket,
        picture: &mut FFmpegPicture,
    ) -> Result<CodecStatus, VideoStreamError> {
        let consumed = self.send(packet)?;
        let got_picture = self.receive(picture)?;

        Ok(CodecStatus {
            consumed,
            got_picture,
        })
    }

    fn flush(&mut self) {
        self.decoder.flush();
    }
}

/// A [Rescaler] that converts FFmpeg pictures to RGBA.
///
/// If the source format is already RGBA no scaler is created and rows are
/// just copied over.
pub struct FFmpegRescaler {
    dimensions: Dimensions,
    scaler: Option<(FFmpegScalingContext, FFmpegVideoFrame)>,
}

impl FFmpegRescaler {
    /// Create a rescaler from `format` at `dimensions` to RGBA at the same
    /// `dimensions`.
    pub fn new(
        format: FFmpegPixelFormat,
        dimensions: Dimensions,
        filter: ScalingFilter,
    ) -> Result<Self, VideoStreamError> {
        if format == FFmpegPixelFormat::RGBA {
            return Ok(Self {
                dimensions,
                scaler: None,
            });
        }

        let scaler = FFmpegScalingContext::get(
            // Src. format:
            format,
            dimensions.width(),
            dimensions.height(),
            // Dest. format:
            FFmpegPixelFormat::RGBA,
            dimensions.width(),
            dimensions.height(),
            scaling_flags(filter),
        )
        .map_err(|_| VideoStreamError::ScalerCreateFailure)?;

        Ok(Self {
            dimensions,
            scaler: Some((scaler, FFmpegVideoFrame::empty())),
        })
    }
}

impl Rescaler for FFmpegRescaler {
    type Picture = FFmpegPicture;

    fn rescale(
        &mut self,
        picture: &FFmpegPicture,
        out: &mut RgbaFrameBuffer,
    ) -> Result<(), VideoStreamError> {
        let (actual_width, actual_height) = picture.size();
        if Dimensions::new(actual_width, actual_height) != Some(self.dimensions) {
            return Err(VideoStreamError::DimensionsChanged {
                expected: self.dimensions,
                actual_width,
                actual_height,
            });
        }

        let rgba = match self.scaler.as_mut() {
            Some((scaler, rgba)) => {
                scaler
                    .run(&picture.0, rgba)
                    .map_err(|_| VideoStreamError::ScaleFailure)?;
                &*rgba
            }
            None if picture.0.format() == FFmpegPixelFormat::RGBA => &picture.0,
            None => return Err(VideoStreamError::ScaleFailure),
        };

        out.copy_from_strided(rgba.data(0), rgba.stride(0))
    }
}

fn scaling_flags(filter: ScalingFilter) -> FFmpegScalingFlags {
    match filter {
        ScalingFilter::FastBilinear => FFmpegScalingFlags::FAST_BILINEAR,
        ScalingFilter::Bilinear => FFmpegScalingFlags::BILINEAR,
        ScalingFilter::Bicubic => FFmpegScalingFlags::BICUBIC,
        ScalingFilter::Point => FFmpegScalingFlags::POINT,
        ScalingFilter::Area => FFmpegScalingFlags::AREA,
    }
}

impl From<&ffmpeg::Packet> for EncodedPacket {
    fn from(packet: &ffmpeg::Packet) -> Self {
        EncodedPacket::new(packet.data().map(<[u8]>::to_vec).unwrap_or_default())
            .with_pts(packet.pts())
            .with_dts(packet.dts())
    }
}

/// Reads a video file's packets for its best video stream.
pub struct VideoInput {
    input_context: FFmpegInputFormatContext,
    video_stream_index: usize,
    ended: bool,
}

impl VideoInput {
    /// Open a video file and pick its best video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VideoStreamError> {
        Self::open_impl(path.as_ref())
    }

    fn open_impl(path: &Path) -> Result<Self, VideoStreamError> {
        // Right now this is just the kind of container (e.g. MP4, MKV). FFmpeg
        // has none of the actual video data yet (only the file's metadata).
        let input_context =
            ffmpeg::format::input(path).map_err(|_| VideoStreamError::NoInputContext)?;

        let video_stream_index = input_context
            .streams()
            .best(FFmpegMediaType::Video)
            .ok_or(VideoStreamError::NoBestVideoStream)?
            .index();

        Ok(Self {
            input_context,
            video_stream_index,
            ended: false,
        })
    }

    /// Create a decoder for the picked video stream.
    pub fn create_codec(&self) -> Result<FFmpegVideoCodec, VideoStreamError> {
        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(VideoStreamError::NoBestVideoStream)?;

        FFmpegVideoCodec::from_stream(&stream)
    }

    /// Whether every packet has been read.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Read packets of the video stream into `queue` until it holds at least
    /// `min_len` packets or the file ends. Returns how many packets were added.
    pub fn fill(&mut self, queue: &PacketQueue, min_len: usize) -> usize {
        let mut added = 0;

        // The packets iterator only borrows the input context, so it can be
        // recreated every time.
        let mut packets = self.input_context.packets();

        while queue.len() < min_len {
            let Some((stream, packet)) = packets.next() else {
                self.ended = true;
                break;
            };

            if stream.index() == self.video_stream_index {
                queue.push(EncodedPacket::from(&packet));
                added += 1;
            }
        }

        added
    }
}

/// Initializes FFmpeg. This happens when the [crate] is loaded.
///
/// You should never actually call this function.
#[ctor]
fn ffmpeg_init() {
    #[cfg(debug_assertions)]
    {
        static ALREADY_INIT: AtomicBool = AtomicBool::new(false);
        assert!(
            !ALREADY_INIT.swap(true, Ordering::SeqCst),
            "Tried to initialize FFmpeg twice. \
            THIS WOULD NOT HAVE BEEN CAUGHT IN A RELEASE BUILD."
        );
    }

    ffmpeg::init().expect("FFmpeg shouldn't fail to initialize.");
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCODED_WIDTH: u32 = 32;
    const ENCODED_HEIGHT: u32 = 32;

    fn dimensions(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    /// Encode `count` intra-only MPEG-4 frames (pts `0..count`, time base
    /// 1/25). Returns the decoder parameters and the packets in order.
    fn encode_frames(count: i64) -> (FFmpegCodecParameters, Vec<EncodedPacket>) {
        let codec = ffmpeg::encoder::find(ffmpeg::codec::Id::MPEG4).unwrap();
        let mut encoder = FFmpegCodecContext::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        encoder.set_width(ENCODED_WIDTH);
        encoder.set_height(ENCODED_HEIGHT);
        encoder.set_format(FFmpegPixelFormat::YUV420P);
        encoder.set_time_base(ffmpeg::Rational(1, 25));
        encoder.set_gop(1);
        encoder.set_max_b_frames(0);
        let mut encoder = encoder.open().unwrap();

        let mut packets = Vec::new();
        let mut ffmpeg_packet = ffmpeg::Packet::empty();

        for pts in 0..=count {
            if pts == count {
                encoder.send_eof().unwrap();
                while encoder.receive_packet(&mut ffmpeg_packet).is_ok() {
                    packets.push(EncodedPacket::from(&ffmpeg_packet));
                }
                break;
            }

            let mut frame =
                FFmpegVideoFrame::new(FFmpegPixelFormat::YUV420P, ENCODED_WIDTH, ENCODED_HEIGHT);
            frame.data_mut(0).fill(16 + pts as u8 * 40);
            frame.data_mut(1).fill(128);
            frame.data_mut(2).fill(128);
            frame.set_pts(Some(pts));

            encoder.send_frame(&frame).unwrap();
            while encoder.receive_packet(&mut ffmpeg_packet).is_ok() {
                packets.push(EncodedPacket::from(&ffmpeg_packet));
            }
        }

        (FFmpegCodecParameters::from(&encoder), packets)
    }

    fn codec_for(parameters: FFmpegCodecParameters) -> FFmpegVideoCodec {
        FFmpegVideoCodec::from_parameters(parameters, ffmpeg::Rational(1, 25), 0).unwrap()
    }

    #[test]
    fn rgba_pictures_are_copied_without_a_scaler() {
        let dimensions = dimensions(2, 2);
        let mut rescaler =
            FFmpegRescaler::new(FFmpegPixelFormat::RGBA, dimensions, ScalingFilter::Bilinear)
                .unwrap();
        assert!(rescaler.scaler.is_none());

        let mut frame = FFmpegVideoFrame::new(FFmpegPixelFormat::RGBA, 2, 2);
        let stride = frame.stride(0);
        for y in 0..2 {
            let row = &mut frame.data_mut(0)[y * stride..y * stride + 8];
            row.fill(y as u8 + 1);
        }

        let mut out = RgbaFrameBuffer::new(dimensions).unwrap();
        rescaler.rescale(&FFmpegPicture(frame), &mut out).unwrap();

        assert_eq!(out.row(0), &[1; 8]);
        assert_eq!(out.row(1), &[2; 8]);
    }

    #[test]
    fn yuv_black_becomes_opaque_black() {
        let dimensions = dimensions(4, 4);
        let mut rescaler =
            FFmpegRescaler::new(FFmpegPixelFormat::YUV420P, dimensions, ScalingFilter::Bilinear)
                .unwrap();

        let mut frame = FFmpegVideoFrame::new(FFmpegPixelFormat::YUV420P, 4, 4);
        frame.data_mut(0).fill(16);
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);

        let mut out = RgbaFrameBuffer::new(dimensions).unwrap();
        rescaler.rescale(&FFmpegPicture(frame), &mut out).unwrap();

        for pixel in out.data().chunks_exact(4) {
            assert!(pixel[..3].iter().all(|&c| c < 8), "{pixel:?} isn't black");
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn pictures_of_another_size_are_rejected() {
        let dimensions = dimensions(2, 2);
        let mut rescaler =
            FFmpegRescaler::new(FFmpegPixelFormat::RGBA, dimensions, ScalingFilter::Bilinear)
                .unwrap();

        let mut frame = FFmpegVideoFrame::new(FFmpegPixelFormat::RGBA, 4, 2);
        frame.data_mut(0).fill(0xFF);

        let mut out = RgbaFrameBuffer::new(dimensions).unwrap();
        let result = rescaler.rescale(&FFmpegPicture(frame), &mut out);

        assert_eq!(
            result,
            Err(VideoStreamError::DimensionsChanged {
                expected: dimensions,
                actual_width: 4,
                actual_height: 2,
            })
        );
        assert!(out.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn every_filter_has_flags() {
        assert_eq!(scaling_flags(ScalingFilter::default()), FFmpegScalingFlags::BILINEAR);
        assert_eq!(scaling_flags(ScalingFilter::Area), FFmpegScalingFlags::AREA);
    }

    #[test]
    fn packets_keep_their_timestamps() {
        let mut ffmpeg_packet = ffmpeg::Packet::copy(&[1, 2, 3]);
        ffmpeg_packet.set_pts(Some(40));
        ffmpeg_packet.set_dts(None);

        let packet = EncodedPacket::from(&ffmpeg_packet);
        assert_eq!(packet.remaining(), &[1, 2, 3]);
        assert_eq!(packet.pts(), Some(40));
        assert_eq!(packet.dts(), None);
    }

    #[test]
    fn codecs_describe_the_encoded_stream() {
        let (parameters, _) = encode_frames(1);
        let codec = FFmpegVideoCodec::from_parameters(
            parameters,
            ffmpeg::Rational(1, 25),
            ffmpeg::ffi::AV_NOPTS_VALUE,
        )
        .unwrap();

        let descriptor = codec.descriptor();
        assert_eq!(descriptor.dimensions, dimensions(ENCODED_WIDTH, ENCODED_HEIGHT));
        assert_eq!(descriptor.time_base, Rational::new(1, 25));
        assert_eq!(descriptor.start_time, None);
    }

    #[test]
    fn packets_are_consumed_whole_or_not_at_all() {
        let (parameters, packets) = encode_frames(4);
        assert_eq!(packets.len(), 4);

        let mut codec = codec_for(parameters);
        let mut picture = codec.alloc_picture().unwrap();
        let mut timestamps = Vec::new();

        for packet in &packets {
            loop {
                let status = codec.decode(packet, &mut picture).unwrap();
                assert!(
                    status.consumed == packet.remaining_len()
                        || (status.consumed == 0 && status.got_picture),
                    "{status:?}"
                );

                if status.got_picture {
                    assert_eq!(picture.size(), (ENCODED_WIDTH, ENCODED_HEIGHT));
                    timestamps.push(picture.best_effort_timestamp());
                }
                if status.consumed > 0 {
                    break;
                }
            }
        }

        // Each call takes out at most one picture, so some may still be
        // buffered, but whatever came out is in presentation order.
        assert!(!timestamps.is_empty());
        assert_eq!(timestamps[0], Some(0));
        assert!(timestamps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn empty_packets_do_not_end_the_stream() {
        let (parameters, packets) = encode_frames(1);
        let mut codec = codec_for(parameters);
        let mut picture = codec.alloc_picture().unwrap();

        let status = codec.decode(&EncodedPacket::new(Vec::new()), &mut picture);
        assert_eq!(
            status,
            Ok(CodecStatus {
                consumed: 0,
                got_picture: false,
            })
        );

        // The decoder still takes packets afterwards.
        let status = codec.decode(&packets[0], &mut picture).unwrap();
        assert_eq!(status.consumed, packets[0].remaining_len());
    }

    #[test]
    fn flushing_discards_earlier_pictures() {
        let (parameters, packets) = encode_frames(4);
        let mut codec = codec_for(parameters);
        let mut picture = codec.alloc_picture().unwrap();

        for packet in &packets[..3] {
            codec.decode(packet, &mut picture).unwrap();
        }
        codec.flush();

        let status = codec.decode(&EncodedPacket::new(Vec::new()), &mut picture);
        assert_eq!(status.map(|status| status.got_picture), Ok(false));

        // Every frame is a keyframe, so decoding can pick up anywhere.
        let mut timestamps = Vec::new();
        for _ in 0..4 {
            let status = codec.decode(&packets[3], &mut picture).unwrap();
            if status.got_picture {
                timestamps.push(picture.best_effort_timestamp());
            }
            if status.consumed > 0 {
                break;
            }
        }
        let status = codec.decode(&EncodedPacket::new(Vec::new()), &mut picture).unwrap();
        if status.got_picture {
            timestamps.push(picture.best_effort_timestamp());
        }

        assert!(!timestamps.is_empty());
        assert!(timestamps.iter().all(|&timestamp| timestamp == packets[3].pts()));
    }
}
