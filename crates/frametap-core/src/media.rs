//! Frame payloads delivered by the native media engine.
//!
//! These are plain data carriers. The native layer fills them in and
//! hands them to listeners; nothing in this crate encodes or decodes media.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFrameType {
    /// 16-bit PCM.
    Pcm16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BytesPerSample {
    TwoBytesPerSample,
}

impl BytesPerSample {
    pub fn bytes(self) -> usize {
        match self {
            BytesPerSample::TwoBytesPerSample => 2,
        }
    }
}

/// A raw audio frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub frame_type: AudioFrameType,
    pub samples_per_channel: usize,
    pub bytes_per_sample: BytesPerSample,
    pub channels: u32,
    pub samples_per_sec: u32,
    /// Interleaved sample data.
    pub buffer: Vec<u8>,
    pub render_time_ms: i64,
    pub avsync_type: i32,
}

impl AudioFrame {
    /// Silent PCM16 frame of the given shape.
    pub fn silence(samples_per_channel: usize, channels: u32, samples_per_sec: u32) -> Self {
        let bytes_per_sample = BytesPerSample::TwoBytesPerSample;
        let len = samples_per_channel * channels as usize * bytes_per_sample.bytes();
        Self {
            frame_type: AudioFrameType::Pcm16,
            samples_per_channel,
            bytes_per_sample,
            channels,
            samples_per_sec,
            buffer: vec![0; len],
            render_time_ms: 0,
            avsync_type: 0,
        }
    }

    /// Frame duration in milliseconds, or 0 for a zero sample rate.
    pub fn duration_ms(&self) -> u64 {
        if self.samples_per_sec == 0 {
            return 0;
        }
        self.samples_per_channel as u64 * 1000 / self.samples_per_sec as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoPixelFormat {
    Default,
    I420,
    Bgra,
    Nv21,
    Rgba,
    Nv12,
    I422,
}

/// Where a locally observed video frame originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoSourceType {
    CameraPrimary,
    CameraSecondary,
    ScreenPrimary,
    ScreenSecondary,
    Custom,
    Remote,
    RtcImagePng,
    RtcImageJpeg,
    RtcImageGif,
    MediaPlayer,
    Transcoded,
    Unknown,
}

/// A raw video frame. Plane layout follows `frame_type`; for I420 all three
/// planes are populated.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub frame_type: VideoPixelFormat,
    pub width: u32,
    pub height: u32,
    pub y_stride: u32,
    pub u_stride: u32,
    pub v_stride: u32,
    pub y_buffer: Vec<u8>,
    pub u_buffer: Vec<u8>,
    pub v_buffer: Vec<u8>,
    pub rotation: i32,
    pub render_time_ms: i64,
}

impl VideoFrame {
    /// Black I420 frame of the given size.
    pub fn black_i420(width: u32, height: u32) -> Self {
        let chroma_w = width.div_ceil(2);
        let chroma_h = height.div_ceil(2);
        Self {
            frame_type: VideoPixelFormat::I420,
            width,
            height,
            y_stride: width,
            u_stride: chroma_w,
            v_stride: chroma_w,
            y_buffer: vec![0; (width * height) as usize],
            u_buffer: vec![128; (chroma_w * chroma_h) as usize],
            v_buffer: vec![128; (chroma_w * chroma_h) as usize],
            rotation: 0,
            render_time_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodecType {
    Vp8,
    H264,
    H265,
    Generic,
    GenericH264,
    Av1,
    Vp9,
    GenericJpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoFrameType {
    BlankFrame,
    KeyFrame,
    DeltaFrame,
    BFrame,
    DroppableFrame,
    UnknownFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoStreamType {
    High,
    Low,
}

/// Metadata accompanying an encoded (pre-decode) video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedVideoFrameInfo {
    pub codec_type: VideoCodecType,
    pub width: u32,
    pub height: u32,
    pub frames_per_second: u32,
    pub frame_type: VideoFrameType,
    pub rotation: i32,
    pub track_id: i32,
    pub capture_time_ms: i64,
    pub decode_time_ms: i64,
    pub uid: u32,
    pub stream_type: VideoStreamType,
}
