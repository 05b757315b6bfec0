//! Media engine event names and their listener signatures.
//!
//! Every observer callback the native engine can deliver has a marker type
//! here (`OnRecordAudioFrame`, `OnRenderVideoFrame`, ...). The marker ties
//! the event's wire name to the exact callback shape listeners must have,
//! so registering a listener under the wrong event does not compile.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::MediaEngineError;
use crate::media::{AudioFrame, EncodedVideoFrameInfo, VideoFrame, VideoSourceType};

/// The closed set of media engine event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaEngineEventType {
    OnRecordAudioFrame,
    OnPlaybackAudioFrame,
    OnMixedAudioFrame,
    OnEarMonitoringAudioFrame,
    OnPlaybackAudioFrameBeforeMixing,
    OnCaptureVideoFrame,
    OnPreEncodeVideoFrame,
    OnMediaPlayerVideoFrame,
    OnRenderVideoFrame,
    OnTranscodedVideoFrame,
    OnEncodedVideoFrameReceived,
}

/// Observer interface an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    AudioFrame,
    VideoFrame,
    EncodedVideoFrame,
}

impl MediaEngineEventType {
    pub const ALL: [MediaEngineEventType; 11] = [
        Self::OnRecordAudioFrame,
        Self::OnPlaybackAudioFrame,
        Self::OnMixedAudioFrame,
        Self::OnEarMonitoringAudioFrame,
        Self::OnPlaybackAudioFrameBeforeMixing,
        Self::OnCaptureVideoFrame,
        Self::OnPreEncodeVideoFrame,
        Self::OnMediaPlayerVideoFrame,
        Self::OnRenderVideoFrame,
        Self::OnTranscodedVideoFrame,
        Self::OnEncodedVideoFrameReceived,
    ];

    /// Name the native layer uses for this event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnRecordAudioFrame => "onRecordAudioFrame",
            Self::OnPlaybackAudioFrame => "onPlaybackAudioFrame",
            Self::OnMixedAudioFrame => "onMixedAudioFrame",
            Self::OnEarMonitoringAudioFrame => "onEarMonitoringAudioFrame",
            Self::OnPlaybackAudioFrameBeforeMixing => "onPlaybackAudioFrameBeforeMixing",
            Self::OnCaptureVideoFrame => "onCaptureVideoFrame",
            Self::OnPreEncodeVideoFrame => "onPreEncodeVideoFrame",
            Self::OnMediaPlayerVideoFrame => "onMediaPlayerVideoFrame",
            Self::OnRenderVideoFrame => "onRenderVideoFrame",
            Self::OnTranscodedVideoFrame => "onTranscodedVideoFrame",
            Self::OnEncodedVideoFrameReceived => "onEncodedVideoFrameReceived",
        }
    }

    pub fn observer(self) -> ObserverKind {
        match self {
            Self::OnRecordAudioFrame
            | Self::OnPlaybackAudioFrame
            | Self::OnMixedAudioFrame
            | Self::OnEarMonitoringAudioFrame
            | Self::OnPlaybackAudioFrameBeforeMixing => ObserverKind::AudioFrame,
            Self::OnCaptureVideoFrame
            | Self::OnPreEncodeVideoFrame
            | Self::OnMediaPlayerVideoFrame
            | Self::OnRenderVideoFrame
            | Self::OnTranscodedVideoFrame => ObserverKind::VideoFrame,
            Self::OnEncodedVideoFrameReceived => ObserverKind::EncodedVideoFrame,
        }
    }
}

impl fmt::Display for MediaEngineEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaEngineEventType {
    type Err = MediaEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| MediaEngineError::UnknownEvent(s.to_string()))
    }
}

/// Static description of one media engine event.
///
/// Implemented only by the marker types in this module. `Callback` is the
/// exact listener signature for the event and `invoke` spreads the native
/// payload (`Args`) into that signature's parameters.
pub trait MediaEngineEvent: Copy + Send + Sync + 'static {
    const TYPE: MediaEngineEventType;

    /// Payload the native layer delivers for this event.
    type Args: Send + Sync + 'static;

    /// Listener signature, always a `dyn Fn(..) + Send + Sync`.
    type Callback: ?Sized + Send + Sync + 'static;

    fn invoke(listener: &Self::Callback, args: &Self::Args);
}

/// A listener value for event `E`.
///
/// Listeners are compared by identity: clones of one `Arc` are the same
/// listener, separately built closures never are.
pub type Listener<E> = Arc<<E as MediaEngineEvent>::Callback>;

macro_rules! media_engine_event {
    (
        $(#[$doc:meta])*
        $name:ident($($param:ty),*) => $args:ty,
        |$listener:ident, $payload:ident| $call:expr
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl MediaEngineEvent for $name {
            const TYPE: MediaEngineEventType = MediaEngineEventType::$name;
            type Args = $args;
            type Callback = dyn Fn($($param),*) + Send + Sync;

            fn invoke($listener: &Self::Callback, $payload: &Self::Args) {
                $call
            }
        }

        impl $name {
            /// Wraps `f` as a listener for this event.
            pub fn listener<F>(f: F) -> Listener<Self>
            where
                F: Fn($($param),*) + Send + Sync + 'static,
            {
                Arc::new(f)
            }
        }
    };
}

/// Payload for the per-channel audio observer callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelAudioFrame {
    pub channel_id: String,
    pub audio_frame: AudioFrame,
}

/// A single remote user's audio before it is mixed into playback.
#[derive(Debug, Clone, PartialEq)]
pub struct MixingAudioFrame {
    pub channel_id: String,
    pub uid: u32,
    pub audio_frame: AudioFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceVideoFrame {
    pub source_type: VideoSourceType,
    pub video_frame: VideoFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaPlayerVideoFrame {
    pub video_frame: VideoFrame,
    pub media_player_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteVideoFrame {
    pub channel_id: String,
    pub remote_uid: u32,
    pub video_frame: VideoFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVideoFrame {
    pub uid: u32,
    pub image_buffer: Vec<u8>,
    pub info: EncodedVideoFrameInfo,
}

media_engine_event! {
    /// Audio captured from the local recording device.
    OnRecordAudioFrame(&str, &AudioFrame) => ChannelAudioFrame,
    |listener, args| listener(args.channel_id.as_str(), &args.audio_frame)
}

media_engine_event! {
    /// Mixed audio of all remote users, about to be played.
    OnPlaybackAudioFrame(&str, &AudioFrame) => ChannelAudioFrame,
    |listener, args| listener(args.channel_id.as_str(), &args.audio_frame)
}

media_engine_event! {
    /// Recorded and playback audio mixed together.
    OnMixedAudioFrame(&str, &AudioFrame) => ChannelAudioFrame,
    |listener, args| listener(args.channel_id.as_str(), &args.audio_frame)
}

media_engine_event! {
    /// In-ear monitoring audio.
    OnEarMonitoringAudioFrame(&AudioFrame) => AudioFrame,
    |listener, frame| listener(frame)
}

media_engine_event! {
    /// One remote user's audio before mixing.
    OnPlaybackAudioFrameBeforeMixing(&str, u32, &AudioFrame) => MixingAudioFrame,
    |listener, args| listener(args.channel_id.as_str(), args.uid, &args.audio_frame)
}

media_engine_event! {
    /// A locally captured video frame.
    OnCaptureVideoFrame(VideoSourceType, &VideoFrame) => SourceVideoFrame,
    |listener, args| listener(args.source_type, &args.video_frame)
}

media_engine_event! {
    /// A local video frame just before encoding.
    OnPreEncodeVideoFrame(VideoSourceType, &VideoFrame) => SourceVideoFrame,
    |listener, args| listener(args.source_type, &args.video_frame)
}

media_engine_event! {
    /// A frame decoded by a media player instance.
    OnMediaPlayerVideoFrame(&VideoFrame, i32) => MediaPlayerVideoFrame,
    |listener, args| listener(&args.video_frame, args.media_player_id)
}

media_engine_event! {
    /// A remote user's video frame about to be rendered.
    OnRenderVideoFrame(&str, u32, &VideoFrame) => RemoteVideoFrame,
    |listener, args| listener(args.channel_id.as_str(), args.remote_uid, &args.video_frame)
}

media_engine_event! {
    /// Output of local video transcoding.
    OnTranscodedVideoFrame(&VideoFrame) => VideoFrame,
    |listener, frame| listener(frame)
}

media_engine_event! {
    /// An encoded frame received from a remote user, before decoding.
    OnEncodedVideoFrameReceived(u32, &[u8], usize, &EncodedVideoFrameInfo) => EncodedVideoFrame,
    |listener, args| listener(args.uid, args.image_buffer.as_slice(), args.image_buffer.len(), &args.info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{VideoCodecType, VideoFrameType, VideoStreamType};
    use std::sync::Mutex;

    #[test]
    fn wire_names_round_trip() {
        for event in MediaEngineEventType::ALL {
            assert_eq!(event.as_str().parse::<MediaEngineEventType>().unwrap(), event);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "onJoinChannelSuccess".parse::<MediaEngineEventType>().unwrap_err();
        assert!(matches!(err, MediaEngineError::UnknownEvent(name) if name == "onJoinChannelSuccess"));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&MediaEngineEventType::OnPlaybackAudioFrameBeforeMixing).unwrap();
        assert_eq!(json, "\"onPlaybackAudioFrameBeforeMixing\"");
        let parsed: MediaEngineEventType = serde_json::from_str("\"onTranscodedVideoFrame\"").unwrap();
        assert_eq!(parsed, MediaEngineEventType::OnTranscodedVideoFrame);
    }

    #[test]
    fn observer_grouping() {
        let audio = MediaEngineEventType::ALL
            .iter()
            .filter(|e| e.observer() == ObserverKind::AudioFrame)
            .count();
        let video = MediaEngineEventType::ALL
            .iter()
            .filter(|e| e.observer() == ObserverKind::VideoFrame)
            .count();
        assert_eq!(audio, 5);
        assert_eq!(video, 5);
        assert_eq!(
            MediaEngineEventType::OnEncodedVideoFrameReceived.observer(),
            ObserverKind::EncodedVideoFrame
        );
    }

    #[test]
    fn invoke_spreads_mixing_payload() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let listener = OnPlaybackAudioFrameBeforeMixing::listener(move |channel, uid, frame| {
            *sink.lock().unwrap() = Some((channel.to_string(), uid, frame.samples_per_sec));
        });

        let args = MixingAudioFrame {
            channel_id: "lobby".into(),
            uid: 42,
            audio_frame: AudioFrame::silence(160, 1, 16_000),
        };
        OnPlaybackAudioFrameBeforeMixing::invoke(&*listener, &args);

        assert_eq!(*seen.lock().unwrap(), Some(("lobby".to_string(), 42, 16_000)));
    }

    #[test]
    fn invoke_passes_encoded_length() {
        let seen = Arc::new(Mutex::new(0usize));
        let sink = seen.clone();
        let listener = OnEncodedVideoFrameReceived::listener(move |_uid, buffer, length, _info| {
            assert_eq!(buffer.len(), length);
            *sink.lock().unwrap() = length;
        });

        let args = EncodedVideoFrame {
            uid: 7,
            image_buffer: vec![0, 0, 0, 1, 0x65],
            info: EncodedVideoFrameInfo {
                codec_type: VideoCodecType::H264,
                width: 640,
                height: 360,
                frames_per_second: 15,
                frame_type: VideoFrameType::KeyFrame,
                rotation: 0,
                track_id: 0,
                capture_time_ms: 0,
                decode_time_ms: 0,
                uid: 7,
                stream_type: VideoStreamType::High,
            },
        };
        OnEncodedVideoFrameReceived::invoke(&*listener, &args);

        assert_eq!(*seen.lock().unwrap(), 5);
    }
}
