//! Walks through the listener lifecycle an app screen goes through:
//! register frame listeners, receive a few frames, then tear them down.
//!
//! Settings are read from `$FRAMETAP_DATA_DIR/settings.json`, falling back
//! to the platform data directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use frametap_core::events::{
    EncodedVideoFrame, MixingAudioFrame, RemoteVideoFrame, SourceVideoFrame,
};
use frametap_core::media::{
    AudioFrame, EncodedVideoFrameInfo, VideoCodecType, VideoFrame, VideoFrameType, VideoSourceType,
    VideoStreamType,
};
use frametap_core::{
    EventRegistry, MediaEngine, MediaEngineEventType, MediaEngineEvents, OnCaptureVideoFrame,
    OnEncodedVideoFrameReceived, OnPlaybackAudioFrameBeforeMixing, OnRenderVideoFrame,
    SettingsStore,
};

const DEFAULT_LOG_FILTER: &str = "frametap_core=debug,frametap_demo=info";
const CHANNEL_ID: &str = "demo";
const REMOTE_UIDS: [u32; 2] = [1001, 1002];
const FRAMES: u32 = 3;

fn data_dir() -> PathBuf {
    std::env::var_os("FRAMETAP_DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::data_dir().map(|d| d.join("frametap")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Install the fmt subscriber. `RUST_LOG` wins over the settings filter.
fn init_logging(settings_filter: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(settings_filter.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn encoded_info(uid: u32, seq: u32) -> EncodedVideoFrameInfo {
    EncodedVideoFrameInfo {
        codec_type: VideoCodecType::H264,
        width: 640,
        height: 360,
        frames_per_second: 15,
        frame_type: if seq == 0 { VideoFrameType::KeyFrame } else { VideoFrameType::DeltaFrame },
        rotation: 0,
        track_id: 0,
        capture_time_ms: i64::from(seq) * 66,
        decode_time_ms: 0,
        uid,
        stream_type: VideoStreamType::High,
    }
}

/// Plays the native side: pushes synthetic frames for every remote user.
fn feed_frames(native: &EventRegistry) {
    for seq in 0..FRAMES {
        native.emit_event::<OnCaptureVideoFrame>(&SourceVideoFrame {
            source_type: VideoSourceType::CameraPrimary,
            video_frame: VideoFrame::black_i420(640, 360),
        });
        for uid in REMOTE_UIDS {
            native.emit_event::<OnPlaybackAudioFrameBeforeMixing>(&MixingAudioFrame {
                channel_id: CHANNEL_ID.to_string(),
                uid,
                audio_frame: AudioFrame::silence(480, 1, 48_000),
            });
            native.emit_event::<OnRenderVideoFrame>(&RemoteVideoFrame {
                channel_id: CHANNEL_ID.to_string(),
                remote_uid: uid,
                video_frame: VideoFrame::black_i420(320, 180),
            });
            native.emit_event::<OnEncodedVideoFrameReceived>(&EncodedVideoFrame {
                uid,
                image_buffer: vec![0, 0, 0, 1, if seq == 0 { 0x65 } else { 0x41 }],
                info: encoded_info(uid, seq),
            });
        }
    }
}

#[tokio::main]
async fn main() {
    let store = SettingsStore::new(data_dir());
    let settings = store.get();
    init_logging(settings.log_filter.as_deref());
    tracing::info!(path = %store.path().display(), ?settings, "settings loaded");

    let (engine, native) = MediaEngine::in_process(EventRegistry::with_settings(&settings));

    let audio_ms = Arc::new(AtomicU64::new(0));
    let audio_total = audio_ms.clone();
    let on_audio = OnPlaybackAudioFrameBeforeMixing::listener(move |channel_id, uid, audio_frame| {
        audio_total.fetch_add(audio_frame.duration_ms(), Ordering::Relaxed);
        tracing::debug!(channel_id, uid, samples = audio_frame.samples_per_channel, "audio before mixing");
    });
    let on_render = OnRenderVideoFrame::listener(|channel_id, remote_uid, video_frame| {
        tracing::info!(channel_id, remote_uid, width = video_frame.width, height = video_frame.height, "render frame");
    });
    let on_encoded = OnEncodedVideoFrameReceived::listener(|uid, _buffer, length, info| {
        tracing::info!(uid, length, frame_type = ?info.frame_type, "encoded frame");
    });

    engine.add_listener(OnPlaybackAudioFrameBeforeMixing, &on_audio);
    engine.add_listener(OnRenderVideoFrame, &on_render);
    let encoded_subscription = engine.add_listener(OnEncodedVideoFrameReceived, &on_encoded);
    let mut captures = engine.subscribe(OnCaptureVideoFrame);

    for event in MediaEngineEventType::ALL {
        let count = engine.listener_count(event);
        if count > 0 {
            tracing::info!(%event, observer = ?event.observer(), count, "listening");
        }
    }

    feed_frames(&native);

    // Closing unregisters; frames already queued still drain.
    captures.close();
    let mut captured = 0;
    while let Some(frame) = captures.recv().await {
        captured += 1;
        tracing::debug!(source = ?frame.source_type, width = frame.video_frame.width, "captured frame");
    }
    tracing::info!(captured, audio_ms = audio_ms.load(Ordering::Relaxed), "first pass done");

    encoded_subscription.remove();
    engine.remove_listener(OnRenderVideoFrame, &on_render);
    feed_frames(&native);
    tracing::info!(
        audio_ms = audio_ms.load(Ordering::Relaxed),
        render_listeners = engine.listener_count(MediaEngineEventType::OnRenderVideoFrame),
        "second pass done"
    );

    engine.remove_all_listeners(None);
    tracing::info!(remaining = ?native.event_names(), "all listeners removed");
}
