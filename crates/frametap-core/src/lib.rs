//! Typed listener registration for media engine frame events.
//!
//! The native engine reports raw audio, video and encoded-video frames by
//! event name. [`MediaEngine`] puts a typed surface over that: each event
//! marker fixes the listener signature the native layer will call.
//!
//! ```
//! use frametap_core::{EventRegistry, MediaEngine, MediaEngineEvents, OnPlaybackAudioFrameBeforeMixing};
//!
//! let (engine, _native) = MediaEngine::in_process(EventRegistry::new());
//! let on_frame = OnPlaybackAudioFrameBeforeMixing::listener(|channel_id, uid, audio_frame| {
//!     println!("{channel_id}/{uid}: {} samples", audio_frame.samples_per_channel);
//! });
//! engine.add_listener(OnPlaybackAudioFrameBeforeMixing, &on_frame);
//! engine.remove_listener(OnPlaybackAudioFrameBeforeMixing, &on_frame);
//! ```
//!
//! A listener built for one event cannot be registered under another:
//!
//! ```compile_fail
//! use frametap_core::{EventRegistry, MediaEngine, MediaEngineEvents, OnRenderVideoFrame, OnRecordAudioFrame};
//!
//! let (engine, _native) = MediaEngine::in_process(EventRegistry::new());
//! let on_render = OnRenderVideoFrame::listener(|_channel_id, _uid, _video_frame| {});
//! engine.add_listener(OnRecordAudioFrame, &on_render);
//! ```

pub mod engine;
pub mod errors;
pub mod events;
pub mod media;
pub mod native;
pub mod receiver;
pub mod registry;
pub mod settings;

pub use engine::{EventSubscription, MediaEngine, MediaEngineEvents};
pub use errors::MediaEngineError;
pub use events::{
    Listener, MediaEngineEvent, MediaEngineEventType, ObserverKind, OnCaptureVideoFrame,
    OnEarMonitoringAudioFrame, OnEncodedVideoFrameReceived, OnMediaPlayerVideoFrame,
    OnMixedAudioFrame, OnPlaybackAudioFrame, OnPlaybackAudioFrameBeforeMixing,
    OnPreEncodeVideoFrame, OnRecordAudioFrame, OnRenderVideoFrame, OnTranscodedVideoFrame,
};
pub use native::NativeEventSource;
pub use receiver::EventReceiver;
pub use registry::EventRegistry;
pub use settings::{Settings, SettingsStore};
