pub mod captions;
pub mod controls;
pub mod media;
pub mod quality;
pub mod settings;
pub mod srt;
pub mod subscriptions;
pub mod sync;
pub mod video_player;

pub use captions::{CaptionNotice, CaptionSet, SubtitleTrack, load_caption_set};
pub use controls::{ControlsOverlay, Key, PlayerCommand};
pub use media::{MediaElement, MediaEvent};
pub use quality::{ProxyRoute, QualityLadder, QualityOption};
pub use settings::{SubtitleBackground, SubtitleSettings};
pub use srt::{CaptionEntry, parse_srt, srt_to_vtt};
pub use subscriptions::{DocumentEvent, DocumentEventKind, DocumentEvents, Subscription};
pub use sync::SubtitleSync;
pub use video_player::{PlaybackState, PlayerSession, VideoPlayer};
