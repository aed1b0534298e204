pub mod captions_controller;
pub mod health_controller;
pub mod sources_controller;
pub mod streaming_proxy_controller;
pub mod subtitles_controller;

pub use captions_controller::CaptionsController;
pub use health_controller::HealthController;
pub use sources_controller::SourcesController;
pub use streaming_proxy_controller::StreamingProxyController;
pub use subtitles_controller::SubtitlesController;
