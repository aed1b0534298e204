use serde::Serialize;

/// The playback element the player drives, plus the container it can take fullscreen.
///
/// Methods take `&self`: the element is a handle shared between the player and the subtitle
/// sync task, implementations keep their own interior state.
pub trait MediaElement: Send + Sync + 'static {
    /// seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// seconds, 0 until metadata is in
    fn duration(&self) -> f64;
    fn is_paused(&self) -> bool;
    fn play(&self);
    fn pause(&self);
    fn set_muted(&self, muted: bool);
    fn set_volume(&self, volume: f64);
    fn set_source(&self, url: &str);
    fn load(&self);

    /// whether the host allows fullscreen at all
    fn fullscreen_enabled(&self) -> bool;
    /// true if the container actually went fullscreen
    fn request_fullscreen(&self) -> bool;
    fn exit_fullscreen(&self);
}

/// Notifications coming back from the element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaEvent {
    LoadedMetadata { duration: f64 },
    TimeUpdate { current_time: f64 },
    Play,
    Pause,
    Waiting,
    CanPlay,
    Error { message: String },
}
