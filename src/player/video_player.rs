// the player as a state machine over a media element. The host feeds it element events,
// pointer activity and document events, the player pokes the element back. Nothing in here
// blocks, the only background work is the subtitle sync task
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::catalog::{CaptionRequest, CatalogClient, StreamDescriptor};

use super::captions::{CaptionNotice, CaptionSet, caption_notice, load_caption_set};
use super::controls::{ControlsOverlay, Key, PlayerCommand, shortcut_for};
use super::media::{MediaElement, MediaEvent};
use super::quality::{ProxyRoute, QualityLadder, QualityOption};
use super::settings::SubtitleSettings;
use super::subscriptions::{DocumentEvent, DocumentEventKind, DocumentEvents, Subscription};
use super::sync::{FRAME_INTERVAL, SubtitleLine, SubtitleSync};

/// what the page hands the player when it opens it
#[derive(Debug, Clone, Default)]
pub struct PlayerSession {
    pub title: String,
    pub streams: Vec<StreamDescriptor>,
    /// stream/subject/season/episode, only used to key the captions fetch
    pub captions: Option<CaptionRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_time: f64,
    pub duration: f64,
    pub playing: bool,
    pub muted: bool,
    pub volume: f64,
    pub fullscreen: bool,
    pub buffering: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            playing: false,
            muted: false,
            volume: 1.0,
            fullscreen: false,
            buffering: false,
        }
    }
}

/// position and play state captured right before a quality switch
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRestore {
    position: f64,
    resume: bool,
}

type CloseCallback = Box<dyn FnMut() + Send>;

pub struct VideoPlayer<M: MediaElement> {
    media: Arc<M>,
    document: DocumentEvents,
    route: ProxyRoute,
    frame_interval: Duration,

    open: bool,
    title: String,
    caption_request: Option<CaptionRequest>,

    ladder: QualityLadder,
    selected_quality: Option<usize>,
    current_source: Option<String>,
    pending_restore: Option<PendingRestore>,

    playback: PlaybackState,
    controls: ControlsOverlay,

    captions: CaptionSet,
    selected_caption: Option<String>,
    subtitle_settings: SubtitleSettings,
    subtitle_tx: Arc<watch::Sender<SubtitleLine>>,
    subtitle_rx: watch::Receiver<SubtitleLine>,
    subtitle_sync: Option<SubtitleSync>,

    // each listener lives exactly as long as the state it serves
    keyboard: Option<Subscription>,
    quality_menu: Option<Subscription>,
    caption_menu: Option<Subscription>,
    commands_tx: mpsc::UnboundedSender<PlayerCommand>,
    commands_rx: mpsc::UnboundedReceiver<PlayerCommand>,

    on_close: Option<CloseCallback>,
}

impl<M: MediaElement> VideoPlayer<M> {
    pub fn new(media: Arc<M>, document: DocumentEvents) -> Self {
        let (subtitle_tx, subtitle_rx) = watch::channel(None);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        Self {
            media,
            document,
            route: ProxyRoute::default(),
            frame_interval: FRAME_INTERVAL,
            open: false,
            title: String::new(),
            caption_request: None,
            ladder: QualityLadder::default(),
            selected_quality: None,
            current_source: None,
            pending_restore: None,
            playback: PlaybackState::default(),
            controls: ControlsOverlay::default(),
            captions: CaptionSet::default(),
            selected_caption: None,
            subtitle_settings: SubtitleSettings::default(),
            subtitle_tx: Arc::new(subtitle_tx),
            subtitle_rx,
            subtitle_sync: None,
            keyboard: None,
            quality_menu: None,
            caption_menu: None,
            commands_tx,
            commands_rx,
            on_close: None,
        }
    }

    pub fn with_proxy_route(mut self, route: ProxyRoute) -> Self {
        self.route = route;
        self
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    /// called (with nothing) whenever the player asks to be closed
    pub fn on_close<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_close = Some(Box::new(callback));
    }

    // open / close

    pub fn open(&mut self, session: PlayerSession) {
        if self.open {
            self.reset();
        }

        self.open = true;
        self.title = session.title;
        self.caption_request = session.captions;
        self.ladder = QualityLadder::build(&session.streams, &self.route);

        let commands = self.commands_tx.clone();
        self.keyboard = Some(
            self.document
                .subscribe(DocumentEventKind::KeyDown, move |event| {
                    if let DocumentEvent::KeyDown(key) = event {
                        if let Some(command) = shortcut_for(*key) {
                            let _ = commands.send(command);
                        }
                    }
                }),
        );

        let Some(default) = self.ladder.default_option().cloned() else {
            error!(
                "No playable streams for '{}' ({} descriptors, none with a url)",
                self.title,
                session.streams.len()
            );
            return;
        };

        info!(
            "Opening '{}' at {} ({} qualities)",
            self.title,
            default.label,
            self.ladder.len()
        );

        self.selected_quality = Some(default.index);
        self.point_media_at(&default.proxied_url);
    }

    /// Fetches captions for the open session and auto-selects `en` when offered.
    pub async fn load_captions<C>(&mut self, client: &C)
    where
        C: CatalogClient + ?Sized,
    {
        let captions = match (self.open, self.caption_request.clone()) {
            (true, Some(request)) => load_caption_set(client, &request).await,
            _ => CaptionSet::default(),
        };
        self.set_captions(captions);
    }

    pub fn set_captions(&mut self, captions: CaptionSet) {
        if !self.open {
            return;
        }
        self.selected_caption = captions.default_language();
        self.captions = captions;
        self.restart_subtitle_sync();
    }

    /// asks the owner to close (fires the close callback), then closes
    pub fn request_close(&mut self) {
        if let Some(callback) = self.on_close.as_mut() {
            callback();
        }
        self.close();
    }

    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        debug!("Closing player for '{}'", self.title);
        self.media.pause();
        self.reset();
    }

    fn reset(&mut self) {
        // guards first so nothing fires into a half reset player
        self.keyboard = None;
        self.quality_menu = None;
        self.caption_menu = None;
        self.subtitle_sync = None;
        while self.commands_rx.try_recv().is_ok() {}

        self.open = false;
        self.title.clear();
        self.caption_request = None;
        self.ladder = QualityLadder::default();
        self.selected_quality = None;
        self.current_source = None;
        self.pending_restore = None;
        self.playback = PlaybackState::default();
        self.controls.reset();
        self.captions = CaptionSet::default();
        self.selected_caption = None;
        self.subtitle_settings = SubtitleSettings::default();
        self.subtitle_tx.send_replace(None);
    }

    // element wiring

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if !self.open {
            return;
        }

        match event {
            MediaEvent::LoadedMetadata { duration } => {
                debug!("Metadata loaded, duration: {}", duration);
                self.playback.duration = duration;
                self.playback.current_time = 0.0;

                if let Some(restore) = self.pending_restore.take() {
                    debug!(
                        "Restoring position {} after quality switch (resume: {})",
                        restore.position, restore.resume
                    );
                    self.media.set_current_time(restore.position);
                    self.playback.current_time = restore.position;
                    if restore.resume {
                        self.media.play();
                    }
                }
            }
            MediaEvent::TimeUpdate { current_time } => self.playback.current_time = current_time,
            MediaEvent::Play => {
                self.playback.playing = true;
                self.controls.playback_started(Instant::now());
            }
            MediaEvent::Pause => {
                self.playback.playing = false;
                self.controls.playback_paused();
            }
            MediaEvent::Waiting => self.playback.buffering = true,
            MediaEvent::CanPlay => self.playback.buffering = false,
            MediaEvent::Error { message } => {
                error!("Media element error on {:?}: {}", self.current_source, message)
            }
        }
    }

    fn point_media_at(&mut self, proxied_url: &str) {
        debug!("Setting media source to {}", proxied_url);
        self.current_source = Some(proxied_url.to_string());
        self.media.set_source(proxied_url);
        self.media.load();
        // a new source invalidates whatever the old sync was polling
        self.restart_subtitle_sync();
    }

    // playback controls

    pub fn toggle_play(&mut self) {
        if !self.open {
            return;
        }
        if self.playback.playing {
            self.media.pause();
        } else {
            self.media.play();
        }
    }

    pub fn toggle_mute(&mut self) {
        if !self.open {
            return;
        }
        let muted = !self.playback.muted;
        self.media.set_muted(muted);
        self.playback.muted = muted;
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !self.open || volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.media.set_volume(volume);
        self.media.set_muted(volume == 0.0);
        self.playback.volume = volume;
        self.playback.muted = volume == 0.0;
    }

    pub fn seek(&mut self, seconds: f64) {
        if !self.open || seconds.is_nan() {
            return;
        }
        let target = self.clamp_to_media(seconds);
        self.media.set_current_time(target);
        self.playback.current_time = target;
    }

    /// relative to where the element actually is, not the last time update
    pub fn skip(&mut self, seconds: f64) {
        let target = self.media.current_time() + seconds;
        self.seek(target);
    }

    fn clamp_to_media(&self, seconds: f64) -> f64 {
        // metadata may not have been reported yet, ask the element then
        let duration = if self.playback.duration > 0.0 {
            self.playback.duration
        } else {
            self.media.duration()
        };
        if duration > 0.0 && duration.is_finite() {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        if !self.open {
            return;
        }
        if self.playback.fullscreen {
            self.media.exit_fullscreen();
            self.playback.fullscreen = false;
        } else if self.media.fullscreen_enabled() {
            self.playback.fullscreen = self.media.request_fullscreen();
        } else {
            debug!("Fullscreen not permitted by host");
        }
    }

    /// the host left (or entered) fullscreen on its own
    pub fn fullscreen_changed(&mut self, active: bool) {
        self.playback.fullscreen = self.open && active;
    }

    // quality

    /// Switches rendition without restarting: position and play state are captured now and
    /// restored on the next `LoadedMetadata`.
    pub fn select_quality(&mut self, index: usize) -> bool {
        if !self.open {
            return false;
        }
        let Some(option) = self.ladder.get(index).cloned() else {
            return false;
        };

        // a switch before the last one's metadata came in would read the reloading element
        let restore = self.pending_restore.unwrap_or_else(|| PendingRestore {
            position: self.media.current_time(),
            resume: !self.media.is_paused(),
        });
        info!(
            "Switching quality to {} at {}s (resume: {})",
            option.label, restore.position, restore.resume
        );

        self.selected_quality = Some(option.index);
        self.close_quality_menu();
        self.point_media_at(&option.proxied_url);
        self.pending_restore = Some(restore);
        true
    }

    pub fn toggle_quality_menu(&mut self) {
        if self.quality_menu.is_some() {
            self.close_quality_menu();
        } else if self.open {
            let commands = self.commands_tx.clone();
            self.quality_menu = Some(self.document.subscribe(DocumentEventKind::Click, move |_| {
                let _ = commands.send(PlayerCommand::CloseQualityMenu);
            }));
        }
    }

    pub fn close_quality_menu(&mut self) {
        self.quality_menu = None;
    }

    // captions

    /// `None` turns captions off. Languages that aren't in the caption list are ignored.
    pub fn select_caption(&mut self, language: Option<&str>) -> bool {
        if !self.open {
            return false;
        }
        if let Some(language) = language {
            if !self.captions.descriptors.iter().any(|c| c.lan == language) {
                return false;
            }
        }

        self.selected_caption = language.map(str::to_string);
        self.close_caption_menu();
        self.restart_subtitle_sync();
        true
    }

    pub fn toggle_caption_menu(&mut self) {
        if self.caption_menu.is_some() {
            self.close_caption_menu();
        } else if self.open {
            let commands = self.commands_tx.clone();
            self.caption_menu = Some(self.document.subscribe(
                DocumentEventKind::MouseDown,
                move |_| {
                    let _ = commands.send(PlayerCommand::CloseCaptionMenu);
                },
            ));
        }
    }

    pub fn close_caption_menu(&mut self) {
        self.caption_menu = None;
    }

    pub fn subtitle_settings_mut(&mut self) -> &mut SubtitleSettings {
        &mut self.subtitle_settings
    }

    fn restart_subtitle_sync(&mut self) {
        // dropping the old handle cancels its loop before anything new starts
        self.subtitle_sync = None;

        let track = match (self.open, self.selected_caption.as_deref()) {
            (true, Some(language)) => self.captions.track(language).cloned(),
            _ => None,
        };

        match track {
            Some(track) => {
                self.subtitle_sync = Some(SubtitleSync::start(
                    self.media.clone(),
                    track,
                    self.subtitle_tx.clone(),
                    self.frame_interval,
                ));
            }
            None => {
                self.subtitle_tx.send_replace(None);
            }
        }
    }

    // pointer activity

    pub fn pointer_moved(&mut self) {
        self.controls.pointer_moved(Instant::now());
    }

    pub fn pointer_left(&mut self) {
        self.controls.pointer_left(self.playback.playing);
    }

    pub fn touch_started(&mut self) {
        self.controls.touch_started();
    }

    pub fn touch_ended(&mut self) {
        self.controls.touch_ended(Instant::now());
    }

    /// fires the idle deadline if due, returns whether the controls are showing
    pub fn tick(&mut self) -> bool {
        self.controls.poll(Instant::now(), self.playback.playing)
    }

    // commands

    pub fn handle_key(&mut self, key: Key) {
        if let Some(command) = shortcut_for(key) {
            self.apply(command);
        }
    }

    /// runs commands queued by document listeners since the last call
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands_rx.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, command: PlayerCommand) {
        if !self.open {
            return;
        }
        match command {
            PlayerCommand::TogglePlay => self.toggle_play(),
            PlayerCommand::ToggleFullscreen => self.toggle_fullscreen(),
            PlayerCommand::ToggleMute => self.toggle_mute(),
            PlayerCommand::Skip { seconds } => self.skip(seconds),
            PlayerCommand::Escape => {
                if self.playback.fullscreen {
                    self.toggle_fullscreen();
                } else {
                    debug!("Escape pressed, closing player");
                    self.request_close();
                }
            }
            PlayerCommand::CloseQualityMenu => self.close_quality_menu(),
            PlayerCommand::CloseCaptionMenu => self.close_caption_menu(),
        }
    }

    // read side

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn qualities(&self) -> &[QualityOption] {
        self.ladder.options()
    }

    pub fn selected_quality(&self) -> Option<&QualityOption> {
        self.selected_quality.and_then(|index| self.ladder.get(index))
    }

    pub fn current_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    pub fn quality_menu_open(&self) -> bool {
        self.quality_menu.is_some()
    }

    pub fn caption_menu_open(&self) -> bool {
        self.caption_menu.is_some()
    }

    pub fn captions(&self) -> &CaptionSet {
        &self.captions
    }

    pub fn selected_caption(&self) -> Option<&str> {
        self.selected_caption.as_deref()
    }

    pub fn caption_notice(&self) -> Option<CaptionNotice> {
        caption_notice(&self.captions, self.selected_caption.as_deref())
    }

    pub fn subtitle_settings(&self) -> &SubtitleSettings {
        &self.subtitle_settings
    }

    /// the active subtitle line as html, `None` when nothing is showing
    pub fn current_subtitle(&self) -> SubtitleLine {
        self.subtitle_rx.borrow().clone()
    }

    /// to await line changes instead of polling `current_subtitle`
    pub fn subtitle_updates(&self) -> watch::Receiver<SubtitleLine> {
        self.subtitle_rx.clone()
    }

    pub fn subtitle_sync_running(&self) -> bool {
        self.subtitle_sync
            .as_ref()
            .is_some_and(|sync| sync.is_running())
    }
}
