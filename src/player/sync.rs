use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::captions::SubtitleTrack;
use super::media::MediaElement;

/// one display refresh at 60hz
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub type SubtitleLine = Option<String>;

/// Per-frame subtitle polling bound to one (element, track) pair.
///
/// Every tick reads the element's time and publishes the active line (already html, line
/// breaks as `<br/>`) on the watch channel, only when it changed. Dropping the handle cancels
/// the loop, so a sync can never outlive the track or source it was started for.
pub struct SubtitleSync {
    handle: JoinHandle<()>,
}

impl SubtitleSync {
    pub fn start<M: MediaElement>(
        media: Arc<M>,
        track: Arc<SubtitleTrack>,
        output: Arc<watch::Sender<SubtitleLine>>,
        frame: Duration,
    ) -> Self {
        debug!(
            "Starting subtitle sync over {} entries",
            track.entries.len()
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                let line = track
                    .active_at(media.current_time())
                    .map(|entry| entry.html());

                output.send_if_modified(|current| {
                    if *current == line {
                        false
                    } else {
                        *current = line;
                        true
                    }
                });
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SubtitleSync {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
