use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// how long the overlay stays up after the last pointer/touch activity
pub const CONTROLS_IDLE_TIMEOUT: Duration = Duration::from_millis(3000);

/// fixed skip for the arrow keys and skip buttons
pub const SKIP_SECONDS: f64 = 10.0;

/// Auto-hiding control overlay.
///
/// Activity shows the overlay and arms a hide deadline, `poll` fires the deadline. The
/// deadline only hides anything while playback is running: a paused player keeps its
/// controls up no matter how long it sits there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsOverlay {
    visible: bool,
    hide_at: Option<Instant>,
}

impl Default for ControlsOverlay {
    fn default() -> Self {
        Self {
            visible: true,
            hide_at: None,
        }
    }
}

impl ControlsOverlay {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        self.visible = true;
        self.hide_at = Some(now + CONTROLS_IDLE_TIMEOUT);
    }

    pub fn pointer_left(&mut self, playing: bool) {
        if playing {
            self.visible = false;
        }
    }

    // a finger resting on the screen keeps the controls up until it lifts
    pub fn touch_started(&mut self) {
        self.visible = true;
        self.hide_at = None;
    }

    pub fn touch_ended(&mut self, now: Instant) {
        self.hide_at = Some(now + CONTROLS_IDLE_TIMEOUT);
    }

    /// playback (re)started, hide later even if the pointer never moves
    pub fn playback_started(&mut self, now: Instant) {
        if self.hide_at.is_none() {
            self.hide_at = Some(now + CONTROLS_IDLE_TIMEOUT);
        }
    }

    /// a paused player shows its controls until playback resumes
    pub fn playback_paused(&mut self) {
        self.visible = true;
        self.hide_at = None;
    }

    /// fires the deadline if it's due, returns whether the overlay is still visible
    pub fn poll(&mut self, now: Instant, playing: bool) -> bool {
        if let Some(hide_at) = self.hide_at {
            if now >= hide_at {
                self.hide_at = None;
                if playing {
                    self.visible = false;
                }
            }
        }
        self.visible
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// keys the player reacts to, everything else is `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

impl Key {
    /// from a DOM style `KeyboardEvent.key` string
    pub fn from_dom(key: &str) -> Self {
        match key {
            " " => Self::Space,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Escape" => Self::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    TogglePlay,
    ToggleFullscreen,
    ToggleMute,
    Skip { seconds: f64 },
    /// leave fullscreen if in it, otherwise close the player
    Escape,
    CloseQualityMenu,
    CloseCaptionMenu,
}

pub fn shortcut_for(key: Key) -> Option<PlayerCommand> {
    match key {
        Key::Space => Some(PlayerCommand::TogglePlay),
        Key::Char('f') => Some(PlayerCommand::ToggleFullscreen),
        Key::Char('m') => Some(PlayerCommand::ToggleMute),
        Key::ArrowLeft => Some(PlayerCommand::Skip {
            seconds: -SKIP_SECONDS,
        }),
        Key::ArrowRight => Some(PlayerCommand::Skip {
            seconds: SKIP_SECONDS,
        }),
        Key::Escape => Some(PlayerCommand::Escape),
        _ => None,
    }
}

/// `m:ss`, minutes aren't wrapped into hours
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_keys_map_to_shortcuts() {
        assert_eq!(shortcut_for(Key::from_dom(" ")), Some(PlayerCommand::TogglePlay));
        assert_eq!(
            shortcut_for(Key::from_dom("f")),
            Some(PlayerCommand::ToggleFullscreen)
        );
        assert_eq!(shortcut_for(Key::from_dom("m")), Some(PlayerCommand::ToggleMute));
        assert_eq!(
            shortcut_for(Key::from_dom("ArrowLeft")),
            Some(PlayerCommand::Skip { seconds: -10.0 })
        );
        assert_eq!(shortcut_for(Key::from_dom("Escape")), Some(PlayerCommand::Escape));
        assert_eq!(shortcut_for(Key::from_dom("Enter")), None);
        assert_eq!(shortcut_for(Key::from_dom("F")), None);
    }

    #[test]
    fn pausing_brings_hidden_controls_back_for_good() {
        let start = Instant::now();
        let mut overlay = ControlsOverlay::default();
        overlay.playback_started(start);
        assert!(!overlay.poll(start + CONTROLS_IDLE_TIMEOUT, true));

        overlay.playback_paused();

        assert!(overlay.hide_deadline().is_none());
        assert!(overlay.poll(start + Duration::from_secs(120), false));
    }

    #[test]
    fn timestamps_are_minutes_and_padded_seconds() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(65.9), "1:05");
        assert_eq!(format_timestamp(3725.0), "62:05");
        assert_eq!(format_timestamp(f64::NAN), "0:00");
    }
}
