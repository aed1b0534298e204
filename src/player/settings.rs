use serde::Serialize;

pub const MIN_FONT_SIZE_REM: f32 = 0.75;
pub const MAX_FONT_SIZE_REM: f32 = 2.5;
pub const FONT_SIZE_STEP_REM: f32 = 0.05;
pub const DEFAULT_FONT_SIZE_REM: f32 = 1.25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleBackground {
    Translucent,
    Transparent,
    Color(String),
}

impl SubtitleBackground {
    pub fn css(&self) -> &str {
        match self {
            Self::Translucent => "rgba(0,0,0,0.6)",
            Self::Transparent => "transparent",
            Self::Color(color) => color,
        }
    }
}

/// How the subtitle overlay looks. Lives as long as the player is open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleSettings {
    font_size_rem: f32,
    color: String,
    background: SubtitleBackground,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            font_size_rem: DEFAULT_FONT_SIZE_REM,
            color: "#fff".to_string(),
            background: SubtitleBackground::Translucent,
        }
    }
}

impl SubtitleSettings {
    pub fn font_size_rem(&self) -> f32 {
        self.font_size_rem
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn background(&self) -> &SubtitleBackground {
        &self.background
    }

    /// clamped to the slider range and snapped to its step
    pub fn set_font_size_rem(&mut self, size: f32) {
        if !size.is_finite() {
            return;
        }
        let steps = ((size.clamp(MIN_FONT_SIZE_REM, MAX_FONT_SIZE_REM) - MIN_FONT_SIZE_REM)
            / FONT_SIZE_STEP_REM)
            .round();
        self.font_size_rem = MIN_FONT_SIZE_REM + steps * FONT_SIZE_STEP_REM;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn set_background(&mut self, background: SubtitleBackground) {
        self.background = background;
    }

    pub fn css(&self) -> String {
        format!(
            "font-size: {}rem; color: {}; background: {}",
            self.font_size_rem,
            self.color,
            self.background.css()
        )
    }
}
