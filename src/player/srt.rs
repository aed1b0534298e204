//! SubRip parsing.
//!
//! Accepts what caption hosts actually serve: BOMs, `\r\n`, missing index lines and missing
//! milliseconds. A block that doesn't look like a cue is dropped without failing the rest of
//! the file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BLOCK_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("block separator regex is valid"));

static INDEX_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("index regex is valid"));

static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),?(\d{3})?\s*-+>\s*(\d{2}):(\d{2}):(\d{2}),?(\d{3})?")
        .expect("timing regex is valid")
});

static SRT_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}:\d{2}:\d{2}),(\d{3})").expect("timestamp regex is valid"));

/// One timed cue. `start`/`end` are seconds and the range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionEntry {
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// text with line breaks turned into markup breaks, ready for the overlay
    pub fn html(&self) -> String {
        self.text.replace('\n', "<br/>")
    }
}

/// Parses a SubRip document into entries, in file order.
pub fn parse_srt(source: &str) -> Vec<CaptionEntry> {
    if source.is_empty() {
        return Vec::new();
    }

    let normalized = strip_bom(source).replace("\r\n", "\n").replace('\r', "\n");

    BLOCK_SEPARATOR
        .split(&normalized)
        .filter_map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Option<CaptionEntry> {
    let lines: Vec<&str> = block.split('\n').filter(|line| !line.is_empty()).collect();
    if lines.len() < 2 {
        return None;
    }

    let timing_index = if INDEX_LINE.is_match(lines[0]) { 1 } else { 0 };
    let captures = TIMING_LINE.captures(lines.get(timing_index)?)?;

    let seconds = |h: usize, m: usize, s: usize, ms: usize| -> Option<f64> {
        let part = |i: usize| captures.get(i).map(|c| c.as_str().parse::<u32>());
        let hours = part(h)?.ok()?;
        let minutes = part(m)?.ok()?;
        let secs = part(s)?.ok()?;
        let millis = part(ms).transpose().ok()?.unwrap_or(0);
        Some(
            f64::from(hours) * 3600.0
                + f64::from(minutes) * 60.0
                + f64::from(secs)
                + f64::from(millis) / 1000.0,
        )
    };

    let start = seconds(1, 2, 3, 4)?;
    let end = seconds(5, 6, 7, 8)?;
    let text = lines[timing_index + 1..].join("\n");

    if text.trim().is_empty() {
        return None;
    }

    Some(CaptionEntry { start, end, text })
}

/// Rewrites SubRip into WebVTT for players that only take VTT tracks.
pub fn srt_to_vtt(source: &str) -> String {
    let body = SRT_TIMESTAMP.replace_all(strip_bom(source), "$1.$2");
    format!("WEBVTT\n\n{}", body)
}

fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_converts_line_breaks() {
        let entry = CaptionEntry {
            start: 0.0,
            end: 1.0,
            text: "one\ntwo".to_string(),
        };

        assert_eq!(entry.html(), "one<br/>two");
    }

    #[test]
    fn contains_is_inclusive() {
        let entry = CaptionEntry {
            start: 1.0,
            end: 2.0,
            text: "x".to_string(),
        };

        assert!(entry.contains(1.0));
        assert!(entry.contains(2.0));
        assert!(!entry.contains(2.0001));
    }

    #[test]
    fn bare_timing_without_text_is_dropped() {
        assert!(parse_srt("1\n00:00:01,000 --> 00:00:02,000\n   \n").is_empty());
    }
}
