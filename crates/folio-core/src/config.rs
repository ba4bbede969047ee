#![forbid(unsafe_code)]

//! Top-level page configuration.
//!
//! `AppConfig` is constructed once and handed to the composition root; no
//! controller reads ambient global state. Sources, lowest to highest
//! precedence:
//!
//! 1. [`AppConfig::default`]
//! 2. JSON supplied by the host (with the `serde` feature)
//! 3. `FOLIO_*` environment variables via [`AppConfig::with_env_overrides`]

use std::env;

use web_time::Duration;

use crate::error::{FolioError, Result};

/// Phrases cycled by the hero text rotator when none are configured.
pub const DEFAULT_PHRASES: [&str; 3] = ["SOURAV", "DESIGNER", "DEVELOPER"];

/// Explicit page configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppConfig {
    /// Dark color scheme. The page design is light-only, so this stays off
    /// unless a host explicitly opts in.
    pub dark_mode: bool,
    /// Phrases for the hero text rotator, in display order.
    pub phrases: Vec<String>,
    /// Delay between typed characters.
    pub typing_speed_ms: u64,
    /// Delay between deleted characters.
    pub deleting_speed_ms: u64,
    /// Pause after a phrase is fully typed.
    pub pause_ms: u64,
    /// Fraction of an element's area that must be on screen to reveal it.
    pub reveal_threshold: f32,
    /// Uniform root margin (px) applied around the viewport.
    pub reveal_root_margin_px: f64,
    /// Per-frame interpolation factor for the cursor ring.
    pub cursor_easing: f64,
    /// Duration of the click ripple.
    pub click_ripple_ms: u64,
    /// Delay before the hero image fades in.
    pub image_fade_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            phrases: DEFAULT_PHRASES.iter().map(|p| (*p).to_string()).collect(),
            typing_speed_ms: 70,
            deleting_speed_ms: 40,
            pause_ms: 1500,
            reveal_threshold: 0.1,
            reveal_root_margin_px: 0.0,
            cursor_easing: 0.1,
            click_ripple_ms: 300,
            image_fade_delay_ms: 500,
        }
    }
}

impl AppConfig {
    /// Apply `FOLIO_*` environment variable overrides.
    ///
    /// Unparseable values are ignored and the previous value is kept.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (same keys as the
    /// environment variables).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("FOLIO_DARK_MODE") {
            self.dark_mode = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Some(val) = lookup("FOLIO_PHRASES") {
            self.phrases = val
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(val) = lookup("FOLIO_TYPING_SPEED_MS")
            && let Ok(n) = val.parse()
        {
            self.typing_speed_ms = n;
        }
        if let Some(val) = lookup("FOLIO_DELETING_SPEED_MS")
            && let Ok(n) = val.parse()
        {
            self.deleting_speed_ms = n;
        }
        if let Some(val) = lookup("FOLIO_PAUSE_MS")
            && let Ok(n) = val.parse()
        {
            self.pause_ms = n;
        }
        if let Some(val) = lookup("FOLIO_REVEAL_THRESHOLD")
            && let Ok(n) = val.parse()
        {
            self.reveal_threshold = n;
        }
        if let Some(val) = lookup("FOLIO_REVEAL_ROOT_MARGIN_PX")
            && let Ok(n) = val.parse()
        {
            self.reveal_root_margin_px = n;
        }
        if let Some(val) = lookup("FOLIO_CURSOR_EASING")
            && let Ok(n) = val.parse()
        {
            self.cursor_easing = n;
        }
        if let Some(val) = lookup("FOLIO_CLICK_RIPPLE_MS")
            && let Ok(n) = val.parse()
        {
            self.click_ripple_ms = n;
        }
        if let Some(val) = lookup("FOLIO_IMAGE_FADE_DELAY_MS")
            && let Ok(n) = val.parse()
        {
            self.image_fade_delay_ms = n;
        }
        self
    }

    /// Reject values no controller can run with.
    ///
    /// # Errors
    ///
    /// [`FolioError::EmptyPhraseSequence`] when no phrases are configured,
    /// [`FolioError::InvalidConfig`] for an out-of-range threshold, a
    /// non-finite root margin or an easing outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.phrases.is_empty() {
            return Err(FolioError::EmptyPhraseSequence);
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(FolioError::invalid(
                "reveal_threshold",
                format!("{} is outside [0, 1]", self.reveal_threshold),
            ));
        }
        if !self.reveal_root_margin_px.is_finite() {
            return Err(FolioError::invalid(
                "reveal_root_margin_px",
                "must be finite",
            ));
        }
        if !(self.cursor_easing > 0.0 && self.cursor_easing <= 1.0) {
            return Err(FolioError::invalid(
                "cursor_easing",
                format!("{} is outside (0, 1]", self.cursor_easing),
            ));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn typing_speed(&self) -> Duration {
        Duration::from_millis(self.typing_speed_ms)
    }

    #[inline]
    #[must_use]
    pub fn deleting_speed(&self) -> Duration {
        Duration::from_millis(self.deleting_speed_ms)
    }

    #[inline]
    #[must_use]
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    #[inline]
    #[must_use]
    pub fn click_ripple(&self) -> Duration {
        Duration::from_millis(self.click_ripple_ms)
    }

    #[inline]
    #[must_use]
    pub fn image_fade_delay(&self) -> Duration {
        Duration::from_millis(self.image_fade_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_page_timings() {
        let config = AppConfig::default();
        assert!(!config.dark_mode);
        assert_eq!(config.phrases, vec!["SOURAV", "DESIGNER", "DEVELOPER"]);
        assert_eq!(config.typing_speed(), Duration::from_millis(70));
        assert_eq!(config.deleting_speed(), Duration::from_millis(40));
        assert_eq!(config.pause(), Duration::from_millis(1500));
        assert_eq!(config.click_ripple(), Duration::from_millis(300));
        assert_eq!(config.image_fade_delay(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_apply() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("FOLIO_PHRASES", "A, BB ,,CCC"),
            ("FOLIO_TYPING_SPEED_MS", "10"),
            ("FOLIO_DARK_MODE", "TRUE"),
            ("FOLIO_REVEAL_THRESHOLD", "0.5"),
        ]));
        assert_eq!(config.phrases, vec!["A", "BB", "CCC"]);
        assert_eq!(config.typing_speed_ms, 10);
        assert!(config.dark_mode);
        assert!((config.reveal_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn unparseable_override_keeps_previous_value() {
        let config =
            AppConfig::default().with_overrides(lookup(&[("FOLIO_PAUSE_MS", "soon")]));
        assert_eq!(config.pause_ms, 1500);
    }

    #[test]
    fn validate_rejects_empty_phrases() {
        let config = AppConfig {
            phrases: Vec::new(),
            ..AppConfig::default()
        };
        assert_eq!(config.validate(), Err(FolioError::EmptyPhraseSequence));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let config = AppConfig {
            reveal_threshold: 1.5,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FolioError::InvalidConfig {
                field: "reveal_threshold",
                ..
            })
        ));

        let config = AppConfig {
            cursor_easing: 0.0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FolioError::InvalidConfig {
                field: "cursor_easing",
                ..
            })
        ));
    }

    #[test]
    fn env_overrides_read_process_environment() {
        let expected = AppConfig::default().with_overrides(|key| env::var(key).ok());
        assert_eq!(AppConfig::default().with_env_overrides(), expected);
        if !env::vars().any(|(key, _)| key.starts_with("FOLIO_")) {
            assert_eq!(expected, AppConfig::default());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"phrases":["X"],"pause_ms":10}"#).expect("valid json");
        assert_eq!(config.phrases, vec!["X"]);
        assert_eq!(config.pause_ms, 10);
        assert_eq!(config.typing_speed_ms, 70);
    }
}
