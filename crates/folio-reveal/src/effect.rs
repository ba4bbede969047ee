#![forbid(unsafe_code)]

//! Entrance effect variants.
//!
//! Every variant pairs a hidden transform with its revealed transform and
//! fades opacity from 0 to 1. The host stylesheet keys the hidden state on
//! the effect class and the revealed state on `effect.is-visible`, so the
//! controller only toggles classes and the browser runs the transition.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::{HIDDEN_CLASS, VISIBLE_CLASS};

/// Timing shared by every effect.
pub const TRANSITION_TIMING: &str = "1.0s cubic-bezier(0.25, 0.46, 0.45, 0.94)";

/// Entrance animation applied when an element is revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RevealEffect {
    /// Rise 30px while fading in.
    #[default]
    FadeInUp,
    /// Slide in from 30px to the left while fading in.
    FadeInLeft,
}

impl RevealEffect {
    pub const ALL: [RevealEffect; 2] = [RevealEffect::FadeInUp, RevealEffect::FadeInLeft];

    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::FadeInUp => "fade-in-up",
            Self::FadeInLeft => "fade-in-left",
        }
    }

    #[must_use]
    pub const fn hidden_transform(self) -> &'static str {
        match self {
            Self::FadeInUp => "translateY(30px)",
            Self::FadeInLeft => "translateX(-30px)",
        }
    }

    #[must_use]
    pub const fn revealed_transform(self) -> &'static str {
        match self {
            Self::FadeInUp => "translateY(0)",
            Self::FadeInLeft => "translateX(0)",
        }
    }

    /// CSS rules for this effect's hidden and revealed states.
    #[must_use]
    pub fn css(self) -> String {
        let class = self.class_name();
        format!(
            ".{class} {{\n    transition: opacity {TRANSITION_TIMING}, transform {TRANSITION_TIMING};\n    transform: {hidden};\n}}\n\
             .{class}.{VISIBLE_CLASS} {{\n    opacity: 1;\n    transform: {shown};\n}}\n",
            hidden = self.hidden_transform(),
            shown = self.revealed_transform(),
        )
    }
}

/// The full reveal stylesheet: the hidden base state plus every effect.
#[must_use]
pub fn stylesheet() -> String {
    let mut css = format!(".{HIDDEN_CLASS} {{\n    opacity: 0;\n}}\n");
    for effect in RevealEffect::ALL {
        let _ = write!(css, "{}", effect.css());
    }
    css
}

impl fmt::Display for RevealEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Error for an unrecognized effect name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffect(pub String);

impl fmt::Display for UnknownEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown reveal effect: {}", self.0)
    }
}

impl std::error::Error for UnknownEffect {}

impl FromStr for RevealEffect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fade-in-up" | "fade-up" => Ok(Self::FadeInUp),
            "fade-in-left" | "fade-left" => Ok(Self::FadeInLeft),
            other => Err(UnknownEffect(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_pairs() {
        assert_eq!(RevealEffect::FadeInUp.hidden_transform(), "translateY(30px)");
        assert_eq!(RevealEffect::FadeInUp.revealed_transform(), "translateY(0)");
        assert_eq!(RevealEffect::FadeInLeft.hidden_transform(), "translateX(-30px)");
        assert_eq!(RevealEffect::FadeInLeft.revealed_transform(), "translateX(0)");
    }

    #[test]
    fn default_is_fade_in_up() {
        assert_eq!(RevealEffect::default(), RevealEffect::FadeInUp);
    }

    #[test]
    fn parse_accepts_short_and_long_names() {
        assert_eq!("fade-up".parse::<RevealEffect>(), Ok(RevealEffect::FadeInUp));
        assert_eq!("fade-in-left".parse::<RevealEffect>(), Ok(RevealEffect::FadeInLeft));
        assert_eq!(
            "spin".parse::<RevealEffect>(),
            Err(UnknownEffect("spin".into()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for effect in RevealEffect::ALL {
            assert_eq!(effect.to_string().parse::<RevealEffect>(), Ok(effect));
        }
    }

    #[test]
    fn stylesheet_covers_every_effect() {
        let css = stylesheet();
        assert!(css.starts_with(".hidden-element {\n    opacity: 0;\n}"));
        assert!(css.contains(".fade-in-up.is-visible {"));
        assert!(css.contains(".fade-in-left {"));
        assert!(css.contains("transform: translateX(-30px);"));
        assert!(css.contains(TRANSITION_TIMING));
    }
}
