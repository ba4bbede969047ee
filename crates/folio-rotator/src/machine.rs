#![forbid(unsafe_code)]

//! The rotator cycle as one explicit state machine.
//!
//! ```text
//!            tick (typed < len)
//!           ┌────────┐
//!           ▼        │
//!   ┌──► Typing ─────┘──(typed == len)──► PausedAfterTyping
//!   │                                            │ tick
//!   │                                            ▼
//!   │                      ┌──────────────── Deleting ◄──┐
//!   │                      │ (typed == 0)        │       │ tick (typed > 0)
//!   │                      ▼                     └───────┘
//!   └──── AdvancingPhrase (index + 1 mod len, zero delay)
//! ```
//!
//! # Invariants
//!
//! 1. `typed` is always within `[0, active_phrase.len()]`.
//! 2. `phrase_index` is always `< sequence.len()`.
//! 3. Every full cycle contains at least one non-zero delay, so a driver that
//!    honours [`TypingMachine::next_delay`] never spins.

use folio_core::AppConfig;
use folio_core::error::Result;
use web_time::Duration;

use crate::phrase::{Phrase, PhraseSequence};

/// Lower bound for the typing and deleting delays.
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Rotator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Typing,
    PausedAfterTyping,
    Deleting,
    /// Transient: resolved by the next tick without any delay.
    AdvancingPhrase,
}

/// Delays between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotatorTiming {
    typing: Duration,
    deleting: Duration,
    pause: Duration,
}

impl Default for RotatorTiming {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(70),
            Duration::from_millis(40),
            Duration::from_millis(1500),
        )
    }
}

impl RotatorTiming {
    /// Typing and deleting delays are raised to [`MIN_TICK`].
    #[must_use]
    pub fn new(typing: Duration, deleting: Duration, pause: Duration) -> Self {
        Self {
            typing: typing.max(MIN_TICK),
            deleting: deleting.max(MIN_TICK),
            pause,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.typing_speed(),
            config.deleting_speed(),
            config.pause(),
        )
    }

    #[inline]
    #[must_use]
    pub const fn typing(&self) -> Duration {
        self.typing
    }

    #[inline]
    #[must_use]
    pub const fn deleting(&self) -> Duration {
        self.deleting
    }

    #[inline]
    #[must_use]
    pub const fn pause(&self) -> Duration {
        self.pause
    }
}

/// Typing state plus the phrase sequence it walks.
#[derive(Debug, Clone)]
pub struct TypingMachine {
    phrases: PhraseSequence,
    timing: RotatorTiming,
    phrase_index: usize,
    typed: usize,
    phase: Phase,
}

impl TypingMachine {
    /// Start at phrase 0 with empty text, typing.
    #[must_use]
    pub fn new(phrases: PhraseSequence, timing: RotatorTiming) -> Self {
        let mut machine = Self {
            phrases,
            timing,
            phrase_index: 0,
            typed: 0,
            phase: Phase::Typing,
        };
        machine.enter_typing();
        machine
    }

    /// Machine for the configured phrases and speeds.
    ///
    /// # Errors
    ///
    /// Fails with `EmptyPhraseSequence` when no phrases are configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let phrases = PhraseSequence::new(config.phrases.iter().map(String::as_str))?;
        Ok(Self::new(phrases, RotatorTiming::from_config(config)))
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    #[must_use]
    pub fn active_phrase(&self) -> &Phrase {
        self.phrases.get(self.phrase_index)
    }

    /// Graphemes of the active phrase currently shown.
    #[inline]
    #[must_use]
    pub fn typed_len(&self) -> usize {
        self.typed
    }

    #[must_use]
    pub fn current_text(&self) -> &str {
        self.active_phrase().prefix(self.typed)
    }

    #[inline]
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.phase == Phase::Deleting
    }

    #[must_use]
    pub fn phrases(&self) -> &PhraseSequence {
        &self.phrases
    }

    #[must_use]
    pub fn timing(&self) -> RotatorTiming {
        self.timing
    }

    /// Current inter-keystroke delay.
    #[must_use]
    pub fn speed(&self) -> Duration {
        if self.is_deleting() {
            self.timing.deleting
        } else {
            self.timing.typing
        }
    }

    /// Delay before the next [`tick`](Self::tick) is due.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        match self.phase {
            Phase::Typing => self.timing.typing,
            Phase::PausedAfterTyping => self.timing.pause,
            Phase::Deleting => self.timing.deleting,
            Phase::AdvancingPhrase => Duration::ZERO,
        }
    }

    /// Perform one transition. Returns `true` if the visible text changed.
    pub fn tick(&mut self) -> bool {
        match self.phase {
            Phase::Typing => {
                self.typed = (self.typed + 1).min(self.active_phrase().len());
                if self.typed == self.active_phrase().len() {
                    self.phase = Phase::PausedAfterTyping;
                }
                true
            }
            Phase::PausedAfterTyping => {
                self.phase = Phase::Deleting;
                false
            }
            Phase::Deleting => {
                let changed = self.typed > 0;
                self.typed = self.typed.saturating_sub(1);
                if self.typed == 0 {
                    self.phase = Phase::AdvancingPhrase;
                }
                changed
            }
            Phase::AdvancingPhrase => {
                self.phrase_index = self.phrases.next_index(self.phrase_index);
                self.typed = 0;
                self.enter_typing();
                false
            }
        }
    }

    /// Tick until the machine is in a phase with a real delay. Returns
    /// `true` if the visible text changed.
    pub fn tick_settled(&mut self) -> bool {
        let changed = self.tick();
        if self.phase == Phase::AdvancingPhrase {
            self.tick();
        }
        changed
    }

    fn enter_typing(&mut self) {
        self.phase = if self.active_phrase().is_empty() {
            Phase::PausedAfterTyping
        } else {
            Phase::Typing
        };
    }
}
