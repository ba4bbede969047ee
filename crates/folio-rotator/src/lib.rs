#![forbid(unsafe_code)]

//! Text rotator: type a phrase one grapheme at a time, pause, delete it, move
//! to the next phrase, forever.
//!
//! The cycle lives in [`machine::TypingMachine`], a plain state machine that
//! advances on explicit ticks and can be driven without any timer.
//! [`controller::TextRotatorController`] schedules those ticks on an injected
//! [`folio_core::Scheduler`] and cancels them on teardown.

pub mod controller;
pub mod machine;
pub mod phrase;

pub use controller::{TextRotatorController, TextSink};
pub use machine::{Phase, RotatorTiming, TypingMachine};
pub use phrase::{Phrase, PhraseSequence};
