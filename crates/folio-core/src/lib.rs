#![forbid(unsafe_code)]

//! Core: host capabilities, timers, geometry, configuration and logging.
//!
//! Everything the page controllers need from their environment is expressed
//! here as an injected capability:
//!
//! - [`element::ElementHost`] applies visual state (classes, styles, text).
//! - [`timer::Scheduler`] runs a callback after a delay and can cancel it.
//! - [`cancel::Lifetime`] tells a callback whether its owner was disposed.
//!
//! The crate is single-threaded by construction: shared handles are
//! `Rc<RefCell<..>>` and nothing here is `Send`.

pub mod logging;

pub mod cancel;
pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod timer;

pub use config::AppConfig;
pub use element::{ElementHost, ElementId, PatchBuffer, StylePatch};
pub use error::{FolioError, Result};
pub use geometry::{Margin, Point, Rect};
pub use timer::{Scheduler, TimerId, TimerQueue};
