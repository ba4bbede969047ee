#![forbid(unsafe_code)]

//! folio public facade crate.
//!
//! Scroll reveal, text rotator, custom cursor and the host-driven page
//! runner behind one dependency.

pub mod prelude {
    pub use folio_core as core;
    pub use folio_cursor as cursor;
    pub use folio_reveal as reveal;
    pub use folio_rotator as rotator;
    #[cfg(feature = "web")]
    pub use folio_web as web;

    pub use folio_core::{AppConfig, ElementHost, ElementId, FolioError, Scheduler, TimerQueue};
    pub use folio_cursor::CursorFollower;
    pub use folio_reveal::{RevealEffect, RevealOptions, ScrollRevealController};
    pub use folio_rotator::TextRotatorController;
    #[cfg(feature = "web")]
    pub use folio_web::PageRunner;
}
