#![forbid(unsafe_code)]

//! Scroll reveal: flip elements from hidden to visible the first time they
//! enter the viewport.
//!
//! - [`effect::RevealEffect`] names the entrance animation and its CSS.
//! - [`observer::ViewportObserver`] is the injected visibility capability;
//!   [`observer::GeometryObserver`] computes visibility from rectangles.
//! - [`controller::ScrollRevealController`] ties one element to one
//!   observation and reveals it at most once.
//! - [`image::ImageFade`] fades the hero image in after a fixed delay.

pub mod controller;
pub mod effect;
pub mod image;
pub mod observer;

pub use controller::{RevealOptions, RevealTarget, ScrollRevealController};
pub use effect::RevealEffect;
pub use image::ImageFade;
pub use observer::{GeometryObserver, ObserverOptions, ViewportObserver, VisibilityEvent};

/// Class applied on registration (opacity 0).
pub const HIDDEN_CLASS: &str = "hidden-element";

/// Class applied when the element is revealed.
pub const VISIBLE_CLASS: &str = "is-visible";
