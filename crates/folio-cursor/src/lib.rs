#![forbid(unsafe_code)]

//! Custom cursor: a 50px ring that eases toward the pointer and a 10px dot
//! that tracks it exactly.
//!
//! The host feeds pointer positions, hover changes and presses; each
//! animation frame it calls [`CursorFollower::frame`], which interpolates the
//! ring and writes both transforms through the [`ElementHost`]. A press
//! adds [`CLICK_CLASS`] to the ring and schedules its removal.
//!
//! # Invariants
//!
//! 1. For a fixed target the ring's distance to it never increases between
//!    frames.
//! 2. The dot is always drawn at the target.
//! 3. At most one ripple timer is pending; a new press restarts it.
//! 4. After `dispose` no timer is pending and no input or frame writes to
//!    the host.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use folio_core::AppConfig;
use folio_core::cancel::{Lifetime, LifetimeHandle};
use folio_core::element::{ElementHost, ElementId};
use folio_core::geometry::Point;
use folio_core::timer::{Scheduler, TimerId};
use folio_core::{debug, trace};
use web_time::Duration;

/// Ring diameter in px.
pub const RING_SIZE: f64 = 50.0;
/// Dot diameter in px.
pub const DOT_SIZE: f64 = 10.0;

pub const RING_CLASS: &str = "custom-cursor-outer";
pub const DOT_CLASS: &str = "custom-cursor-inner";
pub const HOVER_CLASS: &str = "is-hovering";
pub const CLICK_CLASS: &str = "is-clicked";

/// Elements whose hover puts the cursor in the hovering state.
pub const INTERACTIVE_SELECTOR: &str = "a, button, [data-cursor-interactive]";

/// Below this distance (px) the ring snaps onto the target.
pub const SNAP_EPSILON: f64 = 0.01;

bitflags! {
    /// Cursor interaction state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CursorFlags: u8 {
        const HOVERING = 0b0000_0001;
        const CLICKED  = 0b0000_0010;
    }
}

/// Easing and ripple parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorOptions {
    /// Fraction of the remaining distance covered per frame, in `(0, 1]`.
    pub easing: f64,
    pub click_ripple: Duration,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            easing: 0.1,
            click_ripple: Duration::from_millis(300),
        }
    }
}

impl CursorOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            easing: config.cursor_easing,
            click_ripple: config.click_ripple(),
        }
    }
}

/// CSS transform centring an element of `size` on `p`.
#[must_use]
pub fn centered_transform(p: Point, size: f64) -> String {
    let half = size / 2.0;
    format!("translate3d({:.2}px, {:.2}px, 0)", p.x - half, p.y - half)
}

#[derive(Debug, Default)]
struct CursorState {
    target: Point,
    current: Point,
    flags: CursorFlags,
    ripple: Option<TimerId>,
    frames: u64,
    ring_transform: String,
    dot_transform: String,
}

/// Ring-and-dot cursor bound to two host elements.
///
/// Dropping the follower disposes it.
pub struct CursorFollower<S, H>
where
    S: Scheduler + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    state: Rc<RefCell<CursorState>>,
    ring: ElementId,
    dot: ElementId,
    options: CursorOptions,
    scheduler: S,
    host: H,
    lifetime: LifetimeHandle,
}

impl<S, H> fmt::Debug for CursorFollower<S, H>
where
    S: Scheduler + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("CursorFollower")
            .field("ring", &self.ring)
            .field("dot", &self.dot)
            .field("target", &state.target)
            .field("current", &state.current)
            .field("flags", &state.flags)
            .finish()
    }
}

impl<S, H> CursorFollower<S, H>
where
    S: Scheduler + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    /// Attach to the ring and dot elements. Both start at the origin.
    pub fn mount(
        ring: ElementId,
        dot: ElementId,
        options: CursorOptions,
        scheduler: S,
        host: H,
        scope: &Lifetime,
    ) -> Self {
        let (_, lifetime) = scope.child();
        host.add_class(ring, RING_CLASS);
        host.add_class(dot, DOT_CLASS);
        host.set_style(ring, "z-index", "9999");
        host.set_style(dot, "z-index", "9999");
        let follower = Self {
            state: Rc::new(RefCell::new(CursorState::default())),
            ring,
            dot,
            options,
            scheduler,
            host,
            lifetime,
        };
        follower.write_transforms();
        trace!(message = "cursor.mount", ring = ring.0, dot = dot.0);
        follower
    }

    fn is_live(&self) -> bool {
        !self.lifetime.is_disposed()
    }

    /// Move the target to `(x, y)` (viewport coordinates).
    pub fn pointer_move(&self, x: f64, y: f64) {
        if !self.is_live() {
            return;
        }
        self.state.borrow_mut().target = Point::new(x, y);
    }

    /// Advance one animation frame. Returns `true` if the ring moved.
    pub fn frame(&self) -> bool {
        if !self.is_live() {
            return false;
        }
        let moved = {
            let mut state = self.state.borrow_mut();
            state.frames += 1;
            let before = state.current;
            let next = before.lerp(state.target, self.options.easing);
            state.current = if next.distance(state.target) < SNAP_EPSILON {
                state.target
            } else {
                next
            };
            state.current != before
        };
        self.write_transforms();
        moved
    }

    /// Enter or leave an interactive element.
    pub fn set_hovering(&self, hovering: bool) {
        if !self.is_live() {
            return;
        }
        let changed = {
            let mut state = self.state.borrow_mut();
            let was = state.flags.contains(CursorFlags::HOVERING);
            state.flags.set(CursorFlags::HOVERING, hovering);
            was != hovering
        };
        if !changed {
            return;
        }
        for el in [self.ring, self.dot] {
            if hovering {
                self.host.add_class(el, HOVER_CLASS);
            } else {
                self.host.remove_class(el, HOVER_CLASS);
            }
        }
    }

    /// Pointer press: show the ripple and clear it after the ripple
    /// duration. A press during a running ripple restarts the timer.
    pub fn pointer_down(&self) {
        if !self.is_live() {
            return;
        }
        let (previous, newly_clicked) = {
            let mut state = self.state.borrow_mut();
            let newly = !state.flags.contains(CursorFlags::CLICKED);
            state.flags.insert(CursorFlags::CLICKED);
            (state.ripple.take(), newly)
        };
        if let Some(id) = previous {
            self.scheduler.cancel(id);
        }
        if newly_clicked {
            self.host.add_class(self.ring, CLICK_CLASS);
        }

        let weak = Rc::downgrade(&self.state);
        let host = self.host.clone();
        let ring = self.ring;
        let lifetime = self.lifetime.lifetime();
        let id = self.scheduler.schedule(
            self.options.click_ripple,
            Box::new(move || {
                if lifetime.is_disposed() {
                    return;
                }
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut state = state.borrow_mut();
                state.ripple = None;
                state.flags.remove(CursorFlags::CLICKED);
                host.remove_class(ring, CLICK_CLASS);
            }),
        );
        self.state.borrow_mut().ripple = Some(id);
        debug!(message = "cursor.click", ring = ring.0, restarted = !newly_clicked);
    }

    #[must_use]
    pub fn ring(&self) -> ElementId {
        self.ring
    }

    #[must_use]
    pub fn dot(&self) -> ElementId {
        self.dot
    }

    #[must_use]
    pub fn flags(&self) -> CursorFlags {
        self.state.borrow().flags
    }

    #[must_use]
    pub fn target(&self) -> Point {
        self.state.borrow().target
    }

    /// The ring's smoothed position.
    #[must_use]
    pub fn current(&self) -> Point {
        self.state.borrow().current
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_disposed()
    }

    /// Cancel the ripple timer and ignore all later input. Idempotent.
    pub fn dispose(&self) {
        if !self.lifetime.dispose() {
            return;
        }
        let ripple = self.state.borrow_mut().ripple.take();
        if let Some(id) = ripple {
            self.scheduler.cancel(id);
        }
    }

    /// Write ring and dot transforms, skipping unchanged values.
    fn write_transforms(&self) {
        let (ring, dot) = {
            let mut state = self.state.borrow_mut();
            let ring = centered_transform(state.current, RING_SIZE);
            let dot = centered_transform(state.target, DOT_SIZE);
            let ring = (ring != state.ring_transform).then(|| {
                state.ring_transform.clone_from(&ring);
                ring
            });
            let dot = (dot != state.dot_transform).then(|| {
                state.dot_transform.clone_from(&dot);
                dot
            });
            (ring, dot)
        };
        if let Some(value) = ring {
            self.host.set_style(self.ring, "transform", &value);
        }
        if let Some(value) = dot {
            self.host.set_style(self.dot, "transform", &value);
        }
    }
}

impl<S, H> Drop for CursorFollower<S, H>
where
    S: Scheduler + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}
