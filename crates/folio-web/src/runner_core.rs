#![forbid(unsafe_code)]

//! Host-driven page runner.
//!
//! [`PageRunner`] owns one instance of every capability (timer queue,
//! geometry observer, patch buffer) plus the controllers mounted on the page.
//! The host pushes geometry and pointer input, calls [`PageRunner::step`]
//! once per animation frame, and applies the drained [`StylePatch`]es to its
//! document. Given the same input sequence the patch stream is identical.

use ahash::AHashMap;
use folio_core::cancel::{Lifetime, LifetimeHandle};
use folio_core::element::{ElementHost, ElementId, PatchBuffer, StylePatch};
use folio_core::geometry::Rect;
use folio_core::timer::TimerQueue;
use folio_core::{AppConfig, debug, trace, warn};
use folio_cursor::{CursorFollower, CursorOptions};
use folio_reveal::{GeometryObserver, ImageFade, RevealOptions, ScrollRevealController};
use folio_rotator::TextRotatorController;
use serde::Serialize;
use web_time::Duration;

use crate::error::{InputError, Result};
use crate::input::HostInput;

/// Class toggled on the document root for the dark scheme.
pub const DARK_CLASS: &str = "dark";

type Reveal = ScrollRevealController<GeometryObserver, PatchBuffer>;
type Rotator = TextRotatorController<TimerQueue>;
type Cursor = CursorFollower<TimerQueue, PatchBuffer>;

/// Counters for one [`PageRunner::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepResult {
    /// `false` once the runner has been disposed.
    pub running: bool,
    pub timers_fired: usize,
    pub visibility_events: usize,
    pub cursor_moved: bool,
    /// Patches waiting to be drained after this step.
    pub pending_patches: usize,
    pub frame_idx: u64,
}

/// Composition root for the page controllers.
pub struct PageRunner {
    config: AppConfig,
    queue: TimerQueue,
    observer: GeometryObserver,
    host: PatchBuffer,
    scope: Lifetime,
    page: LifetimeHandle,
    reveals: AHashMap<ElementId, Reveal>,
    rotators: AHashMap<ElementId, Rotator>,
    fades: AHashMap<ElementId, ImageFade<TimerQueue>>,
    cursor: Option<Cursor>,
    frame_idx: u64,
}

impl std::fmt::Debug for PageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRunner")
            .field("reveals", &self.reveals.len())
            .field("rotators", &self.rotators.len())
            .field("fades", &self.fades.len())
            .field("cursor", &self.cursor.is_some())
            .field("pending_timers", &self.queue.pending())
            .field("frame_idx", &self.frame_idx)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl PageRunner {
    /// Create a runner with a 0x0 viewport.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is rejected.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let (scope, page) = Lifetime::root();
        debug!(
            message = "runner.new",
            phrases = config.phrases.len(),
            dark_mode = config.dark_mode
        );
        Ok(Self {
            config,
            queue: TimerQueue::new(),
            observer: GeometryObserver::new(0.0, 0.0),
            host: PatchBuffer::new(),
            scope,
            page,
            reveals: AHashMap::new(),
            rotators: AHashMap::new(),
            fades: AHashMap::new(),
            cursor: None,
            frame_idx: 0,
        })
    }

    /// Create a runner from a JSON config; missing fields take defaults and
    /// `FOLIO_*` environment variables override both.
    ///
    /// # Errors
    ///
    /// Malformed JSON or a rejected config.
    pub fn from_config_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        Self::new(config.with_env_overrides())
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.page.is_disposed()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(InputError::Disposed)
        } else {
            Ok(())
        }
    }

    // ── Mounting ────────────────────────────────────────────────────────

    /// Apply the color scheme to the document root.
    pub fn mount_document(&mut self, root: ElementId) {
        if self.is_disposed() {
            return;
        }
        if self.config.dark_mode {
            self.host.add_class(root, DARK_CLASS);
        } else {
            self.host.remove_class(root, DARK_CLASS);
        }
    }

    /// Register `element` for a one-shot reveal. Replaces any previous
    /// reveal on the same element.
    pub fn mount_reveal(&mut self, element: ElementId, options: RevealOptions) {
        if self.is_disposed() {
            return;
        }
        // Dispose first: the old controller unobserves by element.
        if let Some(old) = self.reveals.remove(&element) {
            old.dispose();
        }
        let ctrl = ScrollRevealController::register(
            Some(element),
            options,
            self.observer.clone(),
            self.host.clone(),
            &self.scope,
        );
        self.reveals.insert(element, ctrl);
    }

    /// Reveal options derived from the page config.
    #[must_use]
    pub fn reveal_options(&self) -> RevealOptions {
        RevealOptions::from_config(&self.config)
    }

    /// Start the text rotator writing into `element`.
    ///
    /// # Errors
    ///
    /// Fails if the runner is disposed or the phrase list is empty.
    pub fn mount_rotator(&mut self, element: ElementId) -> Result<()> {
        self.ensure_live()?;
        let rotator =
            TextRotatorController::from_config(&self.config, self.queue.clone(), &self.scope)?;
        let host = self.host.clone();
        rotator.set_text_sink(Box::new(move |text: &str| host.set_text(element, text)));
        self.rotators.insert(element, rotator);
        Ok(())
    }

    /// Attach the custom cursor. Replaces any previous cursor.
    pub fn mount_cursor(&mut self, ring: ElementId, dot: ElementId) {
        if self.is_disposed() {
            return;
        }
        self.cursor = Some(CursorFollower::mount(
            ring,
            dot,
            CursorOptions::from_config(&self.config),
            self.queue.clone(),
            self.host.clone(),
            &self.scope,
        ));
    }

    /// Fade the hero image in after the configured delay.
    pub fn mount_image_fade(&mut self, element: ElementId) {
        if self.is_disposed() {
            return;
        }
        let fade = ImageFade::mount(
            element,
            self.config.image_fade_delay(),
            self.queue.clone(),
            self.host.clone(),
            &self.scope,
        );
        self.fades.insert(element, fade);
    }

    /// Tear down every controller bound to `element`. Returns `true` if
    /// anything was mounted there.
    pub fn unmount(&mut self, element: ElementId) -> bool {
        let mut found = false;
        if let Some(ctrl) = self.reveals.remove(&element) {
            ctrl.dispose();
            found = true;
        }
        if let Some(rotator) = self.rotators.remove(&element) {
            rotator.dispose();
            found = true;
        }
        if let Some(fade) = self.fades.remove(&element) {
            fade.dispose();
            found = true;
        }
        let cursor_bound = self
            .cursor
            .as_ref()
            .is_some_and(|c| c.ring() == element || c.dot() == element);
        if cursor_bound && let Some(cursor) = self.cursor.take() {
            cursor.dispose();
            found = true;
        }
        self.observer.remove_element_rect(element);
        if found {
            trace!(message = "runner.unmount", element = element.0);
        }
        found
    }

    // ── Geometry input ──────────────────────────────────────────────────

    pub fn resize(&mut self, width: f64, height: f64) {
        self.observer
            .resize(finite_or_zero(width).max(0.0), finite_or_zero(height).max(0.0));
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.observer.scroll_to(finite_or_zero(x), finite_or_zero(y));
    }

    /// Report an element's rectangle in document coordinates.
    pub fn set_element_rect(&mut self, element: ElementId, rect: Rect) {
        let rect = Rect::new(
            finite_or_zero(rect.x),
            finite_or_zero(rect.y),
            finite_or_zero(rect.width),
            finite_or_zero(rect.height),
        );
        self.observer.set_element_rect(element, rect);
    }

    pub fn remove_element_rect(&mut self, element: ElementId) {
        self.observer.remove_element_rect(element);
    }

    // ── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(cursor) = &self.cursor {
            cursor.pointer_move(finite_or_zero(x), finite_or_zero(y));
        }
    }

    pub fn pointer_down(&mut self) {
        if let Some(cursor) = &self.cursor {
            cursor.pointer_down();
        }
    }

    pub fn pointer_hover(&mut self, hovering: bool) {
        if let Some(cursor) = &self.cursor {
            cursor.set_hovering(hovering);
        }
    }

    // ── Encoded input ───────────────────────────────────────────────────

    /// Apply one decoded input.
    pub fn apply_input(&mut self, input: HostInput) {
        trace!(message = "runner.input", kind = input.kind());
        match input {
            HostInput::Resize { width, height } => self.resize(width, height),
            HostInput::Scroll { x, y } => self.scroll_to(x, y),
            HostInput::Layout { element, rect } => self.set_element_rect(element, rect),
            HostInput::RemoveLayout { element } => self.remove_element_rect(element),
            HostInput::PointerMove { x, y } => self.pointer_move(x, y),
            HostInput::PointerDown => self.pointer_down(),
            HostInput::Hover { hovering } => self.pointer_hover(hovering),
            HostInput::Unmount { element } => {
                self.unmount(element);
            }
        }
    }

    /// Decode and apply one JSON input.
    ///
    /// # Errors
    ///
    /// Malformed JSON, or the runner is disposed.
    pub fn push_encoded_input(&mut self, json: &str) -> Result<()> {
        self.ensure_live()?;
        match HostInput::decode(json) {
            Ok(input) => {
                self.apply_input(input);
                Ok(())
            }
            Err(err) => {
                warn!(message = "runner.input.rejected", error = %err);
                Err(err)
            }
        }
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Advance time by `dt`: fire due timers in deadline order, deliver
    /// visibility changes, then run one cursor frame.
    pub fn step(&mut self, dt: Duration) -> StepResult {
        if self.is_disposed() {
            return StepResult {
                running: false,
                pending_patches: self.host.len(),
                frame_idx: self.frame_idx,
                ..StepResult::default()
            };
        }
        let timers_fired = self.queue.advance(dt);
        let visibility_events = self.observer.flush();
        let cursor_moved = self.cursor.as_ref().is_some_and(Cursor::frame);
        self.frame_idx += 1;
        let result = StepResult {
            running: true,
            timers_fired,
            visibility_events,
            cursor_moved,
            pending_patches: self.host.len(),
            frame_idx: self.frame_idx,
        };
        trace!(
            message = "runner.step",
            frame_idx = result.frame_idx,
            timers_fired = result.timers_fired,
            visibility_events = result.visibility_events
        );
        result
    }

    /// [`step`](Self::step) with a millisecond delta; negative or
    /// non-finite deltas advance nothing.
    ///
    /// Deltas above [`MAX_STEP`] are clamped to it.
    pub fn advance_time_ms(&mut self, dt_ms: f64) -> StepResult {
        self.step(duration_from_ms(dt_ms).min(MAX_STEP))
    }

    /// Drain the patches produced since the last call.
    pub fn take_patches(&mut self) -> Vec<StylePatch> {
        self.host.take()
    }

    /// [`take_patches`](Self::take_patches) as a JSON array.
    pub fn take_patches_json(&mut self) -> String {
        serde_json::to_string(&self.take_patches()).unwrap_or_else(|_| "[]".to_string())
    }

    /// The recording host, for inspection.
    #[must_use]
    pub fn host(&self) -> &PatchBuffer {
        &self.host
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.queue.now()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.queue.pending()
    }

    #[must_use]
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    #[must_use]
    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.reveals.get(&element).is_some_and(Reveal::is_revealed)
    }

    #[must_use]
    pub fn rotator_text(&self, element: ElementId) -> Option<String> {
        self.rotators.get(&element).map(Rotator::current_text)
    }

    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observer.observed_count()
    }

    /// Tear down every controller. Afterwards no timer fires and no new
    /// patch is produced. Idempotent.
    pub fn dispose(&mut self) {
        if !self.page.dispose() {
            return;
        }
        for (_, ctrl) in self.reveals.drain() {
            ctrl.dispose();
        }
        for (_, rotator) in self.rotators.drain() {
            rotator.dispose();
        }
        for (_, fade) in self.fades.drain() {
            fade.dispose();
        }
        if let Some(cursor) = self.cursor.take() {
            cursor.dispose();
        }
        self.queue.clear();
        debug!(message = "runner.dispose", frame_idx = self.frame_idx);
    }
}

impl Drop for PageRunner {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Longest delta a single [`PageRunner::advance_time_ms`] call applies,
/// e.g. the first frame after a backgrounded tab resumes.
pub const MAX_STEP: Duration = Duration::from_secs(60);

/// Convert a host-supplied millisecond value to a [`Duration`].
///
/// Negative, zero and non-finite values give [`Duration::ZERO`]; values too
/// large to represent saturate to [`Duration::MAX`].
#[must_use]
pub fn duration_from_ms(ms: f64) -> Duration {
    if !(ms.is_finite() && ms > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
