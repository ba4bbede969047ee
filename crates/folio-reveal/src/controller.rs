#![forbid(unsafe_code)]

//! One-shot reveal of a single element.
//!
//! A [`ScrollRevealController`] owns exactly one [`RevealTarget`]. On
//! registration it applies the hidden state and starts observing; the first
//! visibility event at or above the threshold adds the visible class and
//! stops the observation for good.
//!
//! # Invariants
//!
//! 1. `revealed` only ever goes from `false` to `true`.
//! 2. After the reveal the element is no longer observed.
//! 3. After `dispose` (or drop) no visibility event mutates the element,
//!    even if a stale sink is invoked.
//! 4. Registering without an element is a no-op: nothing is observed and
//!    nothing is written to the host.
//!
//! # Failure Modes
//!
//! - Element missing at registration: inert controller, no error.
//! - Observer never reports the element: it stays hidden.

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::AppConfig;
use folio_core::cancel::{Lifetime, LifetimeHandle};
use folio_core::element::{ElementHost, ElementId};
use folio_core::geometry::Margin;
use folio_core::{debug, trace};
use web_time::Duration;

use crate::effect::RevealEffect;
use crate::observer::{ObserverOptions, ViewportObserver, VisibilityEvent};
use crate::{HIDDEN_CLASS, VISIBLE_CLASS};

/// Default fraction of the element that must be visible.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Per-element reveal parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    /// Visible fraction that triggers the reveal, within `[0, 1]`.
    pub threshold: f32,
    /// Margin around the viewport.
    pub root_margin: Margin,
    /// CSS `transition-delay`; presentation only, never a scheduling delay.
    pub delay: Duration,
    pub effect: RevealEffect,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: Margin::ZERO,
            delay: Duration::ZERO,
            effect: RevealEffect::default(),
        }
    }
}

impl RevealOptions {
    /// Threshold and root margin from the page configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            threshold: config.reveal_threshold,
            root_margin: Margin::uniform(config.reveal_root_margin_px),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn root_margin(mut self, margin: Margin) -> Self {
        self.root_margin = margin;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn effect(mut self, effect: RevealEffect) -> Self {
        self.effect = effect;
        self
    }

    /// Whether `event` satisfies this reveal's threshold.
    #[must_use]
    pub fn is_triggered_by(&self, event: &VisibilityEvent) -> bool {
        event.is_intersecting && event.ratio >= f64::from(self.threshold.clamp(0.0, 1.0))
    }
}

/// An element plus its monotonic revealed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTarget {
    element: ElementId,
    revealed: bool,
}

impl RevealTarget {
    #[must_use]
    pub const fn new(element: ElementId) -> Self {
        Self {
            element,
            revealed: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.element
    }

    #[inline]
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Set the flag. Returns `true` only on the first call.
    fn mark_revealed(&mut self) -> bool {
        !std::mem::replace(&mut self.revealed, true)
    }
}

#[derive(Debug)]
struct RevealState {
    target: RevealTarget,
    watching: bool,
}

/// Reveal controller for one element.
///
/// Dropping the controller disposes it.
pub struct ScrollRevealController<O, H>
where
    O: ViewportObserver + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    state: Option<Rc<RefCell<RevealState>>>,
    observer: O,
    // Kept so the host outlives every sink this controller installed.
    _host: H,
    options: RevealOptions,
    lifetime: LifetimeHandle,
}

impl<O, H> std::fmt::Debug for ScrollRevealController<O, H>
where
    O: ViewportObserver + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollRevealController")
            .field("element", &self.element())
            .field("revealed", &self.is_revealed())
            .field("watching", &self.is_watching())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl<O, H> ScrollRevealController<O, H>
where
    O: ViewportObserver + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    /// Register `element` for a one-shot reveal inside `scope`.
    ///
    /// With `element == None` the controller is inert.
    pub fn register(
        element: Option<ElementId>,
        options: RevealOptions,
        observer: O,
        host: H,
        scope: &Lifetime,
    ) -> Self {
        let (lifetime, handle) = scope.child();
        let Some(element) = element else {
            trace!(message = "reveal.register.skipped", reason = "element unavailable");
            return Self {
                state: None,
                observer,
                _host: host,
                options,
                lifetime: handle,
            };
        };

        host.add_class(element, HIDDEN_CLASS);
        host.add_class(element, options.effect.class_name());
        host.set_style(
            element,
            "transition-delay",
            &format!("{}ms", options.delay.as_millis()),
        );

        let state = Rc::new(RefCell::new(RevealState {
            target: RevealTarget::new(element),
            watching: true,
        }));

        let sink = {
            let weak = Rc::downgrade(&state);
            let observer = observer.clone();
            let host = host.clone();
            let options = options.clone();
            Box::new(move |event: &VisibilityEvent| {
                if lifetime.is_disposed() || event.element != element {
                    return;
                }
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut state = state.borrow_mut();
                if !state.watching || !options.is_triggered_by(event) {
                    return;
                }
                if state.target.mark_revealed() {
                    host.add_class(element, VISIBLE_CLASS);
                    debug!(
                        message = "reveal.fire",
                        element = element.0,
                        ratio = event.ratio,
                        effect = options.effect.class_name()
                    );
                }
                state.watching = false;
                observer.unobserve(element);
            })
        };

        observer.observe(
            element,
            ObserverOptions::threshold(options.threshold).root_margin(options.root_margin),
            sink,
        );
        trace!(
            message = "reveal.register",
            element = element.0,
            threshold = f64::from(options.threshold)
        );

        Self {
            state: Some(state),
            observer,
            _host: host,
            options,
            lifetime: handle,
        }
    }

    /// The registered element, if one was available.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        self.state.as_ref().map(|s| s.borrow().target.element())
    }

    #[must_use]
    pub fn target(&self) -> Option<RevealTarget> {
        self.state.as_ref().map(|s| s.borrow().target)
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.borrow().target.is_revealed())
    }

    /// Whether the element is still being observed.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.borrow().watching)
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_disposed()
    }

    #[must_use]
    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Stop observing (if still observing) and ignore any later event.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        if !self.lifetime.dispose() {
            return;
        }
        let Some(state) = &self.state else {
            return;
        };
        let mut state = state.borrow_mut();
        if state.watching {
            state.watching = false;
            self.observer.unobserve(state.target.element());
            trace!(message = "reveal.dispose", element = state.target.element().0);
        }
    }
}

impl<O, H> Drop for ScrollRevealController<O, H>
where
    O: ViewportObserver + Clone + 'static,
    H: ElementHost + Clone + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{GeometryObserver, VisibilitySink};
    use ahash::AHashMap;
    use folio_core::element::PatchBuffer;
    use folio_core::geometry::Rect;

    const EL: ElementId = ElementId(3);

    /// Observer that keeps every sink forever so tests can fire stale events.
    #[derive(Clone, Default)]
    struct MockObserver {
        sinks: Rc<RefCell<AHashMap<ElementId, VisibilitySink>>>,
        observed: Rc<RefCell<Vec<ElementId>>>,
        unobserved: Rc<RefCell<Vec<ElementId>>>,
    }

    impl MockObserver {
        fn fire(&self, element: ElementId, ratio: f64) {
            let sink = self.sinks.borrow_mut().remove(&element);
            if let Some(mut sink) = sink {
                sink(&VisibilityEvent {
                    element,
                    ratio,
                    is_intersecting: ratio > 0.0,
                });
                self.sinks.borrow_mut().insert(element, sink);
            }
        }
    }

    impl ViewportObserver for MockObserver {
        fn observe(&self, element: ElementId, _options: ObserverOptions, sink: VisibilitySink) {
            self.observed.borrow_mut().push(element);
            self.sinks.borrow_mut().insert(element, sink);
        }

        fn unobserve(&self, element: ElementId) -> bool {
            self.unobserved.borrow_mut().push(element);
            true
        }
    }

    fn scope() -> (Lifetime, LifetimeHandle) {
        Lifetime::root()
    }

    #[test]
    fn registration_applies_hidden_state() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let options = RevealOptions::default()
            .effect(RevealEffect::FadeInLeft)
            .delay(Duration::from_millis(200));
        let ctrl = ScrollRevealController::register(
            Some(EL),
            options,
            observer.clone(),
            host.clone(),
            &scope,
        );

        assert!(host.has_class(EL, HIDDEN_CLASS));
        assert!(host.has_class(EL, "fade-in-left"));
        assert!(!host.has_class(EL, VISIBLE_CLASS));
        assert_eq!(host.style(EL, "transition-delay").as_deref(), Some("200ms"));
        assert_eq!(*observer.observed.borrow(), vec![EL]);
        assert!(ctrl.is_watching());
        assert!(!ctrl.is_revealed());
    }

    #[test]
    fn below_threshold_does_not_reveal() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        observer.fire(EL, 0.05);
        assert!(!ctrl.is_revealed());
        assert!(ctrl.is_watching());
        assert!(observer.unobserved.borrow().is_empty());
    }

    #[test]
    fn crossing_threshold_reveals_and_unobserves() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        observer.fire(EL, 0.1);
        assert!(ctrl.is_revealed());
        assert!(!ctrl.is_watching());
        assert!(host.has_class(EL, VISIBLE_CLASS));
        assert_eq!(*observer.unobserved.borrow(), vec![EL]);
    }

    #[test]
    fn reveal_happens_once() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let _ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        observer.fire(EL, 0.5);
        let after_reveal = host.mutations(EL);
        // Leave and re-enter the viewport through a stale sink.
        observer.fire(EL, 0.0);
        observer.fire(EL, 1.0);
        assert_eq!(host.mutations(EL), after_reveal);
        assert!(host.has_class(EL, VISIBLE_CLASS));
        assert_eq!(observer.unobserved.borrow().len(), 1);
    }

    #[test]
    fn dispose_then_event_does_not_mutate() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        let before = host.mutations(EL);
        ctrl.dispose();
        assert_eq!(*observer.unobserved.borrow(), vec![EL]);

        observer.fire(EL, 1.0);
        assert_eq!(host.mutations(EL), before);
        assert!(!host.has_class(EL, VISIBLE_CLASS));
        assert!(!ctrl.is_revealed());
    }

    #[test]
    fn dispose_is_idempotent() {
        let (scope, _page) = scope();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            PatchBuffer::new(),
            &scope,
        );
        ctrl.dispose();
        ctrl.dispose();
        drop(ctrl);
        assert_eq!(observer.unobserved.borrow().len(), 1);
    }

    #[test]
    fn dispose_after_reveal_does_not_unobserve_again() {
        let (scope, _page) = scope();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            PatchBuffer::new(),
            &scope,
        );
        observer.fire(EL, 1.0);
        ctrl.dispose();
        assert_eq!(observer.unobserved.borrow().len(), 1);
        assert!(ctrl.is_revealed());
    }

    #[test]
    fn drop_disposes() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        drop(ctrl);
        assert_eq!(*observer.unobserved.borrow(), vec![EL]);
        let before = host.mutations(EL);
        observer.fire(EL, 1.0);
        assert_eq!(host.mutations(EL), before);
    }

    #[test]
    fn scope_disposal_silences_controller() {
        let (scope, page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        page.dispose();
        observer.fire(EL, 1.0);
        assert!(!ctrl.is_revealed());
        assert!(!host.has_class(EL, VISIBLE_CLASS));
    }

    #[test]
    fn missing_element_is_noop() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = MockObserver::default();
        let ctrl = ScrollRevealController::register(
            None,
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        assert!(host.is_empty());
        assert!(observer.observed.borrow().is_empty());
        assert!(ctrl.element().is_none());
        assert!(!ctrl.is_revealed());
        assert!(!ctrl.is_watching());
        ctrl.dispose();
        assert!(observer.unobserved.borrow().is_empty());
    }

    #[test]
    fn zero_threshold_reveals_on_edge_contact() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(EL, Rect::new(0.0, 600.0, 100.0, 100.0));
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default().threshold(0.0),
            observer.clone(),
            host.clone(),
            &scope,
        );
        observer.flush();
        assert!(ctrl.is_revealed());
    }

    #[test]
    fn geometry_observer_end_to_end() {
        let (scope, _page) = scope();
        let host = PatchBuffer::new();
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(EL, Rect::new(0.0, 1200.0, 200.0, 100.0));
        let ctrl = ScrollRevealController::register(
            Some(EL),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        observer.flush();
        assert!(!ctrl.is_revealed());

        // 5% visible: intersecting but below the 10% threshold.
        observer.scroll_to(0.0, 605.0);
        observer.flush();
        assert!(!ctrl.is_revealed());

        // 20% visible.
        observer.scroll_to(0.0, 620.0);
        observer.flush();
        assert!(ctrl.is_revealed());
        assert!(!observer.is_observing(EL));

        // Scrolling away never hides it again.
        observer.scroll_to(0.0, 0.0);
        observer.flush();
        assert!(host.has_class(EL, VISIBLE_CLASS));
    }

    #[test]
    fn options_from_config() {
        let config = AppConfig {
            reveal_threshold: 0.25,
            reveal_root_margin_px: 40.0,
            ..AppConfig::default()
        };
        let options = RevealOptions::from_config(&config);
        assert!((options.threshold - 0.25).abs() < f32::EPSILON);
        assert_eq!(options.root_margin, Margin::uniform(40.0));
        assert_eq!(options.effect, RevealEffect::FadeInUp);
    }

    #[test]
    fn threshold_builder_clamps() {
        assert_eq!(RevealOptions::default().threshold(2.0).threshold, 1.0);
        assert_eq!(RevealOptions::default().threshold(-1.0).threshold, 0.0);
    }

    #[cfg(feature = "tracing")]
    mod tracing_capture {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing::Subscriber;
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct MessageCapture {
            messages: Arc<Mutex<Vec<String>>>,
        }

        impl<S> Layer<S> for MessageCapture
        where
            S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
        {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                struct Msg {
                    message: Option<String>,
                }
                impl tracing::field::Visit for Msg {
                    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                        if field.name() == "message" {
                            self.message = Some(value.to_string());
                        }
                    }

                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.message =
                                Some(format!("{value:?}").trim_matches('"').to_string());
                        }
                    }
                }
                let mut msg = Msg { message: None };
                event.record(&mut msg);
                if let Some(message) = msg.message {
                    self.messages.lock().expect("capture lock").push(message);
                }
            }
        }

        #[test]
        fn reveal_emits_fire_event() {
            let messages = Arc::new(Mutex::new(Vec::new()));
            let subscriber = tracing_subscriber::registry().with(MessageCapture {
                messages: Arc::clone(&messages),
            });
            let _guard = tracing::subscriber::set_default(subscriber);

            let (scope, _page) = Lifetime::root();
            let observer = MockObserver::default();
            let _ctrl = ScrollRevealController::register(
                Some(EL),
                RevealOptions::default(),
                observer.clone(),
                PatchBuffer::new(),
                &scope,
            );
            observer.fire(EL, 1.0);

            let messages = messages.lock().expect("capture lock");
            assert!(
                messages.iter().any(|m| m == "reveal.fire"),
                "expected reveal.fire, got {messages:?}"
            );
        }
    }
}
