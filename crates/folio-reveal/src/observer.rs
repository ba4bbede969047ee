#![forbid(unsafe_code)]

//! Viewport visibility as an injected capability.
//!
//! [`ViewportObserver`] mirrors the browser's intersection primitive:
//! `observe` registers a sink that receives [`VisibilityEvent`]s whenever the
//! element's visible fraction crosses one of the requested thresholds, and
//! `unobserve` stops delivery.
//!
//! [`GeometryObserver`] is a host-fed implementation. The host reports the
//! viewport size, the scroll offset and element rectangles (document
//! coordinates); [`GeometryObserver::flush`] recomputes visibility and
//! delivers changes.
//!
//! # Invariants
//!
//! 1. Delivery is never synchronous inside `observe`; the first computation
//!    after `observe` (at the next `flush`) always produces an event.
//! 2. An event is delivered only when the crossed-threshold count or the
//!    intersecting flag changed since the last delivery for that element.
//! 3. Within one flush, events are delivered in document order (top, then
//!    left, then element id).
//! 4. Sinks may call `observe` / `unobserve` re-entrantly; an observation
//!    removed during a flush receives no further events from that flush.
//! 5. `ratio` is always within `[0, 1]`.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use folio_core::element::ElementId;
use folio_core::geometry::{Margin, Point, Rect, visibility};

/// Observation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Visible fractions at which an event fires; values are clamped to
    /// `[0, 1]`.
    pub thresholds: Vec<f32>,
    /// Margin applied around the viewport before intersecting.
    pub root_margin: Margin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![0.0],
            root_margin: Margin::ZERO,
        }
    }
}

impl ObserverOptions {
    #[must_use]
    pub fn threshold(threshold: f32) -> Self {
        Self {
            thresholds: vec![threshold],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn root_margin(mut self, margin: Margin) -> Self {
        self.root_margin = margin;
        self
    }

    /// Number of thresholds at or below `ratio`.
    fn crossed(&self, ratio: f64) -> usize {
        self.thresholds
            .iter()
            .filter(|t| ratio >= f64::from(t.clamp(0.0, 1.0)))
            .count()
    }
}

/// One visibility notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEvent {
    pub element: ElementId,
    /// Visible fraction of the element's area, within `[0, 1]`.
    pub ratio: f64,
    /// Whether the element touches or overlaps the (margin-adjusted) viewport.
    pub is_intersecting: bool,
}

/// Receiver for visibility notifications.
pub type VisibilitySink = Box<dyn FnMut(&VisibilityEvent)>;

/// Injected visibility capability.
pub trait ViewportObserver {
    /// Start delivering visibility events for `element` to `sink`.
    ///
    /// Observing an element that is already observed replaces the previous
    /// sink and options.
    fn observe(&self, element: ElementId, options: ObserverOptions, sink: VisibilitySink);

    /// Stop delivering events for `element`. Returns `true` if it was
    /// observed.
    fn unobserve(&self, element: ElementId) -> bool;
}

impl<O: ViewportObserver + ?Sized> ViewportObserver for Rc<O> {
    fn observe(&self, element: ElementId, options: ObserverOptions, sink: VisibilitySink) {
        (**self).observe(element, options, sink);
    }

    fn unobserve(&self, element: ElementId) -> bool {
        (**self).unobserve(element)
    }
}

// ---------------------------------------------------------------------------
// GeometryObserver
// ---------------------------------------------------------------------------

struct Observation {
    generation: u64,
    options: ObserverOptions,
    /// `None` only while the sink is running.
    sink: Option<VisibilitySink>,
    /// (crossed thresholds, intersecting) at the last delivery.
    last: Option<(usize, bool)>,
}

#[derive(Default)]
struct GeometryInner {
    viewport_size: (f64, f64),
    scroll: Point,
    rects: AHashMap<ElementId, Rect>,
    observations: AHashMap<ElementId, Observation>,
    next_generation: u64,
    delivered_total: u64,
}

impl GeometryInner {
    fn viewport(&self) -> Rect {
        Rect::new(
            self.scroll.x,
            self.scroll.y,
            self.viewport_size.0,
            self.viewport_size.1,
        )
    }
}

struct Pending {
    generation: u64,
    rect: Rect,
    event: VisibilityEvent,
}

/// Host-fed [`ViewportObserver`].
///
/// Cloning yields another handle to the same observer.
#[derive(Clone, Default)]
pub struct GeometryObserver {
    inner: Rc<RefCell<GeometryInner>>,
}

impl fmt::Debug for GeometryObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("GeometryObserver")
            .field("viewport", &inner.viewport())
            .field("elements", &inner.rects.len())
            .field("observed", &inner.observations.len())
            .finish()
    }
}

impl GeometryObserver {
    /// Create an observer with a `width` x `height` viewport at scroll 0.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let observer = Self::default();
        observer.resize(width, height);
        observer
    }

    /// Viewport rectangle in document coordinates.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.inner.borrow().viewport()
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.inner.borrow_mut().viewport_size = (width.max(0.0), height.max(0.0));
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        self.inner.borrow_mut().scroll = Point::new(x, y);
    }

    /// Report an element's layout rectangle in document coordinates.
    pub fn set_element_rect(&self, element: ElementId, rect: Rect) {
        self.inner.borrow_mut().rects.insert(element, rect);
    }

    /// Forget an element's layout; it stops producing events until a new
    /// rectangle is reported.
    pub fn remove_element_rect(&self, element: ElementId) {
        self.inner.borrow_mut().rects.remove(&element);
    }

    #[must_use]
    pub fn is_observing(&self, element: ElementId) -> bool {
        self.inner.borrow().observations.contains_key(&element)
    }

    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.inner.borrow().observations.len()
    }

    /// Total events delivered since creation.
    #[must_use]
    pub fn delivered_total(&self) -> u64 {
        self.inner.borrow().delivered_total
    }

    /// Recompute visibility for every observed element with a known layout
    /// and deliver the changes. Returns the number of events delivered.
    pub fn flush(&self) -> usize {
        let mut pending = self.collect_changes();
        pending.sort_by(|a, b| {
            a.rect
                .y
                .partial_cmp(&b.rect.y)
                .unwrap_or(Ordering::Equal)
                .then(a.rect.x.partial_cmp(&b.rect.x).unwrap_or(Ordering::Equal))
                .then(a.event.element.cmp(&b.event.element))
        });

        let mut delivered = 0;
        for item in pending {
            let element = item.event.element;
            let sink = {
                let mut inner = self.inner.borrow_mut();
                match inner.observations.get_mut(&element) {
                    Some(obs) if obs.generation == item.generation => obs.sink.take(),
                    _ => None,
                }
            };
            let Some(mut sink) = sink else {
                continue;
            };

            sink(&item.event);
            delivered += 1;

            let mut inner = self.inner.borrow_mut();
            inner.delivered_total += 1;
            if let Some(obs) = inner.observations.get_mut(&element)
                && obs.generation == item.generation
                && obs.sink.is_none()
            {
                obs.sink = Some(sink);
            }
        }
        delivered
    }

    fn collect_changes(&self) -> Vec<Pending> {
        let mut inner = self.inner.borrow_mut();
        let viewport = inner.viewport();
        let GeometryInner {
            rects,
            observations,
            ..
        } = &mut *inner;

        let mut pending = Vec::new();
        for (element, obs) in observations.iter_mut() {
            let Some(rect) = rects.get(element) else {
                continue;
            };
            let root = viewport.expand(obs.options.root_margin);
            let (ratio, is_intersecting) = visibility(rect, &root);
            let state = (obs.options.crossed(ratio), is_intersecting);
            if obs.last == Some(state) {
                continue;
            }
            obs.last = Some(state);
            pending.push(Pending {
                generation: obs.generation,
                rect: *rect,
                event: VisibilityEvent {
                    element: *element,
                    ratio,
                    is_intersecting,
                },
            });
        }
        pending
    }
}

impl ViewportObserver for GeometryObserver {
    fn observe(&self, element: ElementId, options: ObserverOptions, sink: VisibilitySink) {
        let mut inner = self.inner.borrow_mut();
        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.observations.insert(
            element,
            Observation {
                generation,
                options,
                sink: Some(sink),
                last: None,
            },
        );
    }

    fn unobserve(&self, element: ElementId) -> bool {
        self.inner
            .borrow_mut()
            .observations
            .remove(&element)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ElementId = ElementId(1);
    const B: ElementId = ElementId(2);

    fn capture() -> (Rc<RefCell<Vec<VisibilityEvent>>>, VisibilitySink) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink_log = log.clone();
        (log, Box::new(move |e| sink_log.borrow_mut().push(*e)))
    }

    #[test]
    fn observe_does_not_deliver_synchronously() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 0.0, 100.0, 100.0));
        let (log, sink) = capture();
        observer.observe(A, ObserverOptions::threshold(0.1), sink);
        assert!(log.borrow().is_empty());
        assert_eq!(observer.flush(), 1);
        assert_eq!(log.borrow()[0].ratio, 1.0);
    }

    #[test]
    fn first_flush_reports_offscreen_state() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 2000.0, 100.0, 100.0));
        let (log, sink) = capture();
        observer.observe(A, ObserverOptions::threshold(0.1), sink);
        observer.flush();
        let event = log.borrow()[0];
        assert_eq!(event.ratio, 0.0);
        assert!(!event.is_intersecting);
    }

    #[test]
    fn unchanged_state_is_not_redelivered() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 2000.0, 100.0, 100.0));
        let (log, sink) = capture();
        observer.observe(A, ObserverOptions::threshold(0.5), sink);
        observer.flush();
        observer.scroll_to(0.0, 10.0);
        assert_eq!(observer.flush(), 0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn scrolling_crosses_threshold() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 1000.0, 100.0, 100.0));
        let (log, sink) = capture();
        observer.observe(A, ObserverOptions::threshold(0.5), sink);
        observer.flush();

        // Bottom edge at 1020: 20% visible, below threshold but intersecting.
        observer.scroll_to(0.0, 420.0);
        observer.flush();
        // Bottom edge at 1060: 60% visible.
        observer.scroll_to(0.0, 460.0);
        observer.flush();

        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert!(log[1].is_intersecting);
        assert!((log[1].ratio - 0.2).abs() < 1e-9);
        assert!((log[2].ratio - 0.6).abs() < 1e-9);
    }

    #[test]
    fn root_margin_extends_viewport() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 650.0, 100.0, 100.0));
        let (log, sink) = capture();
        observer.observe(
            A,
            ObserverOptions::threshold(0.1).root_margin(Margin::uniform(100.0)),
            sink,
        );
        observer.flush();
        assert!((log.borrow()[0].ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_layout_produces_no_event() {
        let observer = GeometryObserver::new(800.0, 600.0);
        let (log, sink) = capture();
        observer.observe(A, ObserverOptions::default(), sink);
        assert_eq!(observer.flush(), 0);
        observer.set_element_rect(A, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(observer.flush(), 1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unobserve_stops_delivery() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 0.0, 10.0, 10.0));
        let (log, sink) = capture();
        observer.observe(A, ObserverOptions::default(), sink);
        assert!(observer.unobserve(A));
        assert!(!observer.unobserve(A));
        assert_eq!(observer.flush(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn sink_may_unobserve_itself() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 0.0, 10.0, 10.0));
        let handle = observer.clone();
        let calls = Rc::new(RefCell::new(0));
        let c = calls.clone();
        observer.observe(
            A,
            ObserverOptions::default(),
            Box::new(move |e| {
                *c.borrow_mut() += 1;
                handle.unobserve(e.element);
            }),
        );
        observer.flush();
        assert!(!observer.is_observing(A));
        observer.scroll_to(0.0, 5000.0);
        observer.flush();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn sink_unobserving_sibling_suppresses_its_event() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 0.0, 10.0, 10.0));
        observer.set_element_rect(B, Rect::new(0.0, 50.0, 10.0, 10.0));
        let handle = observer.clone();
        observer.observe(
            A,
            ObserverOptions::default(),
            Box::new(move |_| {
                handle.unobserve(B);
            }),
        );
        let (log_b, sink_b) = capture();
        observer.observe(B, ObserverOptions::default(), sink_b);
        assert_eq!(observer.flush(), 1);
        assert!(log_b.borrow().is_empty());
    }

    #[test]
    fn delivery_follows_document_order() {
        let observer = GeometryObserver::new(800.0, 600.0);
        // B sits above A even though A was observed first.
        observer.set_element_rect(A, Rect::new(0.0, 300.0, 10.0, 10.0));
        observer.set_element_rect(B, Rect::new(0.0, 100.0, 10.0, 10.0));
        let order = Rc::new(RefCell::new(Vec::new()));
        for el in [A, B] {
            let order = order.clone();
            observer.observe(
                el,
                ObserverOptions::default(),
                Box::new(move |e| order.borrow_mut().push(e.element)),
            );
        }
        observer.flush();
        assert_eq!(*order.borrow(), vec![B, A]);
    }

    #[test]
    fn reobserve_replaces_sink() {
        let observer = GeometryObserver::new(800.0, 600.0);
        observer.set_element_rect(A, Rect::new(0.0, 0.0, 10.0, 10.0));
        let (first, sink1) = capture();
        let (second, sink2) = capture();
        observer.observe(A, ObserverOptions::default(), sink1);
        observer.observe(A, ObserverOptions::default(), sink2);
        observer.flush();
        assert!(first.borrow().is_empty());
        assert_eq!(second.borrow().len(), 1);
        assert_eq!(observer.observed_count(), 1);
    }

    #[test]
    fn crossed_counts_thresholds() {
        let options = ObserverOptions {
            thresholds: vec![0.0, 0.5, 1.0],
            root_margin: Margin::ZERO,
        };
        assert_eq!(options.crossed(0.0), 1);
        assert_eq!(options.crossed(0.6), 2);
        assert_eq!(options.crossed(1.0), 3);
    }
}
