//! Property-based invariant tests for scroll reveal over the geometry
//! observer.
//!
//! 1. Revealed is monotonic: once an element is revealed it stays revealed
//!    for any later scroll sequence.
//! 2. Each element receives the visible class at most once.
//! 3. An element is revealed iff some scroll position in the sequence made it
//!    at least `threshold` visible.
//! 4. Revealed elements are no longer observed.
//! 5. After disposal no scroll sequence mutates the element.

use folio_core::cancel::Lifetime;
use folio_core::element::{ElementId, PatchBuffer, StylePatch};
use folio_core::geometry::{Rect, visibility};
use folio_reveal::{
    GeometryObserver, RevealOptions, ScrollRevealController, VISIBLE_CLASS,
};
use proptest::prelude::*;

const VIEW_W: f64 = 800.0;
const VIEW_H: f64 = 600.0;

// ── Helpers ─────────────────────────────────────────────────────────────

fn layout_strategy() -> impl Strategy<Value = Vec<Rect>> {
    proptest::collection::vec(
        (0.0f64..600.0, 0.0f64..4000.0, 1.0f64..400.0, 1.0f64..400.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h)),
        1..8,
    )
}

fn scrolls_strategy() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..4000.0, 0..20)
}

fn visible_class_adds(patches: &[StylePatch], element: ElementId) -> usize {
    patches
        .iter()
        .filter(|p| {
            matches!(p, StylePatch::AddClass { element: e, class } if *e == element && class == VISIBLE_CLASS)
        })
        .count()
}

// ═════════════════════════════════════════════════════════════════════════
// 1–4. Reveal semantics
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reveal_matches_geometry(
        rects in layout_strategy(),
        scrolls in scrolls_strategy(),
        threshold in 0.05f32..1.0,
    ) {
        let (scope, _page) = Lifetime::root();
        let host = PatchBuffer::new();
        let observer = GeometryObserver::new(VIEW_W, VIEW_H);
        let mut controllers = Vec::new();
        for (idx, rect) in rects.iter().enumerate() {
            let element = ElementId(idx as u32);
            observer.set_element_rect(element, *rect);
            controllers.push(ScrollRevealController::register(
                Some(element),
                RevealOptions::default().threshold(threshold),
                observer.clone(),
                host.clone(),
                &scope,
            ));
        }

        let mut positions = vec![0.0];
        positions.extend(scrolls.iter().copied());
        let mut seen = vec![false; rects.len()];
        let mut was_revealed = vec![false; rects.len()];

        for y in positions {
            observer.scroll_to(0.0, y);
            observer.flush();
            let viewport = Rect::new(0.0, y, VIEW_W, VIEW_H);
            for (idx, rect) in rects.iter().enumerate() {
                let (ratio, intersecting) = visibility(rect, &viewport);
                if intersecting && ratio >= f64::from(threshold) {
                    seen[idx] = true;
                }
                let revealed = controllers[idx].is_revealed();
                prop_assert!(!was_revealed[idx] || revealed, "element {} un-revealed", idx);
                was_revealed[idx] = revealed;
            }
        }

        let patches = host.take();
        for (idx, ctrl) in controllers.iter().enumerate() {
            let element = ElementId(idx as u32);
            prop_assert_eq!(ctrl.is_revealed(), seen[idx], "element {}", idx);
            prop_assert!(visible_class_adds(&patches, element) <= 1);
            if ctrl.is_revealed() {
                prop_assert!(!observer.is_observing(element));
                prop_assert!(!ctrl.is_watching());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Disposal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn disposed_controller_never_mutates(
        rect in (0.0f64..600.0, 600.0f64..4000.0, 10.0f64..400.0, 10.0f64..400.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h)),
        scrolls in scrolls_strategy(),
    ) {
        let (scope, _page) = Lifetime::root();
        let host = PatchBuffer::new();
        let observer = GeometryObserver::new(VIEW_W, VIEW_H);
        let element = ElementId(1);
        observer.set_element_rect(element, rect);
        let ctrl = ScrollRevealController::register(
            Some(element),
            RevealOptions::default(),
            observer.clone(),
            host.clone(),
            &scope,
        );
        let before = host.mutations(element);
        ctrl.dispose();

        for y in scrolls {
            observer.scroll_to(0.0, y);
            observer.flush();
        }
        prop_assert_eq!(host.mutations(element), before);
        prop_assert!(!ctrl.is_revealed());
        prop_assert_eq!(observer.observed_count(), 0);
    }
}
