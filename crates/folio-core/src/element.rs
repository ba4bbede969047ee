#![forbid(unsafe_code)]

//! Element handles and the visual-state capability.
//!
//! Controllers never touch a rendering tree directly. They describe visual
//! changes through [`ElementHost`]; the host (a browser bridge, or a test)
//! decides how to apply them. [`PatchBuffer`] is the standard host: it
//! records every change as a [`StylePatch`] for the browser side to replay
//! and keeps a per-element snapshot that tests can query.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

/// Apply visual state to host elements.
///
/// Implementations must tolerate unknown elements (ignore them) and must not
/// call back into the controller that issued the change.
pub trait ElementHost {
    fn add_class(&self, element: ElementId, class: &str);
    fn remove_class(&self, element: ElementId, class: &str);
    fn set_style(&self, element: ElementId, property: &str, value: &str);
    fn set_text(&self, element: ElementId, text: &str);
}

impl<H: ElementHost + ?Sized> ElementHost for Rc<H> {
    fn add_class(&self, element: ElementId, class: &str) {
        (**self).add_class(element, class);
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        (**self).remove_class(element, class);
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        (**self).set_style(element, property, value);
    }

    fn set_text(&self, element: ElementId, text: &str) {
        (**self).set_text(element, text);
    }
}

/// One recorded visual change.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum StylePatch {
    AddClass {
        element: ElementId,
        class: String,
    },
    RemoveClass {
        element: ElementId,
        class: String,
    },
    SetStyle {
        element: ElementId,
        property: String,
        value: String,
    },
    SetText {
        element: ElementId,
        text: String,
    },
}

impl StylePatch {
    /// The element this patch targets.
    #[must_use]
    pub fn element(&self) -> ElementId {
        match self {
            Self::AddClass { element, .. }
            | Self::RemoveClass { element, .. }
            | Self::SetStyle { element, .. }
            | Self::SetText { element, .. } => *element,
        }
    }
}

/// Current visual state of one element, as seen through a [`PatchBuffer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Classes in the order they were first added.
    pub classes: Vec<String>,
    pub styles: AHashMap<String, String>,
    pub text: Option<String>,
    /// Number of patches ever applied to this element.
    pub mutations: u64,
}

#[derive(Debug, Default)]
struct PatchInner {
    log: Vec<StylePatch>,
    elements: AHashMap<ElementId, ElementSnapshot>,
}

impl PatchInner {
    fn apply(&mut self, patch: StylePatch) {
        let snapshot = self.elements.entry(patch.element()).or_default();
        snapshot.mutations += 1;
        match &patch {
            StylePatch::AddClass { class, .. } => {
                if !snapshot.classes.iter().any(|c| c == class) {
                    snapshot.classes.push(class.clone());
                }
            }
            StylePatch::RemoveClass { class, .. } => {
                snapshot.classes.retain(|c| c != class);
            }
            StylePatch::SetStyle {
                property, value, ..
            } => {
                snapshot.styles.insert(property.clone(), value.clone());
            }
            StylePatch::SetText { text, .. } => {
                snapshot.text = Some(text.clone());
            }
        }
        self.log.push(patch);
    }
}

/// Recording [`ElementHost`].
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct PatchBuffer {
    inner: Rc<RefCell<PatchInner>>,
}

impl PatchBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the patches recorded since the last call.
    pub fn take(&self) -> Vec<StylePatch> {
        std::mem::take(&mut self.inner.borrow_mut().log)
    }

    /// Number of patches waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().log.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().log.is_empty()
    }

    /// Snapshot of one element's visual state.
    #[must_use]
    pub fn snapshot(&self, element: ElementId) -> Option<ElementSnapshot> {
        self.inner.borrow().elements.get(&element).cloned()
    }

    #[must_use]
    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.inner
            .borrow()
            .elements
            .get(&element)
            .is_some_and(|s| s.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.inner
            .borrow()
            .elements
            .get(&element)
            .and_then(|s| s.styles.get(property).cloned())
    }

    #[must_use]
    pub fn text(&self, element: ElementId) -> Option<String> {
        self.inner
            .borrow()
            .elements
            .get(&element)
            .and_then(|s| s.text.clone())
    }

    /// Total patches ever applied to `element` (drained or not).
    #[must_use]
    pub fn mutations(&self, element: ElementId) -> u64 {
        self.inner
            .borrow()
            .elements
            .get(&element)
            .map_or(0, |s| s.mutations)
    }

    /// Forget an element's snapshot (after the host removed it).
    pub fn forget(&self, element: ElementId) {
        self.inner.borrow_mut().elements.remove(&element);
    }

    fn push(&self, patch: StylePatch) {
        self.inner.borrow_mut().apply(patch);
    }
}

impl ElementHost for PatchBuffer {
    fn add_class(&self, element: ElementId, class: &str) {
        self.push(StylePatch::AddClass {
            element,
            class: class.to_string(),
        });
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        self.push(StylePatch::RemoveClass {
            element,
            class: class.to_string(),
        });
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        self.push(StylePatch::SetStyle {
            element,
            property: property.to_string(),
            value: value.to_string(),
        });
    }

    fn set_text(&self, element: ElementId, text: &str) {
        self.push(StylePatch::SetText {
            element,
            text: text.to_string(),
        });
    }
}
