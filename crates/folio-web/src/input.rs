#![forbid(unsafe_code)]

//! Host input events, encoded as JSON objects tagged by `kind`.
//!
//! ```json
//! {"kind":"scroll","x":0,"y":120}
//! {"kind":"layout","element":4,"rect":{"x":0,"y":900,"width":320,"height":200}}
//! {"kind":"pointer_down"}
//! ```

use folio_core::element::ElementId;
use folio_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One decoded host input.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostInput {
    /// Viewport size changed.
    Resize { width: f64, height: f64 },
    /// Document scroll offset changed.
    Scroll { x: f64, y: f64 },
    /// An element's document-space rectangle changed.
    Layout { element: ElementId, rect: Rect },
    /// An element left the layout.
    RemoveLayout { element: ElementId },
    PointerMove { x: f64, y: f64 },
    /// Mouse down or click (both trigger the ripple).
    PointerDown,
    /// Pointer entered (`true`) or left (`false`) an interactive element.
    Hover { hovering: bool },
    /// An element was removed from the page.
    Unmount { element: ElementId },
}

impl HostInput {
    /// Decode one JSON-encoded input.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Json`](crate::error::InputError::Json) for
    /// malformed JSON or an unknown `kind`.
    pub fn decode(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Stable short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::Scroll { .. } => "scroll",
            Self::Layout { .. } => "layout",
            Self::RemoveLayout { .. } => "remove_layout",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerDown => "pointer_down",
            Self::Hover { .. } => "hover",
            Self::Unmount { .. } => "unmount",
        }
    }
}
