#![forbid(unsafe_code)]

//! Delayed fade-in for the hero image.
//!
//! Mounting adds [`FADE_IMAGE_CLASS`]; once the delay elapses the
//! [`LOADED_CLASS`] is added and the stylesheet fades the image in.
//! Disposing before the delay cancels the timer.

use std::cell::Cell;
use std::rc::Rc;

use folio_core::cancel::{Lifetime, LifetimeHandle};
use folio_core::element::{ElementHost, ElementId};
use folio_core::timer::{Scheduler, TimerId};
use folio_core::trace;
use web_time::Duration;

pub const FADE_IMAGE_CLASS: &str = "fade-in-image";
pub const LOADED_CLASS: &str = "loaded";

/// One-shot delayed fade for an image element.
pub struct ImageFade<S>
where
    S: Scheduler + Clone + 'static,
{
    element: ElementId,
    scheduler: S,
    pending: Rc<Cell<Option<TimerId>>>,
    loaded: Rc<Cell<bool>>,
    lifetime: LifetimeHandle,
}

impl<S> std::fmt::Debug for ImageFade<S>
where
    S: Scheduler + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFade")
            .field("element", &self.element)
            .field("pending", &self.pending.get())
            .field("loaded", &self.loaded.get())
            .finish()
    }
}

impl<S> ImageFade<S>
where
    S: Scheduler + Clone + 'static,
{
    pub fn mount<H>(
        element: ElementId,
        delay: Duration,
        scheduler: S,
        host: H,
        scope: &Lifetime,
    ) -> Self
    where
        H: ElementHost + 'static,
    {
        let (lifetime, handle) = scope.child();
        host.add_class(element, FADE_IMAGE_CLASS);

        let pending = Rc::new(Cell::new(None));
        let loaded = Rc::new(Cell::new(false));
        let id = {
            let pending = Rc::clone(&pending);
            let loaded = Rc::clone(&loaded);
            scheduler.schedule(
                delay,
                Box::new(move || {
                    pending.set(None);
                    if lifetime.is_disposed() {
                        return;
                    }
                    loaded.set(true);
                    host.add_class(element, LOADED_CLASS);
                    trace!(message = "image.loaded", element = element.0);
                }),
            )
        };
        pending.set(Some(id));

        Self {
            element,
            scheduler,
            pending,
            loaded,
            lifetime: handle,
        }
    }

    #[must_use]
    pub fn element(&self) -> ElementId {
        self.element
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Cancel the fade if it has not happened yet. Idempotent.
    pub fn dispose(&self) {
        if !self.lifetime.dispose() {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl<S> Drop for ImageFade<S>
where
    S: Scheduler + Clone + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}
