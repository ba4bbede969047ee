#![forbid(unsafe_code)]

//! Disposal scopes for controllers and their callbacks.
//!
//! A [`Lifetime`] is a cheap, cloneable read-only token that callbacks check
//! before touching their owner's state. The companion [`LifetimeHandle`] is
//! held by the owner and is the only way to end the lifetime.
//!
//! Lifetimes form a chain: disposing a parent disposes every child (checked
//! by walking the chain, so children created before or after the disposal
//! both observe it). A page-level scope can therefore silence every
//! controller at once.
//!
//! # Invariants
//!
//! 1. Disposal is monotonic: once `is_disposed()` is true it stays true.
//! 2. Disposal is explicit: dropping a `LifetimeHandle` does not dispose.
//! 3. Disposing twice is a no-op (the global counter is bumped once).

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::trace;

static NEXT_LIFETIME_ID: AtomicU64 = AtomicU64::new(1);

fn next_lifetime_id() -> u64 {
    NEXT_LIFETIME_ID.fetch_add(1, Ordering::Relaxed)
}

/// Total number of lifetimes disposed in this process.
static DISPOSALS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Read the total disposal count (for diagnostics).
#[must_use]
pub fn disposals_total() -> u64 {
    DISPOSALS_TOTAL.load(Ordering::Relaxed)
}

#[derive(Debug)]
struct LifetimeInner {
    id: u64,
    disposed: Cell<bool>,
    parent: Option<Rc<LifetimeInner>>,
}

impl LifetimeInner {
    fn is_disposed(&self) -> bool {
        if self.disposed.get() {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.is_disposed(),
            None => false,
        }
    }
}

/// Read-only disposal token.
#[derive(Clone, Debug)]
pub struct Lifetime {
    inner: Rc<LifetimeInner>,
}

impl Lifetime {
    /// Create a root lifetime with no parent.
    #[must_use]
    pub fn root() -> (Self, LifetimeHandle) {
        Self::new_inner(None)
    }

    /// Derive a child lifetime. Disposing `self` also disposes the child.
    #[must_use]
    pub fn child(&self) -> (Self, LifetimeHandle) {
        Self::new_inner(Some(self.inner.clone()))
    }

    fn new_inner(parent: Option<Rc<LifetimeInner>>) -> (Self, LifetimeHandle) {
        let inner = Rc::new(LifetimeInner {
            id: next_lifetime_id(),
            disposed: Cell::new(false),
            parent,
        });
        (
            Self {
                inner: inner.clone(),
            },
            LifetimeHandle { inner },
        )
    }

    /// Unique identifier (for logging).
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether this lifetime or any ancestor has been disposed.
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Whether this lifetime is still live.
    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.is_disposed()
    }
}

/// Owner-side handle that ends a [`Lifetime`].
#[derive(Debug)]
pub struct LifetimeHandle {
    inner: Rc<LifetimeInner>,
}

impl LifetimeHandle {
    /// Dispose the lifetime. Returns `true` on the first call only.
    pub fn dispose(&self) -> bool {
        let was_disposed = self.inner.disposed.replace(true);
        if !was_disposed {
            DISPOSALS_TOTAL.fetch_add(1, Ordering::Relaxed);
            trace!(lifetime_id = self.inner.id, "lifetime disposed");
        }
        !was_disposed
    }

    /// Whether this lifetime (or an ancestor) has been disposed.
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// A read-only token for this lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        Lifetime {
            inner: self.inner.clone(),
        }
    }
}
