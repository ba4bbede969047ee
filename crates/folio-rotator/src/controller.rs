#![forbid(unsafe_code)]

//! Timer-driven rotator.
//!
//! The controller owns a [`TypingMachine`] and keeps exactly one tick
//! scheduled on the injected [`Scheduler`] while it is alive. Each tick
//! advances the machine (resolving `AdvancingPhrase` immediately), forwards
//! changed text to the optional [`TextSink`], and schedules the next tick.
//!
//! # Invariants
//!
//! 1. At most one timer is pending per controller.
//! 2. After `dispose` the pending timer is cancelled and no tick runs, even
//!    if the scheduler fires a stale task.
//! 3. Construction with an empty phrase list fails before anything is
//!    scheduled.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use folio_core::AppConfig;
use folio_core::cancel::{Lifetime, LifetimeHandle};
use folio_core::error::Result;
use folio_core::timer::{Scheduler, TimerId};
use folio_core::trace;

use crate::machine::{Phase, TypingMachine};

/// Receiver for the visible rotator text.
pub type TextSink = Box<dyn FnMut(&str)>;

struct RotatorInner {
    machine: TypingMachine,
    pending: Option<TimerId>,
    /// `None` while the sink is running.
    sink: Option<TextSink>,
    ticks: u64,
}

/// Perpetual typing/deleting rotator.
///
/// Dropping the controller disposes it.
pub struct TextRotatorController<S>
where
    S: Scheduler + Clone + 'static,
{
    inner: Rc<RefCell<RotatorInner>>,
    scheduler: S,
    lifetime: LifetimeHandle,
}

impl<S> fmt::Debug for TextRotatorController<S>
where
    S: Scheduler + Clone + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TextRotatorController")
            .field("text", &inner.machine.current_text())
            .field("phrase_index", &inner.machine.phrase_index())
            .field("phase", &inner.machine.phase())
            .field("pending", &inner.pending)
            .field("disposed", &self.lifetime.is_disposed())
            .finish()
    }
}

impl<S> TextRotatorController<S>
where
    S: Scheduler + Clone + 'static,
{
    /// Start rotating: the first tick is scheduled immediately.
    pub fn new(machine: TypingMachine, scheduler: S, scope: &Lifetime) -> Self {
        let (lifetime, handle) = scope.child();
        let inner = Rc::new(RefCell::new(RotatorInner {
            machine,
            pending: None,
            sink: None,
            ticks: 0,
        }));
        arm(&inner, &scheduler, &lifetime);
        Self {
            inner,
            scheduler,
            lifetime: handle,
        }
    }

    /// Rotator over the configured phrases and speeds.
    ///
    /// # Errors
    ///
    /// Fails with `EmptyPhraseSequence` (and schedules nothing) when the
    /// phrase list is empty.
    pub fn from_config(config: &AppConfig, scheduler: S, scope: &Lifetime) -> Result<Self> {
        let machine = TypingMachine::from_config(config)?;
        Ok(Self::new(machine, scheduler, scope))
    }

    /// Install the text receiver and push the current text to it.
    pub fn set_text_sink(&self, mut sink: TextSink) {
        if self.lifetime.is_disposed() {
            return;
        }
        let text = self.inner.borrow().machine.current_text().to_string();
        sink(&text);
        self.inner.borrow_mut().sink = Some(sink);
    }

    #[must_use]
    pub fn current_text(&self) -> String {
        self.inner.borrow().machine.current_text().to_string()
    }

    #[must_use]
    pub fn phrase_index(&self) -> usize {
        self.inner.borrow().machine.phrase_index()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.borrow().machine.phase()
    }

    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.inner.borrow().machine.is_deleting()
    }

    /// The currently scheduled tick, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.inner.borrow().pending
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.inner.borrow().ticks
    }

    /// A copy of the machine state.
    #[must_use]
    pub fn snapshot(&self) -> TypingMachine {
        self.inner.borrow().machine.clone()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_disposed()
    }

    /// Cancel the pending tick and stop rotating. Idempotent.
    pub fn dispose(&self) {
        if !self.lifetime.dispose() {
            return;
        }
        let pending = {
            let mut inner = self.inner.borrow_mut();
            inner.sink = None;
            inner.pending.take()
        };
        if let Some(id) = pending {
            self.scheduler.cancel(id);
        }
        trace!(message = "rotator.dispose", cancelled = pending.is_some());
    }
}

impl<S> Drop for TextRotatorController<S>
where
    S: Scheduler + Clone + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

fn arm<S>(inner: &Rc<RefCell<RotatorInner>>, scheduler: &S, lifetime: &Lifetime)
where
    S: Scheduler + Clone + 'static,
{
    let delay = inner.borrow().machine.next_delay();
    let weak = Rc::downgrade(inner);
    let task_scheduler = scheduler.clone();
    let task_lifetime = lifetime.clone();
    let id = scheduler.schedule(
        delay,
        Box::new(move || on_tick(&weak, &task_scheduler, &task_lifetime)),
    );
    inner.borrow_mut().pending = Some(id);
}

fn on_tick<S>(weak: &Weak<RefCell<RotatorInner>>, scheduler: &S, lifetime: &Lifetime)
where
    S: Scheduler + Clone + 'static,
{
    if lifetime.is_disposed() {
        return;
    }
    let Some(inner) = weak.upgrade() else {
        return;
    };

    let (text, sink) = {
        let mut state = inner.borrow_mut();
        state.pending = None;
        state.ticks += 1;
        let changed = state.machine.tick_settled();
        trace!(
            message = "rotator.tick",
            phrase_index = state.machine.phrase_index(),
            typed = state.machine.typed_len(),
            phase = ?state.machine.phase()
        );
        let text = state.machine.current_text().to_string();
        let sink = if changed { state.sink.take() } else { None };
        (text, sink)
    };

    if let Some(mut sink) = sink {
        sink(&text);
        let mut state = inner.borrow_mut();
        if state.sink.is_none() && !lifetime.is_disposed() {
            state.sink = Some(sink);
        }
    }

    if !lifetime.is_disposed() {
        arm(&inner, scheduler, lifetime);
    }
}
