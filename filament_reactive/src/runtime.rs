use crate::{
    node::{EffectId, EffectNode, EffectState, FxIndexSet, SignalId},
    EffectError, Trigger,
};
use slotmap::{SecondaryMap, SlotMap};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt::Debug,
    rc::Rc,
};

thread_local! {
    pub(crate) static RUNTIMES: RefCell<SlotMap<RuntimeId, Runtime>> = Default::default();
}

/// Observer-stack depth at which debug builds warn once about a suspected
/// notification cycle. Purely diagnostic: propagation order and semantics
/// are never altered.
const RECURSION_WARNING_DEPTH: usize = 1024;

/// Gets the selected runtime from the thread-local set of runtimes.
pub(crate) fn with_runtime<T>(
    id: RuntimeId,
    f: impl FnOnce(&Runtime) -> T,
) -> Result<T, ()> {
    RUNTIMES.with(|runtimes| {
        let runtimes = runtimes.borrow();
        match runtimes.get(id) {
            None => Err(()),
            Some(runtime) => Ok(f(runtime)),
        }
    })
}

/// Creates a new reactive runtime: the root object that owns every signal
/// and effect created against its id, including the observer stack that
/// attributes tracked reads to the effect currently running.
///
/// Runtimes are cheap, and several can coexist on one thread, but handles
/// are only valid against the runtime that created them.
#[must_use = "Runtime will leak memory if RuntimeId::dispose() is never called."]
pub fn create_runtime() -> RuntimeId {
    RUNTIMES.with(|runtimes| runtimes.borrow_mut().insert(Runtime::new()))
}

slotmap::new_key_type! {
    /// Unique ID assigned to a runtime.
    pub struct RuntimeId;
}

impl RuntimeId {
    /// Disposes of the runtime, dropping every signal and effect created in
    /// it. Handles still pointing into it become permanently invalid.
    pub fn dispose(self) {
        let runtime =
            RUNTIMES.with(move |runtimes| runtimes.borrow_mut().remove(self));
        drop(runtime);
    }

    /// Runs the given function with the observer stack emptied, so that any
    /// signal read inside it behaves like an untracked read even while an
    /// effect is executing.
    ///
    /// ```
    /// # use filament_reactive::*;
    /// # use std::{cell::Cell, rc::Rc};
    /// # let runtime = create_runtime();
    /// let (a, b) = (create_signal(runtime, 1), create_signal(runtime, 10));
    /// let sum = Rc::new(Cell::new(0));
    ///
    /// create_effect(runtime, {
    ///     let sum = sum.clone();
    ///     move || {
    ///         // `a` is tracked; `b` is read without subscribing
    ///         sum.set(a.get() + runtime.untrack(|| b.get()));
    ///         Ok(())
    ///     }
    /// })
    /// .unwrap();
    ///
    /// b.set(20).unwrap(); // not a dependency: the effect does not re-run
    /// assert_eq!(sum.get(), 11);
    /// a.set(2).unwrap();
    /// assert_eq!(sum.get(), 22);
    /// # runtime.dispose();
    /// ```
    pub fn untrack<T>(self, f: impl FnOnce() -> T) -> T {
        with_runtime(self, |runtime| runtime.untrack(f))
            .expect("tried to untrack in a runtime that has been disposed")
    }

    #[track_caller]
    pub(crate) fn create_concrete_signal(
        self,
        value: Rc<RefCell<dyn Any>>,
    ) -> SignalId {
        with_runtime(self, |runtime| {
            let id = runtime.signals.borrow_mut().insert(value);
            runtime
                .signal_subscribers
                .borrow_mut()
                .insert(id, Default::default());
            id
        })
        .expect("tried to create a signal in a runtime that has been disposed")
    }

    #[track_caller]
    pub(crate) fn create_trigger(self) -> Trigger {
        let id = self.create_concrete_signal(
            Rc::new(RefCell::new(())) as Rc<RefCell<dyn Any>>
        );
        Trigger {
            runtime: self,
            id,
            #[cfg(debug_assertions)]
            defined_at: std::panic::Location::caller(),
        }
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn create_concrete_effect(
        self,
        f: Box<dyn FnMut() -> Result<(), EffectError>>,
    ) -> Result<EffectId, EffectError> {
        with_runtime(self, |runtime| {
            let id = runtime.effects.borrow_mut().insert(Rc::new(EffectNode {
                f: RefCell::new(f),
                state: Cell::new(EffectState::Idle),
                pending_dispose: Cell::new(false),
            }));
            runtime
                .effect_sources
                .borrow_mut()
                .insert(id, Default::default());

            // eager first run: this is where the initial dependency set is
            // discovered. A failing first run leaves no subscriptions behind.
            match runtime.run_effect(id) {
                Ok(()) => Ok(id),
                Err(error) => {
                    runtime.dispose_effect(id);
                    Err(error)
                }
            }
        })
        .expect("tried to create an effect in a runtime that has been disposed")
    }
}

#[derive(Default)]
pub(crate) struct Runtime {
    /// Effects currently executing, innermost last. Tracked reads are
    /// attributed to the top of the stack; an empty stack means reads are
    /// untracked.
    pub observers: RefCell<Vec<EffectId>>,
    pub signals: RefCell<SlotMap<SignalId, Rc<RefCell<dyn Any>>>>,
    pub signal_subscribers:
        RefCell<SecondaryMap<SignalId, RefCell<FxIndexSet<EffectId>>>>,
    pub effects: RefCell<SlotMap<EffectId, Rc<EffectNode>>>,
    pub effect_sources:
        RefCell<SecondaryMap<EffectId, RefCell<FxIndexSet<SignalId>>>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the value slot for a signal. The slot is cloned out so that
    /// no borrow of the arena is held while the value itself is used.
    pub(crate) fn signal_value(&self, id: SignalId) -> Rc<RefCell<dyn Any>> {
        self.signals
            .borrow()
            .get(id)
            .cloned()
            .expect("tried to access a signal that is not in this runtime")
    }

    /// Records the bidirectional edge between a signal and the effect
    /// currently on top of the observer stack, if any. Re-reads are
    /// idempotent: a dependent keeps the position of its first registration.
    pub(crate) fn subscribe(&self, signal_id: SignalId) {
        let observer = { self.observers.borrow().last().copied() };
        if let Some(observer) = observer {
            if let Some(subscribers) =
                self.signal_subscribers.borrow().get(signal_id)
            {
                subscribers.borrow_mut().insert(observer);
            }
            if let Some(sources) = self.effect_sources.borrow().get(observer) {
                sources.borrow_mut().insert(signal_id);
            }
        }
    }

    /// Removes the effect from the subscriber set of every signal it read
    /// during its previous run, then clears its own source list. Called at
    /// the start of every run and during teardown: the dependency set is
    /// rebuilt from scratch each time the body executes, so a signal read
    /// only in earlier runs no longer notifies this effect.
    pub(crate) fn clear_sources(&self, effect_id: EffectId) {
        let sources = self.effect_sources.borrow();
        if let Some(sources) = sources.get(effect_id) {
            let subscribers = self.signal_subscribers.borrow();
            for source in sources.borrow().iter() {
                if let Some(source_subscribers) = subscribers.get(*source) {
                    // shift, not swap: the surviving subscribers keep their
                    // registration order
                    source_subscribers.borrow_mut().shift_remove(&effect_id);
                }
            }
            sources.borrow_mut().clear();
        }
    }

    /// Synchronously re-runs every subscriber of the signal, in registration
    /// order, collecting a failure for each dependent whose body returns
    /// `Err`. The subscriber list is snapshotted up front, so dependents
    /// added or removed while the pass is underway do not change it; a
    /// dependent disposed mid-pass is simply skipped when its turn comes.
    pub(crate) fn notify(
        &self,
        signal_id: SignalId,
    ) -> Vec<(EffectId, EffectError)> {
        let subscribers = {
            let subscribers = self.signal_subscribers.borrow();
            subscribers
                .get(signal_id)
                .map(|subscribers| {
                    subscribers.borrow().iter().copied().collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        let mut failures = Vec::new();
        for effect_id in subscribers {
            if let Err(error) = self.run_effect(effect_id) {
                failures.push((effect_id, error));
            }
        }
        failures
    }

    /// Executes an effect body under tracking. No-op if the effect is gone,
    /// already running (an effect that writes one of its own sources must
    /// not recurse into itself), or disposed.
    ///
    /// The stack pop and the reset to `Idle` are unconditional: the body's
    /// failure is a return value here, not an unwind, so the straight-line
    /// code after the call always runs. A disposal requested during the run
    /// is honored now, after the state reset.
    pub(crate) fn run_effect(
        &self,
        effect_id: EffectId,
    ) -> Result<(), EffectError> {
        let node = { self.effects.borrow().get(effect_id).cloned() };
        let Some(node) = node else {
            return Ok(());
        };
        match node.state.get() {
            EffectState::Running | EffectState::Disposed => return Ok(()),
            EffectState::Idle => {}
        }
        crate::macros::debug_warn!("running effect {effect_id:?}");

        let depth = {
            let mut observers = self.observers.borrow_mut();
            observers.push(effect_id);
            observers.len()
        };
        if depth == RECURSION_WARNING_DEPTH {
            crate::macros::debug_warn!(
                "observer stack has reached depth {depth}: effects that keep \
                 writing each other's sources recurse until the call stack \
                 overflows"
            );
        }
        node.state.set(EffectState::Running);
        self.clear_sources(effect_id);

        // the borrow of the body is held for exactly the duration of the run
        let result = {
            let mut f = node.f.borrow_mut();
            f()
        };

        node.state.set(EffectState::Idle);
        self.observers.borrow_mut().pop();
        if node.pending_dispose.get() {
            self.dispose_effect(effect_id);
        }
        result
    }

    /// Tears an effect down. Idempotent and infallible in every state:
    /// unknown ids and repeat calls are no-ops, and an effect that is
    /// currently running is only marked, with teardown deferred to the
    /// moment its run completes.
    pub(crate) fn dispose_effect(&self, effect_id: EffectId) {
        let node = { self.effects.borrow().get(effect_id).cloned() };
        let Some(node) = node else {
            return;
        };
        match node.state.get() {
            EffectState::Running => {
                crate::macros::debug_warn!(
                    "deferring disposal of running effect {effect_id:?}"
                );
                node.pending_dispose.set(true);
            }
            EffectState::Disposed => {}
            EffectState::Idle => {
                crate::macros::debug_warn!("disposing effect {effect_id:?}");
                self.clear_sources(effect_id);
                node.pending_dispose.set(false);
                node.state.set(EffectState::Disposed);
                self.effects.borrow_mut().remove(effect_id);
                self.effect_sources.borrow_mut().remove(effect_id);
            }
        }
    }

    pub(crate) fn untrack<T>(&self, f: impl FnOnce() -> T) -> T {
        let prev_stack = self.observers.replace(Vec::new());
        let untracked_result = f();
        self.observers.replace(prev_stack);
        untracked_result
    }
}

impl Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("observers", &self.observers)
            .field("signals", &self.signals.borrow().len())
            .field("effects", &self.effects.borrow().len())
            .finish()
    }
}
