use crate::EffectError;
use indexmap::IndexSet;
use rustc_hash::FxHasher;
use std::{
    cell::{Cell, RefCell},
    fmt::Debug,
    hash::BuildHasherDefault,
};

/// An [`IndexSet`] using the fast, non-cryptographic [`FxHasher`]: set
/// semantics plus stable insertion-order iteration. Subscriber sets rely on
/// the iteration order, so removals must go through `shift_remove`.
pub(crate) type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

slotmap::new_key_type! {
    /// Unique ID assigned to a signal.
    pub struct SignalId;
}

slotmap::new_key_type! {
    /// Unique ID assigned to an effect.
    pub struct EffectId;
}

/// Where an effect currently is in its life cycle.
///
/// `Disposed` is terminal: no transition leaves it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EffectState {
    /// Not currently executing. The only state in which teardown may proceed.
    Idle,
    /// Its body is on the call stack right now.
    Running,
    /// Torn down. This id will never run again.
    Disposed,
}

pub(crate) struct EffectNode {
    #[allow(clippy::type_complexity)]
    pub f: RefCell<Box<dyn FnMut() -> Result<(), EffectError>>>,
    pub state: Cell<EffectState>,
    /// Set when disposal is requested while the effect is `Running`; teardown
    /// then happens as that run completes.
    pub pending_dispose: Cell<bool>,
}

impl Debug for EffectNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectNode")
            .field("state", &self.state.get())
            .field("pending_dispose", &self.pending_dispose.get())
            .finish()
    }
}
