use crate::{
    node::EffectId,
    runtime::{with_runtime, RuntimeId},
    EffectError,
};

/// Creates an effect: a computation that runs once immediately, tracking
/// which signals its body reads, and re-runs whenever any of them changes.
///
/// The dependency set is rebuilt on every run, so a body with conditional
/// reads only subscribes to the signals it read last time. If the initial
/// run returns `Err`, the effect is torn down on the spot, ends up
/// subscribed to nothing, and the error is handed back to the caller.
///
/// The returned [`Effect`] handle stops the effect when
/// [`dispose`](Effect::dispose)d; an effect that is never disposed keeps
/// running until its runtime is.
///
/// ```
/// # use filament_reactive::*;
/// # use std::{cell::RefCell, rc::Rc};
/// # let runtime = create_runtime();
/// let name = create_signal(runtime, "world".to_string());
/// let greetings = Rc::new(RefCell::new(Vec::new()));
///
/// let effect = create_effect(runtime, {
///     let greetings = greetings.clone();
///     move || {
///         greetings.borrow_mut().push(format!("hello, {}", name.get()));
///         Ok(())
///     }
/// })
/// .unwrap();
///
/// name.set("filament".to_string()).unwrap();
/// assert_eq!(
///     *greetings.borrow(),
///     ["hello, world", "hello, filament"]
/// );
///
/// effect.dispose();
/// name.set("nobody".to_string()).unwrap(); // no longer observed
/// assert_eq!(greetings.borrow().len(), 2);
/// # runtime.dispose();
/// ```
#[cfg_attr(
    debug_assertions,
    instrument(level = "trace", skip_all, fields(runtime = ?runtime))
)]
#[track_caller]
pub fn create_effect(
    runtime: RuntimeId,
    f: impl FnMut() -> Result<(), EffectError> + 'static,
) -> Result<Effect, EffectError> {
    let id = runtime.create_concrete_effect(Box::new(f))?;
    Ok(Effect { runtime, id })
}

/// Handle to a running effect, returned by [`create_effect`] and carried in
/// [`BroadcastError`](crate::BroadcastError) failure pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Effect {
    pub(crate) runtime: RuntimeId,
    pub(crate) id: EffectId,
}

impl Effect {
    /// Stops the effect and removes it from the subscriber set of every
    /// signal it reads.
    ///
    /// Idempotent and infallible: repeat calls, calls after the runtime is
    /// gone, and calls from inside any effect body (including this effect's
    /// own) are all safe. If the effect is running right now, its body is
    /// allowed to complete and teardown happens as the run finishes.
    pub fn dispose(&self) {
        _ = with_runtime(self.runtime, |runtime| {
            runtime.dispose_effect(self.id)
        });
    }
}
