use crate::{
    node::SignalId,
    runtime::{with_runtime, RuntimeId},
    BroadcastError,
};

/// Reactive trigger: a data-less signal that notifies dependent effects to
/// re-run.
///
/// See [`create_trigger`] for more.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub(crate) runtime: RuntimeId,
    pub(crate) id: SignalId,

    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl Trigger {
    /// Subscribes the running effect to this trigger. Outside of any effect
    /// this does nothing.
    #[cfg_attr(
        debug_assertions,
        instrument(
            level = "trace",
            name = "Trigger::track()",
            skip_all,
            fields(id = ?self.id, defined_at = %self.defined_at)
        )
    )]
    pub fn track(&self) {
        with_runtime(self.runtime, |runtime| {
            runtime.subscribe(self.id);
        })
        .expect("tried to track a trigger in a runtime that has been disposed")
    }

    /// Re-runs every effect currently tracking this trigger, in the order
    /// they first tracked it. Unlike a signal write there is no value and no
    /// equality gate: notification is unconditional. Failures aggregate the
    /// same way they do for [`Signal::set`](crate::Signal::set).
    #[cfg_attr(
        debug_assertions,
        instrument(
            level = "trace",
            name = "Trigger::notify()",
            skip_all,
            fields(id = ?self.id, defined_at = %self.defined_at)
        )
    )]
    pub fn notify(&self) -> Result<(), BroadcastError> {
        let failures =
            with_runtime(self.runtime, |runtime| runtime.notify(self.id))
                .expect(
                    "tried to notify a trigger in a runtime that has been \
                     disposed",
                );
        BroadcastError::from_failed_runs(self.runtime, failures)
    }
}

/// Creates a [`Trigger`], a kind of reactive primitive.
///
/// A trigger is a data-less signal with the sole purpose of notifying other
/// reactive code of a change. This can be useful for when using external
/// data not stored in signals, for example.
///
/// ```
/// # use filament_reactive::*;
/// use std::{cell::RefCell, fmt::Write, rc::Rc};
///
/// let runtime = create_runtime();
///
/// let external_data = Rc::new(RefCell::new(1));
/// let output = Rc::new(RefCell::new(String::new()));
///
/// let rerun_on_data = create_trigger(runtime);
///
/// let o = output.clone();
/// let e = external_data.clone();
/// create_effect(runtime, move || {
///     rerun_on_data.track();
///     write!(o.borrow_mut(), "{}", *e.borrow())?;
///     *e.borrow_mut() += 1;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(*output.borrow(), "1");
///
/// rerun_on_data.notify().unwrap(); // reruns the above effect
///
/// assert_eq!(*output.borrow(), "12");
///
/// runtime.dispose();
/// ```
#[cfg_attr(
    debug_assertions,
    instrument(level = "trace", skip_all, fields(runtime = ?runtime))
)]
#[track_caller]
pub fn create_trigger(runtime: RuntimeId) -> Trigger {
    runtime.create_trigger()
}
