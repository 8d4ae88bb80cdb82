use crate::{
    node::SignalId,
    runtime::{with_runtime, RuntimeId},
    BroadcastError,
};
use std::{
    any::Any, cell::RefCell, fmt::Debug, hash::Hash, marker::PhantomData,
    rc::Rc,
};

/// Creates a reactive signal: an observable value that remembers, in
/// registration order, every effect that has read it, and re-runs them
/// synchronously when it changes.
///
/// The value is owned by the runtime; the returned [`Signal`] is a cheap
/// `Copy` handle.
///
/// ```
/// # use filament_reactive::*;
/// # let runtime = create_runtime();
/// let count = create_signal(runtime, 0);
///
/// assert_eq!(count.get(), 0);
/// count.set(1).unwrap();
/// assert_eq!(count.get(), 1);
/// # runtime.dispose();
/// ```
#[cfg_attr(
    debug_assertions,
    instrument(level = "trace", skip_all, fields(runtime = ?runtime))
)]
#[track_caller]
pub fn create_signal<T>(runtime: RuntimeId, value: T) -> Signal<T>
where
    T: Any + 'static,
{
    let id = runtime.create_concrete_signal(
        Rc::new(RefCell::new(value)) as Rc<RefCell<dyn Any>>
    );
    Signal {
        runtime,
        id,
        ty: PhantomData,
        #[cfg(debug_assertions)]
        defined_at: std::panic::Location::caller(),
    }
}

/// An observable value with an ordered set of dependent effects.
///
/// Reading it through [`get`](Signal::get) or [`with`](Signal::with) from
/// inside a running effect subscribes that effect; writing it through
/// [`set`](Signal::set) re-runs the subscribers. The
/// [`get_untracked`](Signal::get_untracked) and
/// [`with_untracked`](Signal::with_untracked) variants read the current
/// value without ever subscribing anything.
///
/// Signals live as long as their runtime: they are not disposed
/// individually.
pub struct Signal<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: SignalId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> Signal<T>
where
    T: 'static,
{
    /// Clones and returns the current value, subscribing the running effect
    /// (if any) to future changes.
    #[track_caller]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Applies a function to the current value without cloning it out,
    /// subscribing the running effect (if any) to future changes.
    ///
    /// The value is borrowed for the duration of the call, so `f` must not
    /// write this same signal.
    #[track_caller]
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        with_runtime(self.runtime, |runtime| {
            runtime.subscribe(self.id);
            let value = runtime.signal_value(self.id);
            let value = value.borrow();
            let value = value
                .downcast_ref::<T>()
                .expect("to downcast signal value to its original type");
            f(value)
        })
        .expect("tried to access a signal in a runtime that has been disposed")
    }

    /// Clones and returns the current value without registering a dependency
    /// on it, even inside a running effect.
    #[track_caller]
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(T::clone)
    }

    /// Applies a function to the current value without registering a
    /// dependency on it.
    #[track_caller]
    pub fn with_untracked<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        with_runtime(self.runtime, |runtime| {
            let value = runtime.signal_value(self.id);
            let value = value.borrow();
            let value = value
                .downcast_ref::<T>()
                .expect("to downcast signal value to its original type");
            f(value)
        })
        .expect("tried to access a signal in a runtime that has been disposed")
    }

    /// Replaces the current value and synchronously re-runs every dependent
    /// effect, in the order each first read this signal.
    ///
    /// Writing a value equal to the present one is a no-op: nothing is
    /// stored and nothing is notified. Otherwise each failing dependent is
    /// collected while the rest keep running, and the failures come back as
    /// one [`BroadcastError`] after all of them have been attempted.
    /// Notification is fully synchronous: by the time `set` returns, every
    /// dependent (and anything their own writes triggered) has run.
    #[cfg_attr(
        debug_assertions,
        instrument(
            level = "trace",
            name = "Signal::set()",
            skip_all,
            fields(id = ?self.id, defined_at = %self.defined_at)
        )
    )]
    #[track_caller]
    pub fn set(&self, new_value: T) -> Result<(), BroadcastError>
    where
        T: PartialEq,
    {
        let failures = with_runtime(self.runtime, |runtime| {
            let value = runtime.signal_value(self.id);
            {
                let mut value = value.borrow_mut();
                let value = value
                    .downcast_mut::<T>()
                    .expect("to downcast signal value to its original type");
                if *value == new_value {
                    return Vec::new();
                }
                *value = new_value;
            }
            // the value borrow is released before anything re-runs
            runtime.notify(self.id)
        })
        .expect("tried to set a signal in a runtime that has been disposed");

        BroadcastError::from_failed_runs(self.runtime, failures)
    }

    /// Replaces the current value without comparing it to the old one and
    /// without notifying any dependent.
    #[track_caller]
    pub fn set_untracked(&self, new_value: T) {
        with_runtime(self.runtime, |runtime| {
            let value = runtime.signal_value(self.id);
            let mut value = value.borrow_mut();
            let slot = value
                .downcast_mut::<T>()
                .expect("to downcast signal value to its original type");
            *slot = new_value;
        })
        .expect("tried to set a signal in a runtime that has been disposed")
    }

    /// Splits the signal into read-only and write-only handles sharing the
    /// same underlying value.
    pub fn split(&self) -> (ReadSignal<T>, WriteSignal<T>) {
        (self.read_only(), self.write_only())
    }

    /// Returns a read-only handle to the same underlying value.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            runtime: self.runtime,
            id: self.id,
            ty: PhantomData,
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
        }
    }

    /// Returns a write-only handle to the same underlying value.
    pub fn write_only(&self) -> WriteSignal<T> {
        WriteSignal {
            runtime: self.runtime,
            id: self.id,
            ty: PhantomData,
            #[cfg(debug_assertions)]
            defined_at: self.defined_at,
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Signal");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for Signal<T> {}

impl<T> Hash for Signal<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.runtime.hash(state);
        self.id.hash(state);
    }
}

/// The reading half of a signal. See [`Signal::split`].
pub struct ReadSignal<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: SignalId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> ReadSignal<T>
where
    T: 'static,
{
    /// Clones and returns the current value, subscribing the running effect
    /// (if any) to future changes.
    #[track_caller]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Applies a function to the current value without cloning it out,
    /// subscribing the running effect (if any) to future changes.
    #[track_caller]
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        with_runtime(self.runtime, |runtime| {
            runtime.subscribe(self.id);
            let value = runtime.signal_value(self.id);
            let value = value.borrow();
            let value = value
                .downcast_ref::<T>()
                .expect("to downcast signal value to its original type");
            f(value)
        })
        .expect("tried to access a signal in a runtime that has been disposed")
    }

    /// Clones and returns the current value without registering a dependency
    /// on it.
    #[track_caller]
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(T::clone)
    }

    /// Applies a function to the current value without registering a
    /// dependency on it.
    #[track_caller]
    pub fn with_untracked<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        with_runtime(self.runtime, |runtime| {
            let value = runtime.signal_value(self.id);
            let value = value.borrow();
            let value = value
                .downcast_ref::<T>()
                .expect("to downcast signal value to its original type");
            f(value)
        })
        .expect("tried to access a signal in a runtime that has been disposed")
    }
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadSignal<T> {}

impl<T> Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ReadSignal");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for ReadSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for ReadSignal<T> {}

impl<T> Hash for ReadSignal<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.runtime.hash(state);
        self.id.hash(state);
    }
}

/// The writing half of a signal. See [`Signal::split`].
pub struct WriteSignal<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: SignalId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> WriteSignal<T>
where
    T: 'static,
{
    /// Replaces the current value and synchronously re-runs every dependent
    /// effect, exactly as [`Signal::set`] does.
    #[cfg_attr(
        debug_assertions,
        instrument(
            level = "trace",
            name = "WriteSignal::set()",
            skip_all,
            fields(id = ?self.id, defined_at = %self.defined_at)
        )
    )]
    #[track_caller]
    pub fn set(&self, new_value: T) -> Result<(), BroadcastError>
    where
        T: PartialEq,
    {
        let failures = with_runtime(self.runtime, |runtime| {
            let value = runtime.signal_value(self.id);
            {
                let mut value = value.borrow_mut();
                let value = value
                    .downcast_mut::<T>()
                    .expect("to downcast signal value to its original type");
                if *value == new_value {
                    return Vec::new();
                }
                *value = new_value;
            }
            runtime.notify(self.id)
        })
        .expect("tried to set a signal in a runtime that has been disposed");

        BroadcastError::from_failed_runs(self.runtime, failures)
    }

    /// Replaces the current value without comparing it to the old one and
    /// without notifying any dependent.
    #[track_caller]
    pub fn set_untracked(&self, new_value: T) {
        with_runtime(self.runtime, |runtime| {
            let value = runtime.signal_value(self.id);
            let mut value = value.borrow_mut();
            let slot = value
                .downcast_mut::<T>()
                .expect("to downcast signal value to its original type");
            *slot = new_value;
        })
        .expect("tried to set a signal in a runtime that has been disposed")
    }
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WriteSignal<T> {}

impl<T> Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("WriteSignal");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for WriteSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for WriteSignal<T> {}

impl<T> Hash for WriteSignal<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.runtime.hash(state);
        self.id.hash(state);
    }
}
