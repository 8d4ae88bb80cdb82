#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! The reactive core of the Filament UI toolkit.
//!
//! ## Fine-Grained Reactivity
//!
//! Filament is built on a fine-grained reactive system: individual reactive
//! values ("signals," sometimes known as observables) trigger the code that
//! reacts to them ("effects," sometimes known as observers) to re-run. The
//! two halves are inter-dependent. Without effects, signals can change but
//! never be observed in a way that interacts with the outside world. Without
//! signals, effects run once and then never again, as there is no observable
//! value to subscribe to.
//!
//! Dependencies are discovered, not declared: while an effect body runs, any
//! signal it reads through [`Signal::get`] or [`Signal::with`] records an
//! edge between the two, and the set of edges is rebuilt from scratch on
//! every run. Writing a signal through [`Signal::set`] synchronously re-runs
//! its dependents in the order they first read it; a dependent whose body
//! fails does not stop the others, and all failures come back together as
//! one [`BroadcastError`].
//!
//! Everything lives in a [runtime](create_runtime): an explicit object
//! owning the signals, the effects, and the stack of currently-running
//! effects that tracked reads are attributed to. The system is fully
//! synchronous and single-threaded; there is no scheduler, no batching, and
//! no cross-thread sharing.
//!
//! ### Example
//! ```
//! use filament_reactive::*;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let runtime = create_runtime();
//!
//! // a signal: an observable value
//! let count = create_signal(runtime, 0);
//!
//! // reading outside any effect subscribes nothing
//! assert_eq!(count.get(), 0);
//!
//! // an effect: runs once now, and again whenever a signal it read changes
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let effect = create_effect(runtime, {
//!     let log = log.clone();
//!     move || {
//!         log.borrow_mut().push(count.get());
//!         Ok(())
//!     }
//! })
//! .unwrap();
//!
//! count.set(1).unwrap();
//! count.set(1).unwrap(); // unchanged: dependents are not notified
//! count.set(2).unwrap();
//! assert_eq!(*log.borrow(), vec![0, 1, 2]);
//!
//! // the handle stops the effect
//! effect.dispose();
//! count.set(3).unwrap();
//! assert_eq!(*log.borrow(), vec![0, 1, 2]);
//!
//! runtime.dispose();
//! ```

#[macro_use]
extern crate tracing;

mod effect;
mod error;
mod macros;
mod node;
mod runtime;
mod signal;
mod trigger;

pub use effect::*;
pub use error::*;
pub use runtime::*;
pub use signal::*;
pub use trigger::*;
