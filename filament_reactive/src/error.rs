use crate::{node::EffectId, runtime::RuntimeId, Effect};
use std::{error, fmt, ops, rc::Rc};
use thiserror::Error;

/// A generic wrapper for any error returned out of an effect body.
///
/// Anything implementing [`std::error::Error`] converts into it with `?`,
/// including [`BroadcastError`], so an effect that writes other signals from
/// inside its body can pass their failures straight through.
#[derive(Debug, Clone)]
#[repr(transparent)]
pub struct EffectError(Rc<dyn error::Error>);

impl EffectError {
    /// Converts the wrapper into the inner reference-counted error.
    pub fn into_inner(self) -> Rc<dyn error::Error> {
        self.0
    }
}

impl ops::Deref for EffectError {
    type Target = Rc<dyn error::Error>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T> From<T> for EffectError
where
    T: error::Error + 'static,
{
    fn from(value: T) -> Self {
        EffectError(Rc::new(value))
    }
}

/// Aggregate error for one notification pass: every dependent effect whose
/// body failed while it was re-run, in notification order, paired with the
/// error it returned.
///
/// Produced only after every dependent has been attempted; one failing
/// dependent never keeps the rest from running.
#[derive(Debug, Clone, Error)]
#[error("{} effect(s) failed during notification", .failures.len())]
pub struct BroadcastError {
    /// The failing effects, in the order they were notified.
    pub failures: Vec<(Effect, EffectError)>,
}

impl BroadcastError {
    /// Turns the raw failure list collected by a notification pass into the
    /// caller-facing result.
    pub(crate) fn from_failed_runs(
        runtime: RuntimeId,
        failures: Vec<(EffectId, EffectError)>,
    ) -> Result<(), Self> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self {
                failures: failures
                    .into_iter()
                    .map(|(id, error)| (Effect { runtime, id }, error))
                    .collect(),
            })
        }
    }
}
