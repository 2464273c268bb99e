use stackelberg_core::{ContextSource, Oracle, Sample, Vector};

use super::{BatchResult, Config, Error, average};

/// Averages an oracle's value and gradient over a context source.
#[derive(Debug)]
pub struct BatchEvaluator<'a, O, S: ?Sized> {
    oracle: &'a O,
    source: &'a S,
    config: Config,
}

impl<O, S: ?Sized> Clone for BatchEvaluator<'_, O, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, S: ?Sized> Copy for BatchEvaluator<'_, O, S> {}

impl<'a, O, S> BatchEvaluator<'a, O, S>
where
    O: Oracle,
    S: ContextSource<Context = O::Context> + ?Sized,
{
    pub fn new(oracle: &'a O, source: &'a S, config: Config) -> Self {
        Self {
            oracle,
            source,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluates the batch mean at `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle fails, returns a gradient of the wrong
    /// length, or every context is rejected.
    pub fn evaluate(&self, x: &Vector) -> Result<BatchResult<Sample>, Error<O::Error>> {
        average(self.source, &self.config, x.len(), |context| {
            self.oracle.evaluate(x, context)
        })
    }

    /// Evaluates the batch mean at `x` on the rayon thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(&self, x: &Vector) -> Result<BatchResult<Sample>, Error<O::Error>>
    where
        O: Sync,
        O::Context: Sync,
        O::Error: Send,
    {
        super::average_parallel(self.source, &self.config, x.len(), |context| {
            self.oracle.evaluate(x, context)
        })
    }
}
