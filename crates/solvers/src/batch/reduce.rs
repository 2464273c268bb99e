use tracing::debug;

use stackelberg_core::ContextSource;

use super::{BatchResult, BatchSample, Config, Error, Rejection};

/// Running sum over accepted samples.
struct Accumulator<T> {
    sum: Option<T>,
    accepted: usize,
    rejected: usize,
}

impl<T: BatchSample> Accumulator<T> {
    fn new() -> Self {
        Self {
            sum: None,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Screens one result and folds it into the sum if admissible.
    fn push(&mut self, index: usize, sample: T, limit: f64) {
        if let Some(reason) = sample.screen(limit) {
            debug!(index, ?reason, "rejected sample");
            self.rejected += 1;
            return;
        }
        self.accepted += 1;
        match &mut self.sum {
            Some(sum) => sum.accumulate(&sample),
            None => self.sum = Some(sample),
        }
    }

    #[cfg(feature = "parallel")]
    fn merge(mut self, other: Self) -> Self {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.sum = match (self.sum, other.sum) {
            (Some(mut a), Some(b)) => {
                a.accumulate(&b);
                Some(a)
            }
            (a, b) => a.or(b),
        };
        self
    }

    fn finish<E>(self) -> Result<BatchResult<T>, Error<E>> {
        let Some(mut mean) = self.sum else {
            return Err(Error::EmptyBatch {
                rejected: self.rejected,
            });
        };
        #[allow(clippy::cast_precision_loss)]
        mean.divide(self.accepted as f64);
        // Every accepted entry is finite, so a non-finite mean is an overflow.
        if let Some(Rejection::NonFinite { term, .. } | Rejection::OutOfRange { term, .. }) =
            mean.screen(f64::INFINITY)
        {
            return Err(Error::Overflow {
                term,
                accepted: self.accepted,
            });
        }
        if self.rejected > 0 {
            debug!(
                accepted = self.accepted,
                rejected = self.rejected,
                "batch pass finished with rejections"
            );
        }
        Ok(BatchResult {
            mean,
            accepted: self.accepted,
            rejected: self.rejected,
        })
    }
}

/// Averages per-context results over one pass of `source`.
///
/// Each context is evaluated once with `eval`. Results with non-finite or
/// out-of-range entries are rejected; the rest are averaged.
///
/// # Errors
///
/// Returns an error if `eval` fails, a result has the wrong shape, or no
/// result is accepted.
pub fn average<S, T, E, F>(
    source: &S,
    config: &Config,
    shape: T::Shape,
    mut eval: F,
) -> Result<BatchResult<T>, Error<E>>
where
    S: ContextSource + ?Sized,
    T: BatchSample,
    F: FnMut(&S::Context) -> Result<T, E>,
{
    let mut acc = Accumulator::new();
    for (index, context) in source.contexts().enumerate() {
        let sample = eval(&context).map_err(|source| Error::Oracle { index, source })?;
        sample
            .check_shape(shape)
            .map_err(|mismatch| Error::Dimension { index, mismatch })?;
        acc.push(index, sample, config.inf_ignore());
    }
    acc.finish()
}

/// Parallel form of [`average`].
///
/// Contexts are drawn from `source` in order, then evaluated and screened
/// on the rayon pool. Rejection is decided per sample before any sums are
/// combined, so the result matches [`average`] up to summation order.
///
/// # Errors
///
/// Same as [`average`]. If several contexts fail, which error is returned
/// is unspecified.
#[cfg(feature = "parallel")]
pub fn average_parallel<S, T, E, F>(
    source: &S,
    config: &Config,
    shape: T::Shape,
    eval: F,
) -> Result<BatchResult<T>, Error<E>>
where
    S: ContextSource + ?Sized,
    S::Context: Sync,
    T: BatchSample + Send,
    T::Shape: Sync,
    E: Send,
    F: Fn(&S::Context) -> Result<T, E> + Sync,
{
    use rayon::prelude::*;

    let contexts: Vec<S::Context> = source.contexts().collect();
    let limit = config.inf_ignore();

    contexts
        .par_iter()
        .enumerate()
        .map(|(index, context)| {
            let sample = eval(context).map_err(|source| Error::Oracle { index, source })?;
            sample
                .check_shape(shape)
                .map_err(|mismatch| Error::Dimension { index, mismatch })?;
            let mut acc = Accumulator::new();
            acc.push(index, sample, limit);
            Ok(acc)
        })
        .try_reduce(Accumulator::new, |a, b| Ok(a.merge(b)))?
        .finish()
}
