//! Context sources: factories for the dataset streamed through an oracle.
//!
//! A batch pass calls [`ContextSource::contexts`] once and consumes the
//! returned sequence fully. Sources are expected to yield a fresh sequence
//! on every call; [`OneShot`] is the documented exception.

use std::cell::RefCell;
use std::iter::{Cloned, Once, once};
use std::slice;

/// Produces a fresh, finite, ordered sequence of contexts per batch pass.
pub trait ContextSource {
    type Context;

    type Iter<'a>: Iterator<Item = Self::Context>
    where
        Self: 'a;

    /// Starts a new pass over the contexts.
    fn contexts(&self) -> Self::Iter<'_>;
}

impl<T: ContextSource + ?Sized> ContextSource for &T {
    type Context = T::Context;

    type Iter<'a>
        = T::Iter<'a>
    where
        Self: 'a;

    fn contexts(&self) -> Self::Iter<'_> {
        (**self).contexts()
    }
}

/// A source with exactly one context.
///
/// `Single(())` is the default for non-batched optimization: the oracle is
/// called once per evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Single<C>(pub C);

impl<C: Clone> ContextSource for Single<C> {
    type Context = C;

    type Iter<'a>
        = Once<C>
    where
        Self: 'a;

    fn contexts(&self) -> Self::Iter<'_> {
        once(self.0.clone())
    }
}

/// An owned, restartable list of contexts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset<C> {
    items: Vec<C>,
}

impl<C> Dataset<C> {
    #[must_use]
    pub fn new(items: Vec<C>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: C) {
        self.items.push(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[C] {
        &self.items
    }
}

impl<C> From<Vec<C>> for Dataset<C> {
    fn from(items: Vec<C>) -> Self {
        Self::new(items)
    }
}

impl<C> FromIterator<C> for Dataset<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<C> Extend<C> for Dataset<C> {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<C: Clone> ContextSource for Dataset<C> {
    type Context = C;

    type Iter<'a>
        = Cloned<slice::Iter<'a, C>>
    where
        Self: 'a;

    fn contexts(&self) -> Self::Iter<'_> {
        self.items.iter().cloned()
    }
}

/// A source backed by a closure that builds a new sequence on each pass.
///
/// ```
/// use stackelberg_core::ContextSource;
/// use stackelberg_core::context::FromFn;
///
/// let source = FromFn(|| (0..3).map(f64::from));
/// assert_eq!(source.contexts().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
/// assert_eq!(source.contexts().count(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(pub F);

impl<F, I> ContextSource for FromFn<F>
where
    F: Fn() -> I,
    I: IntoIterator,
{
    type Context = I::Item;

    type Iter<'a>
        = I::IntoIter
    where
        Self: 'a;

    fn contexts(&self) -> Self::Iter<'_> {
        (self.0)().into_iter()
    }
}

/// A single-pass source with a fallback context.
///
/// The first pass yields the wrapped iterator. Every later pass yields only
/// `fallback`, modeling a context whose state keeps its last explicitly set
/// value once a one-shot generator has been drained.
#[derive(Debug)]
pub struct OneShot<I, C> {
    pending: RefCell<Option<I>>,
    fallback: C,
}

impl<I, C> OneShot<I, C> {
    pub fn new(iter: I, fallback: C) -> Self {
        Self {
            pending: RefCell::new(Some(iter)),
            fallback,
        }
    }

    /// Returns true once the wrapped iterator has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pending.borrow().is_none()
    }
}

/// Iterator returned by [`OneShot::contexts`].
#[derive(Debug)]
pub enum OneShotIter<I, C> {
    First(I),
    Fallback(Once<C>),
}

impl<I, C> Iterator for OneShotIter<I, C>
where
    I: Iterator<Item = C>,
{
    type Item = C;

    fn next(&mut self) -> Option<C> {
        match self {
            Self::First(iter) => iter.next(),
            Self::Fallback(iter) => iter.next(),
        }
    }
}

impl<I, C> ContextSource for OneShot<I, C>
where
    I: Iterator<Item = C>,
    C: Clone,
{
    type Context = C;

    type Iter<'a>
        = OneShotIter<I, C>
    where
        Self: 'a;

    fn contexts(&self) -> Self::Iter<'_> {
        match self.pending.borrow_mut().take() {
            Some(iter) => OneShotIter::First(iter),
            None => OneShotIter::Fallback(once(self.fallback.clone())),
        }
    }
}
