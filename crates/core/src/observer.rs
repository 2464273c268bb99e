/// Receives solver events and decides how the iteration should proceed.
///
/// Every iterative solver in this family emits one event per iteration and
/// accepts an observer. Observers can log progress, record iterates, or stop
/// a run early without the solver's API changing.
///
/// `observe` returns `Option<A>`: `Some(action)` requests a solver-specific
/// action and `None` lets the solver continue unchanged.
///
/// Closures of the form `FnMut(&E) -> Option<A>` implement `Observer`, and
/// `()` is a no-op observer that never acts.
pub trait Observer<E, A> {
    /// Observes a solver event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
