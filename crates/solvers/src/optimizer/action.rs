/// Actions an observer can take during an optimizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the underlying solver early and keep its current iterate.
    StopEarly,
}
