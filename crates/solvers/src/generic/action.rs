/// Actions an observer can take during an `argmin` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Interrupt the solver and return the best point evaluated so far.
    StopEarly,
}
