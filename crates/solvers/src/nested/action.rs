/// Actions an observer can take during a bi-level run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the outer solver at the end of its current iteration.
    ///
    /// The final inner solve still runs, so the returned state stays
    /// consistent.
    StopEarly,
}
