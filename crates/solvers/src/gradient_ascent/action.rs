/// Actions an observer can take during gradient ascent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop before taking the next step.
    StopEarly,
}
