//! Shared oracles for the end-to-end scenarios under `tests/`.

pub mod oracles;
