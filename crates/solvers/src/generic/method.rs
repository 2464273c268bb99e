use std::{fmt, str::FromStr};

use thiserror::Error;

/// An unbounded gradient-based method run through `argmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// L-BFGS with a More-Thuente line search, keeping `memory` pairs.
    Lbfgs { memory: usize },

    /// Steepest descent with a More-Thuente line search.
    SteepestDescent,

    /// Polak-Ribière nonlinear conjugate gradient with a More-Thuente line
    /// search.
    ConjugateGradient,
}

/// A method tag that names no known method.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown optimization method `{0}`")]
pub struct ParseMethodError(pub String);

impl FromStr for Method {
    type Err = ParseMethodError;

    /// Parses a method tag, ignoring case.
    ///
    /// Accepts `l-bfgs`/`lbfgs`, `steepest-descent`/`gd`, and
    /// `cg`/`conjugate-gradient`.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "l-bfgs" | "lbfgs" => Ok(Self::Lbfgs { memory: 10 }),
            "steepest-descent" | "gd" => Ok(Self::SteepestDescent),
            "cg" | "conjugate-gradient" => Ok(Self::ConjugateGradient),
            _ => Err(ParseMethodError(tag.to_owned())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lbfgs { memory } => write!(f, "L-BFGS (m = {memory})"),
            Self::SteepestDescent => f.write_str("steepest descent"),
            Self::ConjugateGradient => f.write_str("nonlinear CG"),
        }
    }
}
