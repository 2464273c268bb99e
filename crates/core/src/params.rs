//! Named parameter blocks and the flat optimization space built from them.
//!
//! Callers own a list of [`ParameterBlock`]s. A [`ParameterSpace`] records
//! each block's contiguous range in one flat vector, in list order, once at
//! construction. Solvers work on the flat vector and hand results back
//! through [`ParameterSpace::write_back`], which is the only place block
//! values change.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use ndarray::{ArrayView1, s};
use thiserror::Error;

use crate::Vector;

/// A `(lower, upper)` box constraint for one scalar component.
///
/// Unbounded sides use `f64::NEG_INFINITY` and `f64::INFINITY`.
pub type Bound = (f64, f64);

/// The bound used for components with no constraint.
pub const UNBOUNDED: Bound = (f64::NEG_INFINITY, f64::INFINITY);

/// Errors raised when blocks, overrides, or flat vectors disagree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("block `{block}` expects {expected} values, found {found}")]
    DimensionMismatch {
        block: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown parameter block `{0}`")]
    UnknownBlock(String),

    #[error("duplicate parameter block `{0}`")]
    DuplicateBlock(String),

    #[error("parameter block `{0}` has no components")]
    EmptyBlock(String),

    #[error("block `{block}` has an invalid bound at component {index}: ({lower}, {upper})")]
    InvalidBound {
        block: String,
        index: usize,
        lower: f64,
        upper: f64,
    },

    #[error("flat vector has {found} components, the space has {expected}")]
    FlatDimension { expected: usize, found: usize },

    #[error("block at position {position} does not match the space layout")]
    LayoutMismatch { position: usize },
}

/// A named vector of parameters with a fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBlock {
    name: String,
    value: Vec<f64>,
    bounds: Option<Vec<Bound>>,
}

impl ParameterBlock {
    /// Creates an unbounded block with the given starting value.
    pub fn new(name: impl Into<String>, value: impl Into<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            bounds: None,
        }
    }

    /// Attaches per-component bounds to the block.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound count differs from the block dimension
    /// or if any bound has `lower > upper` or a NaN side.
    pub fn with_bounds(mut self, bounds: Vec<Bound>) -> Result<Self, ParamError> {
        validate_bounds(&self.name, self.value.len(), &bounds)?;
        self.bounds = Some(bounds);
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.value.len()
    }

    #[must_use]
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// Returns the block's own bounds, if any were attached.
    #[must_use]
    pub fn bounds(&self) -> Option<&[Bound]> {
        self.bounds.as_deref()
    }

    /// Replaces the stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` has a different dimension than the block.
    pub fn set_value(&mut self, value: &[f64]) -> Result<(), ParamError> {
        if value.len() != self.value.len() {
            return Err(ParamError::DimensionMismatch {
                block: self.name.clone(),
                expected: self.value.len(),
                found: value.len(),
            });
        }
        self.value.copy_from_slice(value);
        Ok(())
    }
}

/// Starting values that supersede stored block values for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    values: HashMap<String, Vec<f64>>,
}

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a starting value for the named block.
    #[must_use]
    pub fn with(mut self, block: impl Into<String>, value: impl Into<Vec<f64>>) -> Self {
        self.values.insert(block.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, block: &str) -> Option<&[f64]> {
        self.values.get(block).map(Vec::as_slice)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Bound overrides keyed by block name.
///
/// A block-specific entry wins over an [`all`](Self::all) entry, which wins
/// over the block's own bounds. Blocks with none of these are unbounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundsMap {
    all: Option<Vec<Bound>>,
    blocks: HashMap<String, Vec<Bound>>,
}

impl BoundsMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the same bound list to every block in the space.
    #[must_use]
    pub fn all(bounds: Vec<Bound>) -> Self {
        Self {
            all: Some(bounds),
            blocks: HashMap::new(),
        }
    }

    /// Sets the bound list for one block.
    #[must_use]
    pub fn with(mut self, block: impl Into<String>, bounds: Vec<Bound>) -> Self {
        self.blocks.insert(block.into(), bounds);
        self
    }

    /// Returns the override list that applies to `block`, if any.
    #[must_use]
    pub fn get(&self, block: &str) -> Option<&[Bound]> {
        self.blocks
            .get(block)
            .or(self.all.as_ref())
            .map(Vec::as_slice)
    }

    /// Returns true if no overrides are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_none() && self.blocks.is_empty()
    }
}

/// A block's name and its range in the flat vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRange {
    pub name: String,
    pub range: Range<usize>,
}

/// The flat index over an ordered list of parameter blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpace {
    ranges: Vec<BlockRange>,
    dim: usize,
}

impl ParameterSpace {
    /// Builds the flat index from the blocks' declared dimensions, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if two blocks share a name or a block is empty.
    pub fn new(blocks: &[ParameterBlock]) -> Result<Self, ParamError> {
        let mut seen = HashSet::with_capacity(blocks.len());
        let mut ranges = Vec::with_capacity(blocks.len());
        let mut start = 0;

        for block in blocks {
            if block.dim() == 0 {
                return Err(ParamError::EmptyBlock(block.name.clone()));
            }
            if !seen.insert(block.name.as_str()) {
                return Err(ParamError::DuplicateBlock(block.name.clone()));
            }
            let end = start + block.dim();
            ranges.push(BlockRange {
                name: block.name.clone(),
                range: start..end,
            });
            start = end;
        }

        Ok(Self { ranges, dim: start })
    }

    /// Total number of scalar components.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[must_use]
    pub fn ranges(&self) -> &[BlockRange] {
        &self.ranges
    }

    /// Returns the flat range of the named block.
    #[must_use]
    pub fn range(&self, block: &str) -> Option<Range<usize>> {
        self.ranges
            .iter()
            .find(|r| r.name == block)
            .map(|r| r.range.clone())
    }

    /// Returns a view of the named block's components within `x`.
    #[must_use]
    pub fn slice<'a>(&self, block: &str, x: &'a Vector) -> Option<ArrayView1<'a, f64>> {
        self.range(block).map(|r| x.slice(s![r]))
    }

    /// Concatenates block values in declared order.
    ///
    /// # Errors
    ///
    /// Returns an error if `blocks` does not match the layout.
    pub fn flatten(&self, blocks: &[ParameterBlock]) -> Result<Vector, ParamError> {
        self.check_layout(blocks)?;
        Ok(blocks
            .iter()
            .flat_map(|b| b.value.iter().copied())
            .collect())
    }

    /// Splits a flat vector into per-block values, the inverse of
    /// [`flatten`](Self::flatten).
    ///
    /// # Errors
    ///
    /// Returns an error if `x` has the wrong dimension.
    pub fn unflatten(&self, x: &Vector) -> Result<Vec<Vec<f64>>, ParamError> {
        self.check_dim(x)?;
        Ok(self
            .ranges
            .iter()
            .map(|r| x.slice(s![r.range.clone()]).to_vec())
            .collect())
    }

    /// Builds the starting point for a run.
    ///
    /// Blocks named in `overrides` start from the override value; the rest
    /// start from their stored value. Stored values are not modified.
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown block or has the
    /// wrong dimension, or if `blocks` does not match the layout.
    pub fn initial(
        &self,
        blocks: &[ParameterBlock],
        overrides: &Overrides,
    ) -> Result<Vector, ParamError> {
        self.check_layout(blocks)?;
        if let Some(name) = overrides.names().find(|n| self.range(n).is_none()) {
            return Err(ParamError::UnknownBlock(name.to_owned()));
        }

        let mut x = Vector::zeros(self.dim);
        for (block, r) in blocks.iter().zip(&self.ranges) {
            let value = overrides.get(&block.name).unwrap_or(&block.value);
            if value.len() != block.dim() {
                return Err(ParamError::DimensionMismatch {
                    block: block.name.clone(),
                    expected: block.dim(),
                    found: value.len(),
                });
            }
            x.slice_mut(s![r.range.clone()])
                .iter_mut()
                .zip(value)
                .for_each(|(dst, src)| *dst = *src);
        }
        Ok(x)
    }

    /// Produces one bound per scalar component.
    ///
    /// # Errors
    ///
    /// Returns an error if a bounds entry names an unknown block, has the
    /// wrong length, or contains an invalid pair.
    pub fn bounds(
        &self,
        blocks: &[ParameterBlock],
        overrides: &BoundsMap,
    ) -> Result<Vec<Bound>, ParamError> {
        self.check_layout(blocks)?;
        if let Some(name) = overrides.blocks.keys().find(|n| self.range(n).is_none()) {
            return Err(ParamError::UnknownBlock(name.clone()));
        }

        let mut bounds = Vec::with_capacity(self.dim);
        for block in blocks {
            match overrides.get(&block.name).or(block.bounds()) {
                Some(list) => {
                    validate_bounds(&block.name, block.dim(), list)?;
                    bounds.extend_from_slice(list);
                }
                None => bounds.extend(std::iter::repeat_n(UNBOUNDED, block.dim())),
            }
        }
        Ok(bounds)
    }

    /// Overwrites each block's stored value with its slice of `x`.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving every block untouched, if `x` or `blocks`
    /// do not match the layout.
    pub fn write_back(&self, x: &Vector, blocks: &mut [ParameterBlock]) -> Result<(), ParamError> {
        self.check_dim(x)?;
        self.check_layout(blocks)?;
        for (block, r) in blocks.iter_mut().zip(&self.ranges) {
            block
                .value
                .iter_mut()
                .zip(x.slice(s![r.range.clone()]))
                .for_each(|(dst, src)| *dst = *src);
        }
        Ok(())
    }

    fn check_dim(&self, x: &Vector) -> Result<(), ParamError> {
        if x.len() == self.dim {
            Ok(())
        } else {
            Err(ParamError::FlatDimension {
                expected: self.dim,
                found: x.len(),
            })
        }
    }

    fn check_layout(&self, blocks: &[ParameterBlock]) -> Result<(), ParamError> {
        if blocks.len() != self.ranges.len() {
            return Err(ParamError::LayoutMismatch {
                position: blocks.len().min(self.ranges.len()),
            });
        }
        for (position, (block, r)) in blocks.iter().zip(&self.ranges).enumerate() {
            if block.name != r.name {
                return Err(ParamError::LayoutMismatch { position });
            }
            if block.dim() != r.range.len() {
                return Err(ParamError::DimensionMismatch {
                    block: block.name.clone(),
                    expected: r.range.len(),
                    found: block.dim(),
                });
            }
        }
        Ok(())
    }
}

fn validate_bounds(block: &str, dim: usize, bounds: &[Bound]) -> Result<(), ParamError> {
    if bounds.len() != dim {
        return Err(ParamError::DimensionMismatch {
            block: block.to_owned(),
            expected: dim,
            found: bounds.len(),
        });
    }
    for (index, &(lower, upper)) in bounds.iter().enumerate() {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(ParamError::InvalidBound {
                block: block.to_owned(),
                index,
                lower,
                upper,
            });
        }
    }
    Ok(())
}
