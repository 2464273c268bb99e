//! Trajectory-sample files and the windowed dataset built from them.
//!
//! A sample file holds one recorded run:
//!
//! ```text
//! lane_width: 3.7
//! veh_length: 4.5
//! veh_width: 1.8
//! dt: 0.1
//! speed_limit: 30
//!
//! states: [(0.0, 1.85, 1.57, 20.0), (0.0, 3.85, 1.57, 20.1), ...]
//! actions: [(0.0, 1.0), (0.01, 0.5), ...]
//! ```
//!
//! Each header value is the text after the line's last `:`. State and
//! action lines list bracketed tuples of plain decimals.

mod error;

pub use error::{LoadError, ParseError, WindowError};

use std::{fs, path::Path, sync::LazyLock};

use ndarray::{Array2, s};
use regex::Regex;
use tracing::{debug, info};

use stackelberg_core::{Matrix, Vector, context::Dataset};

static TUPLE: LazyLock<Regex> = LazyLock::new(|| {
    // Known-good pattern, expect is safe
    Regex::new(r"[\[\(]+([\d\. ,-]+)[\)\]]+").expect("valid tuple pattern")
});

/// Scene constants recorded alongside a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    pub lane_width: f64,
    pub veh_length: f64,
    pub veh_width: f64,
    pub dt: f64,
    pub speed_limit: f64,
}

/// One parsed sample file.
///
/// `states` and `actions` hold one observation per row.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFile {
    pub header: Header,
    pub states: Matrix,
    pub actions: Matrix,
}

/// A fixed-length window of controls with the state it starts from.
///
/// `actions` has one row per time step.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySample {
    pub x0: Vector,
    pub actions: Matrix,
}

impl SampleFile {
    /// Parses the text of a sample file.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the offending line.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut lines = text.lines();
        let mut line_no = 0;
        let mut next = |field: &'static str| {
            line_no += 1;
            lines
                .next()
                .map(|line| (line_no, line))
                .ok_or(ParseError::MissingLine {
                    line: line_no,
                    field,
                })
        };

        let mut header = [0.0; 5];
        let fields = ["lane_width", "veh_length", "veh_width", "dt", "speed_limit"];
        for (value, field) in header.iter_mut().zip(fields) {
            let (line, text) = next(field)?;
            *value = number(line, after_label(text))?;
        }
        let [lane_width, veh_length, veh_width, dt, speed_limit] = header;

        let (line, text) = next("blank separator")?;
        if !text.trim().is_empty() {
            return Err(ParseError::ExpectedBlank { line });
        }

        let (line, text) = next("states")?;
        let states = tuples(line, after_label(text))?;
        let (line, text) = next("actions")?;
        let actions = tuples(line, after_label(text))?;

        Ok(Self {
            header: Header {
                lane_width,
                veh_length,
                veh_width,
                dt,
                speed_limit,
            },
            states,
            actions,
        })
    }

    /// Reads and parses the sample file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read or parsed.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text).map_err(|source| LoadError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Cuts the actions into windows of `length` steps.
    ///
    /// The first window starts at step 0. Later windows start at `length`
    /// and advance by `length / 2` while the start stays below
    /// `actions − length`, so consecutive later windows overlap by half.
    /// Each window starts from the state recorded at its first step.
    ///
    /// # Errors
    ///
    /// Returns a [`WindowError`] if `length < 2`, if there are fewer than
    /// `length` actions, or if a window starts past the recorded states.
    pub fn windows(&self, length: usize) -> Result<Vec<TrajectorySample>, WindowError> {
        if length < 2 {
            return Err(WindowError::Length(length));
        }
        let steps = self.actions.nrows();
        if steps < length {
            return Err(WindowError::TooShort { steps, length });
        }

        std::iter::once(0)
            .chain((length..steps - length).step_by(length / 2))
            .map(|start| {
                if start >= self.states.nrows() {
                    return Err(WindowError::MissingState {
                        start,
                        states: self.states.nrows(),
                    });
                }
                Ok(TrajectorySample {
                    x0: self.states.row(start).to_owned(),
                    actions: self.actions.slice(s![start..start + length, ..]).to_owned(),
                })
            })
            .collect()
    }
}

/// Loads every file in `paths` and concatenates their windows.
///
/// # Errors
///
/// Returns a [`LoadError`] naming the first file that fails.
pub fn load_dataset<P>(
    paths: impl IntoIterator<Item = P>,
    length: usize,
) -> Result<Dataset<TrajectorySample>, LoadError>
where
    P: AsRef<Path>,
{
    let mut dataset = Dataset::new(Vec::new());
    for path in paths {
        let path = path.as_ref();
        let file = SampleFile::read(path)?;
        let windows = file.windows(length).map_err(|source| LoadError::Window {
            path: path.to_owned(),
            source,
        })?;
        debug!(path = %path.display(), windows = windows.len(), "loaded sample file");
        dataset.extend(windows);
    }
    info!(samples = dataset.len(), length, "trajectory dataset ready");
    Ok(dataset)
}

fn after_label(text: &str) -> &str {
    text.rsplit(':').next().unwrap_or(text)
}

fn number(line: usize, text: &str) -> Result<f64, ParseError> {
    let text = text.trim();
    text.parse().map_err(|source| ParseError::Number {
        line,
        text: text.to_owned(),
        source,
    })
}

/// Parses every bracketed tuple on a line into the rows of a matrix.
fn tuples(line: usize, text: &str) -> Result<Matrix, ParseError> {
    let rows = TUPLE
        .captures_iter(text)
        .map(|captures| {
            captures[1]
                .split(',')
                .map(|component| number(line, component))
                .collect::<Result<Vec<f64>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let width = rows.first().map(Vec::len).ok_or(ParseError::NoTuples { line })?;
    if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
        return Err(ParseError::Ragged {
            line,
            index,
            expected: width,
            found: row.len(),
        });
    }

    Ok(Array2::from_shape_fn((rows.len(), width), |(i, j)| rows[i][j]))
}
