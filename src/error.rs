//! Error types and the tagged result used wherever a denominator can vanish.

use thiserror::Error;

/// Errors that can occur while building datasets, fitting models, or comparing them.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A variable label was not found in the dataset.
    #[error("unknown variable {0:?}")]
    UnknownVariable(String),

    /// The same label was added to a dataset twice.
    #[error("variable {0:?} is already part of the dataset")]
    DuplicateVariable(String),

    /// A variable was added without any samples.
    #[error("variable {0:?} has no samples")]
    EmptyVariable(String),

    /// A variable's sample sequence doesn't line up with the rest of the dataset.
    #[error("variable {label:?} has {got} samples, expected {expected}")]
    RaggedDataset {
        /// The variable being added.
        label: String,
        /// The sample count of the dataset.
        expected: usize,
        /// The sample count of the new variable.
        got: usize,
    },

    /// Two vectors that are compared element-wise have different lengths.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Length of the first vector.
        expected: usize,
        /// Length of the second vector.
        got: usize,
    },

    /// The divergence selector was not one of `kld`, `jsd` or `mid`.
    #[error("unsupported metric {0:?} (expected one of \"kld\", \"jsd\", \"mid\")")]
    UnsupportedMetric(String),

    /// The tree strategy name was not recognized.
    #[error("unsupported tree strategy {0:?} (expected \"greedy\" or \"spanning\")")]
    UnsupportedStrategy(String),

    /// The zero policy name was not recognized.
    #[error("unsupported zero policy {0:?} (expected \"mask\" or \"strict\")")]
    UnsupportedPolicy(String),

    /// A similarity was requested over an empty collection of values.
    #[error("nothing to compare")]
    NoComparisons,
}

/// The result of a computation whose value may not exist because it has no support in the data,
/// for example a conditional probability given a parent value that was never observed.
///
/// This keeps "undefined" apart from a genuine zero. Call [`Estimate::or_zero`] to get the masking
/// behavior where both collapse to `0.0`.
///
/// ```
/// use chow_liu::Estimate;
///
/// assert_eq!(Estimate::Defined(0.25).or_zero(), 0.25);
/// assert_eq!(Estimate::Undefined.or_zero(), 0.0);
/// assert_eq!(Estimate::Undefined.value(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Estimate {
    /// The value is supported by the data.
    Defined(f64),
    /// A denominator was zero.
    Undefined,
}

impl Estimate {
    /// Builds an estimate from a ratio, which is undefined when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Estimate::Undefined
        } else {
            Estimate::Defined(numerator / denominator)
        }
    }

    /// The value, if defined.
    pub fn value(self) -> Option<f64> {
        match self {
            Estimate::Defined(value) => Some(value),
            Estimate::Undefined => None,
        }
    }

    /// The value, with undefined mapped to `0.0`.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    /// Returns `true` if the value is supported by the data.
    pub fn is_defined(self) -> bool {
        matches!(self, Estimate::Defined(_))
    }

    /// Applies `f` to a defined value.
    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Self {
        match self {
            Estimate::Defined(value) => Estimate::Defined(f(value)),
            Estimate::Undefined => Estimate::Undefined,
        }
    }
}

impl From<f64> for Estimate {
    fn from(value: f64) -> Self {
        Estimate::Defined(value)
    }
}
