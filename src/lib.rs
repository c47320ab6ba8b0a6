#![warn(missing_docs)]
#![doc(test(no_crate_inject))]
#![doc(test(attr(deny(unused, future_incompatible))))]

//! This crate learns [Chow-Liu trees][chow-liu] over categorical variables from sample data, and
//! compares fitted models with a handful of divergence and similarity scores.
//!
//! [chow-liu]: https://en.wikipedia.org/wiki/Chow%E2%80%93Liu_tree
//!
//! The pipeline is:
//!
//! 1. a [`Dataset`] holds aligned samples and estimates marginal, joint and conditional
//!    probabilities by counting;
//! 2. [`Dataset::calculate_mutual_information`] produces the mutual information of every pair of
//!    variables;
//! 3. a [`TreeStrategy`] turns that edge list into a [`ChowLiuTree`];
//! 4. a [`ChowLiuModel`] bundles the three, and a [`Comparison`] scores two models against each
//!    other.
//!
//! ```
//! use chow_liu::{ChowLiuModel, Comparison, Dataset, Metric};
//!
//! let data = Dataset::from_columns(vec![
//!     ("0", vec!['A', 'A', 'A', 'G', 'A']),
//!     ("1", vec!['A', 'A', 'A', 'C', 'C']),
//!     ("2", vec!['C', 'G', 'G', 'T', 'T']),
//!     ("3", vec!['C', 'C', 'C', 'C', 'C']),
//! ])?;
//! let model = ChowLiuModel::fit(data)?;
//!
//! // "3" never varies, so it hangs off the tree with zero mutual information.
//! assert_eq!(model.tree().parent("3"), Some("0"));
//! assert_eq!(model.tree().weight("0", "3"), Some(0.0));
//!
//! let score = Comparison::new(&model, &model).divergence(Metric::JensenShannon)?;
//! assert_eq!(score.or_zero(), 1.0);
//! # Ok::<(), chow_liu::Error>(())
//! ```
//!
//! Mutual information for one pair of variables costs time linear in the number of samples, so
//! fitting a model over `n` variables takes `O(n^2 * samples)`.

pub use sorted_iter;

pub mod dataset;
pub mod divergence;
mod error;
pub mod information;
pub mod model;
pub mod tree;

pub use dataset::{Dataset, Distribution, ValueCounts};
pub use divergence::{Comparison, ConditionalQuery, Metric, ZeroPolicy};
pub use error::{Error, Estimate};
pub use information::{MiEdge, MiVector};
pub use model::ChowLiuModel;
pub use tree::{ChowLiuTree, TreeStrategy};

/// Types which can be observed as the value of a categorical variable.
///
/// Symbols are opaque apart from their total order, which fixes the order in which alphabets and
/// distributions are enumerated. Strings, characters, integers and interned keys such as
/// [`lasso::Spur`] all qualify.
pub trait Symbol: Clone + Ord + std::hash::Hash + std::fmt::Debug {}

impl<T> Symbol for T where T: Clone + Ord + std::hash::Hash + std::fmt::Debug {}
