//! Pairwise mutual information between the variables of a [`Dataset`].

use crate::dataset::Dataset;
use crate::error::Error;
use crate::Symbol;
use std::collections::BTreeMap;
use tracing::trace;

/// The mutual information between two distinct variables.
#[derive(Clone, Debug, PartialEq)]
pub struct MiEdge {
    /// The variable that comes first in the dataset.
    pub a: String,
    /// The variable that comes later in the dataset.
    pub b: String,
    /// Mutual information in bits.
    pub mi: f64,
}

/// An append-only log of mutual information values.
///
/// Two models are structurally comparable through their vectors only when both were built over
/// variables in the same order, since entries are compared by position. Recording the same pair
/// twice appends twice; nothing is deduplicated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MiVector(Vec<f64>);

impl MiVector {
    /// Creates an empty vector.
    pub fn new() -> Self {
        MiVector(Vec::new())
    }

    /// Builds a vector holding the value of every edge, in order.
    pub fn from_edges(edges: &[MiEdge]) -> Self {
        MiVector(edges.iter().map(|edge| edge.mi).collect())
    }

    /// Appends one value.
    pub fn record(&mut self, mi: f64) {
        self.0.push(mi);
    }

    /// Appends the value of every edge, in order.
    pub fn record_edges(&mut self, edges: &[MiEdge]) {
        self.0.extend(edges.iter().map(|edge| edge.mi));
    }

    /// The number of recorded values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded values, oldest first.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl<S: Symbol> Dataset<S> {
    /// The mutual information between `var_a` and `var_b`, in bits.
    ///
    /// This sums `p(x, y) * log2(p(x, y) / (p(x) * p(y)))` over every pair of symbols that occurs
    /// together at least once; pairs that never co-occur contribute nothing. The joint counts come
    /// from a single pass over the aligned samples, so the cost is linear in the sample count.
    ///
    /// ```
    /// use chow_liu::Dataset;
    ///
    /// let data = Dataset::from_columns(vec![
    ///     ("coin", vec![0, 1, 0, 1]),
    ///     ("copy", vec![0, 1, 0, 1]),
    ///     ("const", vec![7, 7, 7, 7]),
    /// ])?;
    /// assert_eq!(data.mutual_information("coin", "copy")?, 1.0);
    /// assert_eq!(data.mutual_information("coin", "const")?, 0.0);
    /// # Ok::<(), chow_liu::Error>(())
    /// ```
    pub fn mutual_information(&self, var_a: &str, var_b: &str) -> Result<f64, Error> {
        let xs = self.samples(var_a)?;
        let ys = self.samples(var_b)?;
        let counts_a = self.value_counts(var_a)?;
        let counts_b = self.value_counts(var_b)?;

        let mut joint: BTreeMap<(&S, &S), usize> = BTreeMap::new();
        for pair in xs.iter().zip(ys.iter()) {
            *joint.entry(pair).or_insert(0) += 1;
        }

        let total = xs.len() as f64;
        let mut mi = 0.0;
        for ((x, y), count) in joint {
            let p_xy = count as f64 / total;
            let p_x = counts_a.count(x) as f64 / total;
            let p_y = counts_b.count(y) as f64 / total;
            mi += p_xy * (p_xy / (p_x * p_y)).log2();
        }

        trace!("mutual information of {} and {}: {:.5}", var_a, var_b, mi);
        Ok(mi)
    }

    /// The mutual information of every unordered pair of variables.
    ///
    /// Pairs are enumerated by position: for each variable `i` after the first, and each variable
    /// `j` before it, the edge `(j, i)` is produced. That is the order [`MiVector`] comparisons
    /// rely on.
    ///
    /// ```
    /// use chow_liu::Dataset;
    ///
    /// let data = Dataset::from_columns(vec![
    ///     ("x", vec![0, 1]),
    ///     ("y", vec![0, 1]),
    ///     ("z", vec![1, 1]),
    /// ])?;
    /// let pairs: Vec<_> = data
    ///     .calculate_mutual_information()?
    ///     .into_iter()
    ///     .map(|edge| (edge.a, edge.b))
    ///     .collect();
    /// assert_eq!(pairs, vec![
    ///     ("x".to_string(), "y".to_string()),
    ///     ("x".to_string(), "z".to_string()),
    ///     ("y".to_string(), "z".to_string()),
    /// ]);
    /// # Ok::<(), chow_liu::Error>(())
    /// ```
    pub fn calculate_mutual_information(&self) -> Result<Vec<MiEdge>, Error> {
        let labels: Vec<&str> = self.variables().collect();
        let mut edges = Vec::with_capacity(labels.len() * labels.len().saturating_sub(1) / 2);
        for (i, b) in labels.iter().enumerate().skip(1) {
            for a in labels[..i].iter() {
                edges.push(MiEdge {
                    a: (*a).to_owned(),
                    b: (*b).to_owned(),
                    mi: self.mutual_information(a, b)?,
                });
            }
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_variables_share_nothing() {
        let data = Dataset::from_columns(vec![
            ("a", vec![0, 0, 1, 1]),
            ("b", vec![0, 1, 0, 1]),
        ])
        .unwrap();
        assert_eq!(data.mutual_information("a", "b").unwrap(), 0.0);
    }

    #[test]
    fn vector_is_an_append_log() {
        let data = Dataset::from_columns(vec![
            ("a", vec![0, 0, 1, 1]),
            ("b", vec![0, 0, 1, 1]),
        ])
        .unwrap();
        let mut log = MiVector::new();
        for _ in 0..3 {
            log.record(data.mutual_information("a", "b").unwrap());
        }
        assert_eq!(log.as_slice(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn single_variable_has_no_pairs() {
        let data = Dataset::from_columns(vec![("a", vec!['x'])]).unwrap();
        assert!(data.calculate_mutual_information().unwrap().is_empty());
    }
}
