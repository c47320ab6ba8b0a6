//! Aligned categorical samples, and empirical probabilities estimated from them.

use crate::error::{Error, Estimate};
use crate::Symbol;
use smallvec::SmallVec;
use sorted_iter::assume::{AssumeSortedByItemExt, AssumeSortedByKeyExt};
use sorted_iter::sorted_iterator::SortedByItem;
use sorted_iter::{multiway_union, SortedPairIterator};
use std::collections::{BTreeMap, HashMap};
use std::iter;

/// How many times each symbol occurs in one variable's samples, kept sorted by symbol.
///
/// Categorical variables usually have a handful of values, so small tables are stored inline
/// without a heap allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueCounts<S: Symbol>(SmallVec<[(S, usize); 8]>);

impl<S: Symbol> ValueCounts<S> {
    fn tally<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        S: 'a,
    {
        let mut counts: SmallVec<[(S, usize); 8]> = SmallVec::new();
        for sample in samples {
            match counts.binary_search_by(|(probe, _)| probe.cmp(sample)) {
                Ok(idx) => counts[idx].1 += 1,
                Err(idx) => counts.insert(idx, (sample.clone(), 1)),
            }
        }
        ValueCounts(counts)
    }

    /// The number of samples equal to `value`.
    pub fn count(&self, value: &S) -> usize {
        self.0
            .binary_search_by(|(probe, _)| probe.cmp(value))
            .map_or(0, |idx| self.0[idx].1)
    }

    /// The number of distinct symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no samples were counted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(symbol, count)` pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, usize)> + '_ {
        self.0.iter().map(|(symbol, count)| (symbol, *count))
    }

    /// Iterates over the distinct symbols in order.
    pub fn symbols(&self) -> impl Iterator<Item = &S> + SortedByItem + Clone + '_ {
        self.0.iter().map(|(symbol, _)| symbol).assume_sorted_by_item()
    }
}

#[derive(Clone, Debug)]
struct Variable<S: Symbol> {
    label: String,
    samples: Vec<S>,
    counts: ValueCounts<S>,
}

/// A collection of categorical variables, each with a sequence of observed symbols.
///
/// Sample `i` of every variable belongs to the same observation, so all sequences have the same
/// length. Variables keep the order in which they were added; that order is what "position" means
/// when mutual information is enumerated pairwise.
///
/// ```
/// use chow_liu::Dataset;
///
/// let mut data = Dataset::new();
/// data.add_variable("0", vec!['A', 'A', 'A', 'G', 'A'])?
///     .add_variable("1", vec!['A', 'A', 'A', 'C', 'C'])?;
///
/// assert_eq!(data.sample_count(), 5);
/// assert_eq!(data.marginal_probability("0", &'A')?, 0.8);
/// assert_eq!(data.joint_probability("0", "1", &'G', &'C')?, 0.2);
/// assert!(data.add_variable("2", vec!['C']).is_err());
/// # Ok::<(), chow_liu::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Dataset<S: Symbol> {
    variables: Vec<Variable<S>>,
    index: HashMap<String, usize>,
}

impl<S: Symbol> Default for Dataset<S> {
    fn default() -> Self {
        Dataset::new()
    }
}

impl<S: Symbol> Dataset<S> {
    /// Creates a dataset with no variables.
    pub fn new() -> Self {
        Dataset {
            variables: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a dataset from `(label, samples)` columns, in order.
    pub fn from_columns<I, L>(columns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (L, Vec<S>)>,
        L: Into<String>,
    {
        let mut dataset = Dataset::new();
        for (label, samples) in columns {
            dataset.add_variable(label, samples)?;
        }
        Ok(dataset)
    }

    /// Adds a variable with its samples.
    ///
    /// Fails if the label is already taken, if there are no samples, or if the number of samples
    /// differs from the variables added before.
    pub fn add_variable<L: Into<String>>(
        &mut self,
        label: L,
        samples: Vec<S>,
    ) -> Result<&mut Self, Error> {
        let label = label.into();
        if self.index.contains_key(&label) {
            return Err(Error::DuplicateVariable(label));
        }
        if samples.is_empty() {
            return Err(Error::EmptyVariable(label));
        }
        if let Some(first) = self.variables.first() {
            if first.samples.len() != samples.len() {
                return Err(Error::RaggedDataset {
                    label,
                    expected: first.samples.len(),
                    got: samples.len(),
                });
            }
        }

        let counts = ValueCounts::tally(&samples);
        self.index.insert(label.clone(), self.variables.len());
        self.variables.push(Variable {
            label,
            samples,
            counts,
        });
        Ok(self)
    }

    /// The number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns `true` if the dataset has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The number of observations, which is the length of every variable's sample sequence.
    pub fn sample_count(&self) -> usize {
        self.variables.first().map_or(0, |v| v.samples.len())
    }

    /// Variable labels in insertion order.
    pub fn variables(&self) -> impl ExactSizeIterator<Item = &str> + Clone + '_ {
        self.variables.iter().map(|v| v.label.as_str())
    }

    /// Returns `true` if a variable with this label exists.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// The observed symbols for a variable.
    pub fn samples(&self, label: &str) -> Result<&[S], Error> {
        Ok(&self.variable(label)?.samples)
    }

    /// The value-count table for a variable.
    pub fn value_counts(&self, label: &str) -> Result<&ValueCounts<S>, Error> {
        Ok(&self.variable(label)?.counts)
    }

    fn variable(&self, label: &str) -> Result<&Variable<S>, Error> {
        self.index
            .get(label)
            .map(|&idx| &self.variables[idx])
            .ok_or_else(|| Error::UnknownVariable(label.to_owned()))
    }

    /// Every symbol that appears anywhere in the dataset, for any variable, in sorted order.
    ///
    /// ```
    /// use chow_liu::Dataset;
    ///
    /// let data = Dataset::from_columns(vec![
    ///     ("a", vec!["T", "C"]),
    ///     ("b", vec!["G", "C"]),
    /// ])?;
    /// assert_eq!(data.alphabet(), vec!["C", "G", "T"]);
    /// # Ok::<(), chow_liu::Error>(())
    /// ```
    pub fn alphabet(&self) -> Vec<S> {
        let mut symbols: Vec<&S> =
            multiway_union(self.variables.iter().map(|v| v.counts.symbols())).collect();
        symbols.dedup();
        symbols.into_iter().cloned().collect()
    }

    /// The fraction of samples of `var` that equal `value`.
    ///
    /// A value that never occurs has probability zero.
    pub fn marginal_probability(&self, var: &str, value: &S) -> Result<f64, Error> {
        let variable = self.variable(var)?;
        Ok(variable.counts.count(value) as f64 / variable.samples.len() as f64)
    }

    /// The fraction of observations where `var_a` equals `val_a` and `var_b` equals `val_b`.
    pub fn joint_probability(
        &self,
        var_a: &str,
        var_b: &str,
        val_a: &S,
        val_b: &S,
    ) -> Result<f64, Error> {
        let a = self.variable(var_a)?;
        let b = self.variable(var_b)?;
        let appearances = a
            .samples
            .iter()
            .zip(b.samples.iter())
            .filter(|(x, y)| *x == val_a && *y == val_b)
            .count();
        Ok(appearances as f64 / a.samples.len() as f64)
    }

    /// `P(var = val_var | parent = val_parent)`, or [`Estimate::Undefined`] if `val_parent` was
    /// never observed for `parent`.
    ///
    /// ```
    /// use chow_liu::{Dataset, Estimate};
    ///
    /// let data = Dataset::from_columns(vec![
    ///     ("0", vec!['A', 'A', 'A', 'G', 'A']),
    ///     ("1", vec!['A', 'A', 'A', 'C', 'C']),
    /// ])?;
    /// assert_eq!(data.try_conditional_probability("1", "0", &'C', &'G')?, Estimate::Defined(1.0));
    /// assert_eq!(data.try_conditional_probability("1", "0", &'C', &'T')?, Estimate::Undefined);
    /// # Ok::<(), chow_liu::Error>(())
    /// ```
    pub fn try_conditional_probability(
        &self,
        var: &str,
        parent: &str,
        val_var: &S,
        val_parent: &S,
    ) -> Result<Estimate, Error> {
        let joint = self.joint_probability(var, parent, val_var, val_parent)?;
        let marginal = self.marginal_probability(parent, val_parent)?;
        Ok(Estimate::ratio(joint, marginal))
    }

    /// Like [`try_conditional_probability`](Self::try_conditional_probability), but an undefined
    /// conditional probability is reported as `0.0`.
    pub fn conditional_probability(
        &self,
        var: &str,
        parent: &str,
        val_var: &S,
        val_parent: &S,
    ) -> Result<f64, Error> {
        Ok(self
            .try_conditional_probability(var, parent, val_var, val_parent)?
            .or_zero())
    }

    /// The marginal distribution of `var`, evaluated over the whole dataset's alphabet and keeping
    /// only the symbols with nonzero probability.
    pub fn probability_distribution(&self, var: &str) -> Result<Distribution<S>, Error> {
        let variable = self.variable(var)?;
        let total = variable.samples.len() as f64;
        let mut probabilities = BTreeMap::new();
        for symbol in self.alphabet() {
            let count = variable.counts.count(&symbol);
            if count != 0 {
                probabilities.insert(symbol, count as f64 / total);
            }
        }
        Ok(Distribution { probabilities })
    }
}

/// A discrete probability distribution, as an explicit mapping from symbol to probability.
///
/// Only symbols with nonzero probability are stored. Iteration is always in symbol order, so two
/// distributions over the same support line up entry by entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution<S: Symbol> {
    probabilities: BTreeMap<S, f64>,
}

impl<S: Symbol> Distribution<S> {
    /// The probability of `symbol`; zero if it isn't in the support.
    pub fn get(&self, symbol: &S) -> f64 {
        self.probabilities.get(symbol).copied().unwrap_or(0.0)
    }

    /// The number of symbols with nonzero probability.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Returns `true` if the support is empty.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Iterates over `(symbol, probability)` in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> + '_ {
        self.probabilities.iter().map(|(symbol, p)| (symbol, *p))
    }

    /// The probabilities alone, in symbol order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.probabilities.values().copied().collect()
    }

    /// Lines up this distribution with `other` over the union of both supports. Each entry is
    /// `(p, q)` for one symbol, with zero standing in for a symbol missing on one side.
    ///
    /// ```
    /// use chow_liu::Dataset;
    ///
    /// let data = Dataset::from_columns(vec![
    ///     ("a", vec!['x', 'x', 'y', 'y']),
    ///     ("b", vec!['y', 'z', 'z', 'z']),
    /// ])?;
    /// let a = data.probability_distribution("a")?;
    /// let b = data.probability_distribution("b")?;
    /// assert_eq!(a.align(&b), vec![(0.5, 0.0), (0.5, 0.25), (0.0, 0.75)]);
    /// # Ok::<(), chow_liu::Error>(())
    /// ```
    pub fn align(&self, other: &Self) -> Vec<(f64, f64)> {
        self.probabilities
            .iter()
            .assume_sorted_by_key()
            .outer_join(other.probabilities.iter().assume_sorted_by_key())
            .map(|(_, (p, q))| (p.copied().unwrap_or(0.0), q.copied().unwrap_or(0.0)))
            .collect()
    }
}

impl<S: Symbol> iter::FromIterator<(S, f64)> for Distribution<S> {
    /// Collects a distribution, dropping entries whose probability is zero.
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Distribution {
            probabilities: iter.into_iter().filter(|(_, p)| *p != 0.0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Dataset<char> {
        Dataset::from_columns(vec![
            ("0", "AAAGA".chars().collect()),
            ("1", "AAACC".chars().collect()),
            ("2", "CGGTT".chars().collect()),
            ("3", "CCCCC".chars().collect()),
        ])
        .unwrap()
    }

    #[test]
    fn counts_are_sorted() {
        let counts = ValueCounts::tally(&['T', 'A', 'G', 'A']);
        let pairs: Vec<_> = counts.iter().map(|(s, c)| (*s, c)).collect();
        assert_eq!(pairs, vec![('A', 2), ('G', 1), ('T', 1)]);
        assert_eq!(counts.count(&'C'), 0);
    }

    #[test]
    fn rejects_malformed_columns() {
        let mut data = toy();
        assert_eq!(
            data.add_variable("0", "AAAAA".chars().collect()).err(),
            Some(Error::DuplicateVariable("0".into()))
        );
        assert_eq!(
            data.add_variable("4", Vec::new()).err(),
            Some(Error::EmptyVariable("4".into()))
        );
        assert_eq!(
            data.add_variable("4", "AA".chars().collect()).err(),
            Some(Error::RaggedDataset {
                label: "4".into(),
                expected: 5,
                got: 2
            })
        );
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn unknown_variable() {
        let data = toy();
        assert_eq!(
            data.marginal_probability("9", &'A'),
            Err(Error::UnknownVariable("9".into()))
        );
    }

    #[test]
    fn alphabet_is_global() {
        assert_eq!(toy().alphabet(), vec!['A', 'C', 'G', 'T']);
    }

    #[test]
    fn distribution_skips_unobserved_symbols() {
        let data = toy();
        let dist = data.probability_distribution("2").unwrap();
        assert_eq!(dist.probabilities(), vec![0.2, 0.4, 0.4]);
        assert_eq!(dist.get(&'A'), 0.0);
        let constant = data.probability_distribution("3").unwrap();
        assert_eq!(constant.probabilities(), vec![1.0]);
    }

    #[test]
    fn conditional_masks_unseen_parent() {
        let data = toy();
        let p = data.conditional_probability("1", "0", &'A', &'A').unwrap();
        assert!((p - 0.75).abs() < 1e-12);
        assert_eq!(data.conditional_probability("1", "0", &'A', &'T').unwrap(), 0.0);
    }
}
