//! Divergence and similarity scores between probability vectors and between fitted models.
//!
//! The model-level scores report similarity as `1 - divergence`, averaged over variables, so `1.0`
//! means "indistinguishable". None of them are clamped: a large divergence or a mutual information
//! difference above one gives a negative score.

use crate::dataset::Dataset;
use crate::error::{Error, Estimate};
use crate::model::ChowLiuModel;
use crate::Symbol;
use statrs::statistics::Statistics;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

fn check_dimensions(p: &[f64], q: &[f64]) -> Result<(), Error> {
    if p.len() != q.len() {
        return Err(Error::DimensionMismatch {
            expected: p.len(),
            got: q.len(),
        });
    }
    Ok(())
}

fn kl_term(p: f64, q: f64) -> Estimate {
    if p == 0.0 {
        Estimate::Defined(0.0)
    } else if q == 0.0 {
        Estimate::Undefined
    } else {
        Estimate::Defined(p * (p / q).log2())
    }
}

fn midpoint(p: &[f64], q: &[f64]) -> Vec<f64> {
    p.iter().zip(q.iter()).map(|(p, q)| 0.5 * (p + q)).collect()
}

/// The Kullback-Leibler divergence `sum(p_i * log2(p_i / q_i))`, in bits.
///
/// Inputs of different lengths give `0.0`, and so does every term where `q_i` is zero. Those
/// zeroes are indistinguishable from real ones; use [`try_kl_divergence`] to tell them apart.
///
/// ```
/// use chow_liu::divergence::kl_divergence;
///
/// assert_eq!(kl_divergence(&[0.5, 0.5], &[0.5, 0.5]), 0.0);
/// assert_eq!(kl_divergence(&[1.0, 0.0], &[0.5, 0.5]), 1.0);
/// assert_eq!(kl_divergence(&[1.0], &[0.5, 0.5]), 0.0);
/// ```
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    if p.len() != q.len() {
        return 0.0;
    }
    p.iter()
        .zip(q.iter())
        .map(|(&p, &q)| kl_term(p, q).or_zero())
        .sum()
}

/// The Kullback-Leibler divergence, failing on inputs of different lengths and undefined when some
/// `q_i` is zero while `p_i` is not.
///
/// ```
/// use chow_liu::divergence::try_kl_divergence;
/// use chow_liu::{Error, Estimate};
///
/// assert_eq!(try_kl_divergence(&[0.5, 0.5], &[1.0, 0.0]), Ok(Estimate::Undefined));
/// assert_eq!(
///     try_kl_divergence(&[1.0], &[0.5, 0.5]),
///     Err(Error::DimensionMismatch { expected: 1, got: 2 })
/// );
/// ```
pub fn try_kl_divergence(p: &[f64], q: &[f64]) -> Result<Estimate, Error> {
    check_dimensions(p, q)?;
    let mut total = 0.0;
    for (&p, &q) in p.iter().zip(q.iter()) {
        match kl_term(p, q) {
            Estimate::Defined(term) => total += term,
            Estimate::Undefined => return Ok(Estimate::Undefined),
        }
    }
    Ok(Estimate::Defined(total))
}

/// The Jensen-Shannon divergence `KLD(p, m) / 2 + KLD(q, m) / 2` with `m = (p + q) / 2`.
///
/// Symmetric, and at most one bit for probability vectors. Inputs of different lengths give
/// `0.0`.
pub fn jensen_shannon_divergence(p: &[f64], q: &[f64]) -> f64 {
    if p.len() != q.len() {
        return 0.0;
    }
    let m = midpoint(p, q);
    0.5 * kl_divergence(p, &m) + 0.5 * kl_divergence(q, &m)
}

/// The Jensen-Shannon divergence, failing on inputs of different lengths.
///
/// The midpoint is nonzero wherever `p` or `q` is, so the result is always defined.
pub fn try_jensen_shannon_divergence(p: &[f64], q: &[f64]) -> Result<Estimate, Error> {
    check_dimensions(p, q)?;
    let m = midpoint(p, q);
    let left = try_kl_divergence(p, &m)?;
    let right = try_kl_divergence(q, &m)?;
    Ok(match (left, right) {
        (Estimate::Defined(left), Estimate::Defined(right)) => {
            Estimate::Defined(0.5 * left + 0.5 * right)
        }
        _ => Estimate::Undefined,
    })
}

/// The mean of `1 - |p_i - q_i|`.
///
/// ```
/// use chow_liu::divergence::similarity;
///
/// assert_eq!(similarity(&[0.0, 1.0], &[0.5, 1.0]), Ok(0.75));
/// // Differences above one are not clamped.
/// assert_eq!(similarity(&[3.0], &[0.0]), Ok(-2.0));
/// ```
pub fn similarity(p: &[f64], q: &[f64]) -> Result<f64, Error> {
    check_dimensions(p, q)?;
    if p.is_empty() {
        return Err(Error::NoComparisons);
    }
    Ok(p.iter()
        .zip(q.iter())
        .map(|(p, q)| 1.0 - (p - q).abs())
        .mean())
}

/// Selects the score computed by [`Comparison::divergence`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Metric {
    /// `kld`: Kullback-Leibler divergence of each variable's marginal distribution.
    KullbackLeibler,
    /// `jsd`: Jensen-Shannon divergence of each variable's marginal distribution.
    JensenShannon,
    /// `mid`: similarity of the two models' mutual information vectors; the per-variable
    /// distributions are ignored.
    MutualInformation,
}

impl Metric {
    /// Every metric, in the order `kld`, `jsd`, `mid`.
    pub const ALL: [Metric; 3] = [
        Metric::KullbackLeibler,
        Metric::JensenShannon,
        Metric::MutualInformation,
    ];

    /// The short selector name.
    pub fn name(self) -> &'static str {
        match self {
            Metric::KullbackLeibler => "kld",
            Metric::JensenShannon => "jsd",
            Metric::MutualInformation => "mid",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kld" => Ok(Metric::KullbackLeibler),
            "jsd" => Ok(Metric::JensenShannon),
            "mid" => Ok(Metric::MutualInformation),
            _ => Err(Error::UnsupportedMetric(s.to_owned())),
        }
    }
}

/// What to do when a ratio has a zero denominator.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ZeroPolicy {
    /// Treat the undefined value as zero. Distributions are compared position by position in
    /// symbol order, and distributions of different sizes count as zero divergence.
    #[default]
    Mask,
    /// Report [`Estimate::Undefined`]. Distributions are aligned symbol by symbol first.
    Strict,
}

impl FromStr for ZeroPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mask" => Ok(ZeroPolicy::Mask),
            "strict" => Ok(ZeroPolicy::Strict),
            _ => Err(Error::UnsupportedPolicy(s.to_owned())),
        }
    }
}

/// A single conditional probability query, `P(variable = value | parent = parent_value)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalQuery<S: Symbol> {
    /// The variable being predicted.
    pub variable: String,
    /// The variable conditioned on.
    pub parent: String,
    /// The predicted symbol.
    pub value: S,
    /// The symbol the parent is fixed to.
    pub parent_value: S,
}

/// Every query pairing a variable with the one sorted just before it, for every combination of
/// symbols in the dataset's alphabet.
///
/// The pairs come from sorting the labels as strings; they need not be edges of any tree.
pub fn consecutive_queries<S: Symbol>(dataset: &Dataset<S>) -> Vec<ConditionalQuery<S>> {
    let mut labels: Vec<&str> = dataset.variables().collect();
    labels.sort_unstable();
    let alphabet = dataset.alphabet();

    let mut queries = Vec::new();
    for pair in labels.windows(2) {
        let (parent, variable) = (pair[0], pair[1]);
        for value in alphabet.iter() {
            for parent_value in alphabet.iter() {
                queries.push(ConditionalQuery {
                    variable: variable.to_owned(),
                    parent: parent.to_owned(),
                    value: value.clone(),
                    parent_value: parent_value.clone(),
                });
            }
        }
    }
    queries
}

/// Compares two fitted models.
///
/// The left model decides which variables and symbols are examined; the right model must contain
/// every variable of the left one.
///
/// ```
/// use chow_liu::{ChowLiuModel, Comparison, Dataset, Estimate, Metric};
///
/// let data = Dataset::from_columns(vec![
///     ("0", vec!['A', 'A', 'G', 'A']),
///     ("1", vec!['A', 'C', 'C', 'C']),
/// ])?;
/// let left = ChowLiuModel::fit(data.clone())?;
/// let right = ChowLiuModel::fit(data)?;
///
/// let same = Comparison::new(&left, &right);
/// assert_eq!(same.divergence(Metric::KullbackLeibler)?, Estimate::Defined(1.0));
/// assert_eq!(same.divergence(Metric::MutualInformation)?, Estimate::Defined(1.0));
/// assert_eq!(same.conditional_queries()?, Estimate::Defined(1.0));
/// # Ok::<(), chow_liu::Error>(())
/// ```
#[derive(Debug)]
pub struct Comparison<'a, S: Symbol> {
    left: &'a ChowLiuModel<S>,
    right: &'a ChowLiuModel<S>,
    policy: ZeroPolicy,
}

impl<S: Symbol> Clone for Comparison<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Symbol> Copy for Comparison<'_, S> {}

impl<'a, S: Symbol> Comparison<'a, S> {
    /// Compares two models, masking undefined values as zero.
    pub fn new(left: &'a ChowLiuModel<S>, right: &'a ChowLiuModel<S>) -> Self {
        Comparison {
            left,
            right,
            policy: ZeroPolicy::default(),
        }
    }

    /// Uses the given policy for undefined values.
    pub fn with_policy(mut self, policy: ZeroPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for `with_policy(ZeroPolicy::Strict)`.
    pub fn strict(self) -> Self {
        self.with_policy(ZeroPolicy::Strict)
    }

    /// The policy in effect.
    pub fn policy(&self) -> ZeroPolicy {
        self.policy
    }

    /// The average of `1 - divergence` over the left model's variables, or the mutual information
    /// similarity for [`Metric::MutualInformation`].
    ///
    /// Under [`ZeroPolicy::Strict`] a single undefined per-variable divergence makes the whole
    /// result undefined.
    pub fn divergence(&self, metric: Metric) -> Result<Estimate, Error> {
        let mut similarities = Vec::new();
        for var in self.left.dataset().variables() {
            let p = self.left.probability_distribution(var)?;
            let q = self.right.probability_distribution(var)?;

            let divergence = match (metric, self.policy) {
                (Metric::MutualInformation, _) => {
                    return self.mutual_information_similarity().map(Estimate::Defined);
                }
                (Metric::KullbackLeibler, ZeroPolicy::Mask) => Estimate::Defined(kl_divergence(
                    &p.probabilities(),
                    &q.probabilities(),
                )),
                (Metric::JensenShannon, ZeroPolicy::Mask) => Estimate::Defined(
                    jensen_shannon_divergence(&p.probabilities(), &q.probabilities()),
                ),
                (Metric::KullbackLeibler, ZeroPolicy::Strict) => {
                    let (p, q): (Vec<f64>, Vec<f64>) = p.align(&q).into_iter().unzip();
                    try_kl_divergence(&p, &q)?
                }
                (Metric::JensenShannon, ZeroPolicy::Strict) => {
                    let (p, q): (Vec<f64>, Vec<f64>) = p.align(&q).into_iter().unzip();
                    try_jensen_shannon_divergence(&p, &q)?
                }
            };

            match divergence {
                Estimate::Defined(divergence) => similarities.push(1.0 - divergence),
                Estimate::Undefined => {
                    debug!("{} of {} is undefined", metric, var);
                    return Ok(Estimate::Undefined);
                }
            }
        }

        if similarities.is_empty() {
            return Err(Error::NoComparisons);
        }
        Ok(Estimate::Defined(similarities.mean()))
    }

    /// The similarity of the two models' mutual information vectors, compared position by
    /// position.
    pub fn mutual_information_similarity(&self) -> Result<f64, Error> {
        similarity(
            self.left.mi_vector().as_slice(),
            self.right.mi_vector().as_slice(),
        )
    }

    /// Runs [`consecutive_queries`] over the left model's dataset on both models and reports
    /// the similarity of the answers.
    pub fn conditional_queries(&self) -> Result<Estimate, Error> {
        self.conditional_queries_for(&consecutive_queries(self.left.dataset()))
    }

    /// Runs the given queries on both models and reports the similarity of the answers.
    ///
    /// Under [`ZeroPolicy::Strict`] only queries answerable by both models are compared, and the
    /// result is undefined if there are none.
    pub fn conditional_queries_for(
        &self,
        queries: &[ConditionalQuery<S>],
    ) -> Result<Estimate, Error> {
        if queries.is_empty() {
            return Err(Error::NoComparisons);
        }

        let mut left = Vec::with_capacity(queries.len());
        let mut right = Vec::with_capacity(queries.len());
        for query in queries {
            let l = self.left.try_conditional_probability(
                &query.variable,
                &query.parent,
                &query.value,
                &query.parent_value,
            )?;
            let r = self.right.try_conditional_probability(
                &query.variable,
                &query.parent,
                &query.value,
                &query.parent_value,
            )?;
            match self.policy {
                ZeroPolicy::Mask => {
                    left.push(l.or_zero());
                    right.push(r.or_zero());
                }
                ZeroPolicy::Strict => {
                    if let (Estimate::Defined(l), Estimate::Defined(r)) = (l, r) {
                        left.push(l);
                        right.push(r);
                    }
                }
            }
        }

        if left.is_empty() {
            return Ok(Estimate::Undefined);
        }
        debug!(
            "compared {} of {} conditional queries",
            left.len(),
            queries.len()
        );
        similarity(&left, &right).map(Estimate::Defined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(columns: Vec<(&str, &str)>) -> ChowLiuModel<char> {
        let data =
            Dataset::from_columns(columns.into_iter().map(|(l, s)| (l, s.chars().collect())))
                .unwrap();
        ChowLiuModel::fit(data).unwrap()
    }

    #[test]
    fn parses_metric_names() {
        for metric in Metric::ALL.iter() {
            assert_eq!(metric.name().parse::<Metric>(), Ok(*metric));
        }
        assert_eq!(
            "hellinger".parse::<Metric>(),
            Err(Error::UnsupportedMetric("hellinger".into()))
        );
    }

    #[test]
    fn jensen_shannon_is_symmetric_and_bounded() {
        let p = [0.9, 0.1];
        let q = [0.2, 0.8];
        let pq = jensen_shannon_divergence(&p, &q);
        let qp = jensen_shannon_divergence(&q, &p);
        assert!((pq - qp).abs() < 1e-12);
        assert!(pq > 0.0 && pq <= 1.0);
        assert_eq!(jensen_shannon_divergence(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
    }

    #[test]
    fn masked_kl_hides_zero_denominators() {
        assert_eq!(kl_divergence(&[0.5, 0.5], &[1.0, 0.0]), -0.5);
    }

    #[test]
    fn mask_compares_by_position_strict_aligns() {
        // Same shape, different symbols.
        let left = model(vec![("0", "AAAC")]);
        let right = model(vec![("0", "GGGT")]);

        let masked = Comparison::new(&left, &right);
        assert_eq!(
            masked.divergence(Metric::KullbackLeibler),
            Ok(Estimate::Defined(1.0))
        );

        let strict = masked.strict();
        assert_eq!(
            strict.divergence(Metric::KullbackLeibler),
            Ok(Estimate::Undefined)
        );
        assert_eq!(
            strict.divergence(Metric::JensenShannon),
            Ok(Estimate::Defined(0.0))
        );
    }

    #[test]
    fn mismatched_support_size_is_a_masked_zero() {
        let left = model(vec![("0", "AAAC")]);
        let right = model(vec![("0", "AAAA")]);
        let masked = Comparison::new(&left, &right);
        assert_eq!(
            masked.divergence(Metric::JensenShannon),
            Ok(Estimate::Defined(1.0))
        );
    }

    #[test]
    fn missing_variable_on_the_right() {
        let left = model(vec![("0", "AC"), ("1", "AC")]);
        let right = model(vec![("0", "AC"), ("2", "AC")]);
        assert_eq!(
            Comparison::new(&left, &right).divergence(Metric::JensenShannon),
            Err(Error::UnknownVariable("1".into()))
        );
    }

    #[test]
    fn mutual_information_vectors_must_line_up() {
        let left = model(vec![("0", "AC"), ("1", "AC")]);
        let right = model(vec![("0", "AC"), ("1", "AC"), ("2", "AC")]);
        assert_eq!(
            Comparison::new(&left, &right).divergence(Metric::MutualInformation),
            Err(Error::DimensionMismatch {
                expected: 1,
                got: 3
            })
        );
    }

    #[test]
    fn consecutive_queries_sort_labels_as_strings() {
        let data = Dataset::from_columns(vec![
            ("2", vec!['x']),
            ("10", vec!['y']),
            ("1", vec!['x']),
        ])
        .unwrap();
        let pairs: Vec<_> = consecutive_queries(&data)
            .into_iter()
            .map(|q| (q.parent, q.variable))
            .collect();
        // Two labels pairs, four symbol combinations each.
        assert_eq!(pairs.len(), 8);
        assert_eq!(pairs[0], ("1".to_string(), "10".to_string()));
        assert_eq!(pairs[4], ("10".to_string(), "2".to_string()));
    }

    #[test]
    fn strict_queries_skip_unseen_parents() {
        let left = model(vec![("0", "AAGG"), ("1", "ACAC")]);
        let right = model(vec![("0", "AAAA"), ("1", "ACAC")]);

        // Alphabet is {A, C, G}; only parent value A is seen on both sides, and there the
        // answers agree.
        let strict = Comparison::new(&left, &right).strict();
        assert_eq!(strict.conditional_queries(), Ok(Estimate::Defined(1.0)));

        let masked = Comparison::new(&left, &right);
        let score = masked.conditional_queries().unwrap().or_zero();
        assert!(score < 1.0);
    }

    #[test]
    fn strict_queries_with_no_support_are_undefined() {
        let left = model(vec![("0", "AA"), ("1", "AA")]);
        let right = model(vec![("0", "AA"), ("1", "AA")]);
        let query = ConditionalQuery {
            variable: "1".to_string(),
            parent: "0".to_string(),
            value: 'A',
            parent_value: 'Z',
        };
        let strict = Comparison::new(&left, &right).strict();
        assert_eq!(
            strict.conditional_queries_for(&[query.clone()]),
            Ok(Estimate::Undefined)
        );
        let masked = Comparison::new(&left, &right);
        assert_eq!(
            masked.conditional_queries_for(&[query]),
            Ok(Estimate::Defined(1.0))
        );
    }
}
