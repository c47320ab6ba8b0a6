//! A dataset together with the tree fitted to it.

use crate::dataset::{Dataset, Distribution};
use crate::error::{Error, Estimate};
use crate::information::{MiEdge, MiVector};
use crate::tree::{ChowLiuTree, TreeStrategy};
use crate::Symbol;
use tracing::debug;

/// A fitted Chow-Liu model: the dataset, its tree, and the log of every mutual information value
/// computed through the model.
///
/// ```
/// use chow_liu::ChowLiuModel;
/// use chow_liu::Dataset;
///
/// let data = Dataset::from_columns(vec![
///     ("0", vec!['A', 'A', 'A', 'G', 'A']),
///     ("1", vec!['A', 'A', 'A', 'C', 'C']),
///     ("2", vec!['C', 'G', 'G', 'T', 'T']),
///     ("3", vec!['C', 'C', 'C', 'C', 'C']),
/// ])?;
/// let mut model = ChowLiuModel::fit(data)?;
/// assert_eq!(model.tree().edge_count(), 3);
/// assert_eq!(model.mi_vector().len(), 6);
///
/// // Ad-hoc queries are logged too.
/// model.mutual_information("0", "1")?;
/// assert_eq!(model.mi_vector().len(), 7);
/// # Ok::<(), chow_liu::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct ChowLiuModel<S: Symbol> {
    dataset: Dataset<S>,
    tree: ChowLiuTree,
    mi_vector: MiVector,
    strategy: TreeStrategy,
}

impl<S: Symbol> ChowLiuModel<S> {
    /// Fits a model using [`TreeStrategy::GreedyInsertionOrder`].
    pub fn fit(dataset: Dataset<S>) -> Result<Self, Error> {
        ChowLiuModel::fit_with(dataset, TreeStrategy::default())
    }

    /// Fits a model using the given tree strategy.
    pub fn fit_with(dataset: Dataset<S>, strategy: TreeStrategy) -> Result<Self, Error> {
        let mut model = ChowLiuModel {
            dataset,
            tree: ChowLiuTree::default(),
            mi_vector: MiVector::new(),
            strategy,
        };
        model.build()?;
        debug!(
            "fitted model over {} variables and {} samples",
            model.dataset.len(),
            model.dataset.sample_count()
        );
        Ok(model)
    }

    /// Recomputes the pairwise mutual information and rebuilds the tree from it.
    ///
    /// Every value computed along the way is appended to the model's [`MiVector`].
    pub fn build(&mut self) -> Result<&ChowLiuTree, Error> {
        let edges = self.calculate_mutual_information()?;
        self.tree = self.strategy.build(&edges);
        Ok(&self.tree)
    }

    /// The data the model was fitted to.
    pub fn dataset(&self) -> &Dataset<S> {
        &self.dataset
    }

    /// The fitted tree.
    pub fn tree(&self) -> &ChowLiuTree {
        &self.tree
    }

    /// Every mutual information value computed through this model, oldest first.
    pub fn mi_vector(&self) -> &MiVector {
        &self.mi_vector
    }

    /// The strategy used by [`build`](Self::build).
    pub fn strategy(&self) -> TreeStrategy {
        self.strategy
    }

    /// See [`Dataset::marginal_probability`].
    pub fn marginal_probability(&self, var: &str, value: &S) -> Result<f64, Error> {
        self.dataset.marginal_probability(var, value)
    }

    /// See [`Dataset::joint_probability`].
    pub fn joint_probability(
        &self,
        var_a: &str,
        var_b: &str,
        val_a: &S,
        val_b: &S,
    ) -> Result<f64, Error> {
        self.dataset.joint_probability(var_a, var_b, val_a, val_b)
    }

    /// See [`Dataset::conditional_probability`].
    pub fn conditional_probability(
        &self,
        var: &str,
        parent: &str,
        val_var: &S,
        val_parent: &S,
    ) -> Result<f64, Error> {
        self.dataset
            .conditional_probability(var, parent, val_var, val_parent)
    }

    /// See [`Dataset::try_conditional_probability`].
    pub fn try_conditional_probability(
        &self,
        var: &str,
        parent: &str,
        val_var: &S,
        val_parent: &S,
    ) -> Result<Estimate, Error> {
        self.dataset
            .try_conditional_probability(var, parent, val_var, val_parent)
    }

    /// See [`Dataset::probability_distribution`].
    pub fn probability_distribution(&self, var: &str) -> Result<Distribution<S>, Error> {
        self.dataset.probability_distribution(var)
    }

    /// Computes the mutual information of two variables and appends it to the model's
    /// [`MiVector`].
    pub fn mutual_information(&mut self, var_a: &str, var_b: &str) -> Result<f64, Error> {
        let mi = self.dataset.mutual_information(var_a, var_b)?;
        self.mi_vector.record(mi);
        Ok(mi)
    }

    /// Computes the mutual information of every pair of variables, appending each value to the
    /// model's [`MiVector`].
    pub fn calculate_mutual_information(&mut self) -> Result<Vec<MiEdge>, Error> {
        let edges = self.dataset.calculate_mutual_information()?;
        self.mi_vector.record_edges(&edges);
        Ok(edges)
    }
}
