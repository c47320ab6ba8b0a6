use chow_liu::divergence::{jensen_shannon_divergence, kl_divergence};
use chow_liu::{ChowLiuModel, ChowLiuTree, Comparison, Dataset, Estimate, Metric, TreeStrategy};
use petgraph::Direction;
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

fn datasets() -> impl Strategy<Value = Dataset<char>> {
    (2usize..6, 1usize..25)
        .prop_flat_map(|(variables, samples)| {
            let symbol = prop::sample::select(vec!['A', 'C', 'G', 'T']);
            prop::collection::vec(prop::collection::vec(symbol, samples), variables)
        })
        .prop_map(|columns| {
            Dataset::from_columns(
                columns
                    .into_iter()
                    .enumerate()
                    .map(|(i, samples)| (i.to_string(), samples)),
            )
            .unwrap()
        })
}

fn at_most_one_parent(tree: &ChowLiuTree) -> bool {
    let graph = tree.graph();
    graph
        .node_indices()
        .all(|node| graph.neighbors_directed(node, Direction::Incoming).count() <= 1)
}

proptest! {
    #[test]
    fn marginals_sum_to_one(data in datasets()) {
        for var in data.variables() {
            let counts = data.value_counts(var).unwrap();
            let total: f64 = counts
                .symbols()
                .map(|x| data.marginal_probability(var, x).unwrap())
                .sum();
            prop_assert!((total - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn joints_sum_to_one(data in datasets()) {
        let alphabet = data.alphabet();
        let labels: Vec<&str> = data.variables().collect();
        for a in labels.iter() {
            for b in labels.iter() {
                let mut total = 0.0;
                for x in alphabet.iter() {
                    for y in alphabet.iter() {
                        total += data.joint_probability(a, b, x, y).unwrap();
                    }
                }
                prop_assert!((total - 1.0).abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn conditional_is_joint_over_marginal(data in datasets()) {
        let alphabet = data.alphabet();
        let labels: Vec<&str> = data.variables().collect();
        let (var, parent) = (labels[0], labels[1]);
        for x in alphabet.iter() {
            for y in alphabet.iter() {
                let marginal = data.marginal_probability(parent, y).unwrap();
                let joint = data.joint_probability(var, parent, x, y).unwrap();
                match data.try_conditional_probability(var, parent, x, y).unwrap() {
                    Estimate::Defined(conditional) => {
                        prop_assert!((conditional * marginal - joint).abs() < TOLERANCE);
                    }
                    Estimate::Undefined => {
                        prop_assert_eq!(marginal, 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn mutual_information_is_symmetric_and_nonnegative(data in datasets()) {
        let labels: Vec<&str> = data.variables().collect();
        for a in labels.iter() {
            for b in labels.iter() {
                let ab = data.mutual_information(a, b).unwrap();
                let ba = data.mutual_information(b, a).unwrap();
                prop_assert!((ab - ba).abs() < TOLERANCE);
                prop_assert!(ab > -TOLERANCE);
            }
        }
    }

    #[test]
    fn divergence_from_itself_is_zero(data in datasets()) {
        for var in data.variables() {
            let p = data.probability_distribution(var).unwrap().probabilities();
            prop_assert!(kl_divergence(&p, &p).abs() < TOLERANCE);
            prop_assert!(jensen_shannon_divergence(&p, &p).abs() < TOLERANCE);
        }
    }

    #[test]
    fn spanning_tree_covers_every_variable(data in datasets()) {
        let n = data.len();
        let strategy = TreeStrategy::MaximumWeightSpanningTree;
        let model = ChowLiuModel::fit_with(data, strategy).unwrap();
        let tree = model.tree();
        prop_assert_eq!(tree.node_count(), n);
        prop_assert_eq!(tree.edge_count(), n - 1);
        prop_assert_eq!(tree.roots().len(), 1);
        prop_assert!(at_most_one_parent(tree));
        prop_assert!(tree.is_acyclic());
    }

    #[test]
    fn greedy_tree_is_a_forest(data in datasets()) {
        let n = data.len();
        let model = ChowLiuModel::fit(data).unwrap();
        let tree = model.tree();
        prop_assert_eq!(tree.node_count(), n);
        prop_assert!(tree.edge_count() < n);
        prop_assert_eq!(tree.edge_count() + tree.roots().len(), n);
        prop_assert!(at_most_one_parent(tree));
        prop_assert!(tree.is_acyclic());
    }

    #[test]
    fn edge_weights_are_negated_mutual_information(data in datasets()) {
        let model = ChowLiuModel::fit(data).unwrap();
        for (parent, child, weight) in model.tree().edges() {
            let mi = model.dataset().mutual_information(parent, child).unwrap();
            prop_assert!((weight + mi).abs() < TOLERANCE);
        }
    }

    #[test]
    fn a_model_matches_itself(data in datasets()) {
        let model = ChowLiuModel::fit(data).unwrap();
        let comparison = Comparison::new(&model, &model);
        for metric in Metric::ALL.iter() {
            prop_assert_eq!(comparison.divergence(*metric).unwrap(), Estimate::Defined(1.0));
        }
        prop_assert_eq!(comparison.conditional_queries().unwrap(), Estimate::Defined(1.0));
    }
}
