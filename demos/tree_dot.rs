use chow_liu::{ChowLiuModel, Dataset, TreeStrategy};
use petgraph::dot::Dot;

fn main() -> Result<(), chow_liu::Error> {
    let strategy = std::env::args()
        .nth(1)
        .map(|s| s.parse::<TreeStrategy>())
        .transpose()?
        .unwrap_or_default();

    let data = Dataset::from_columns(vec![
        ("0", "AAAGA".chars().collect()),
        ("1", "AAACC".chars().collect()),
        ("2", "CGGTT".chars().collect()),
        ("3", "CCCCC".chars().collect()),
    ])?;
    let model: ChowLiuModel<char> = ChowLiuModel::fit_with(data, strategy)?;

    eprintln!(
        "{:?}: {} nodes, {} edges",
        model.strategy(),
        model.tree().node_count(),
        model.tree().edge_count()
    );
    println!("{}", Dot::new(model.tree().graph()));

    if strategy == TreeStrategy::GreedyInsertionOrder {
        eprintln!("pass \"spanning\" to use the maximum-weight spanning tree instead");
    }
    Ok(())
}
