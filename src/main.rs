use chow_liu::{
    ChowLiuModel, Comparison, Dataset, Estimate, Metric, Symbol, TreeStrategy, ZeroPolicy,
};
use clap::Parser;
use csv_core::{ReadFieldResult, ReaderBuilder};
use lasso::{Rodeo, Spur};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::str;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fit Chow-Liu trees to categorical data, and optionally compare two datasets.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Delimited file with one observation per line and one variable per column
    data: PathBuf,

    /// A second file, with the same columns, to compare against the first
    compare: Option<PathBuf>,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Take variable labels from the first line instead of numbering columns from 0
    #[arg(long)]
    header: bool,

    /// How to assemble the tree: "greedy" or "spanning"
    #[arg(short, long, default_value = "greedy")]
    strategy: TreeStrategy,

    /// Report undefined scores instead of counting them as zero
    #[arg(long)]
    strict: bool,
}

fn invalid_data<E: Into<Box<dyn Error + Send + Sync>>>(error: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error)
}

fn load_data<I: io::Read>(
    mut input: I,
    delimiter: u8,
    header: bool,
    rodeo: &mut Rodeo<Spur>,
) -> io::Result<Dataset<Spur>> {
    let mut inputbuf = [0; 16384];
    let mut fieldbuf = [0; 1024];
    let mut fieldlen = 0;
    let mut record = Vec::new();
    let mut labels: Option<Vec<String>> = None;
    let mut columns: Vec<Vec<Spur>> = Vec::new();
    let mut reader = ReaderBuilder::new().delimiter(delimiter).build();

    loop {
        let read = input.read(&mut inputbuf)?;
        let mut bytes = &inputbuf[..read];
        loop {
            let (result, nin, nout) = reader.read_field(bytes, &mut fieldbuf[fieldlen..]);
            bytes = &bytes[nin..];
            fieldlen += nout;
            match result {
                ReadFieldResult::InputEmpty => break,
                ReadFieldResult::OutputFull => {
                    return Err(invalid_data(format!(
                        "field too long on line {}",
                        reader.line()
                    )));
                }
                ReadFieldResult::Field { record_end } => {
                    let field = str::from_utf8(&fieldbuf[..fieldlen]).map_err(invalid_data)?;
                    record.push(field.trim().to_owned());
                    fieldlen = 0;

                    if !record_end {
                        continue;
                    }

                    // A blank line reads as a single empty field.
                    let blank = record.len() == 1 && record[0].is_empty();
                    if header && labels.is_none() && !blank {
                        labels = Some(record.clone());
                    } else if !blank {
                        if columns.is_empty() {
                            columns.resize_with(record.len(), Vec::new);
                        }
                        if record.len() != columns.len() {
                            return Err(invalid_data(format!(
                                "line {} has {} fields, expected {}",
                                reader.line(),
                                record.len(),
                                columns.len()
                            )));
                        }
                        for (column, field) in columns.iter_mut().zip(record.iter()) {
                            column.push(rodeo.get_or_intern(field));
                        }
                    }
                    record.clear();
                }
                ReadFieldResult::End => {
                    let labels = labels
                        .unwrap_or_else(|| (0..columns.len()).map(|i| i.to_string()).collect());
                    if labels.len() != columns.len() && !columns.is_empty() {
                        return Err(invalid_data(format!(
                            "{} labels for {} columns",
                            labels.len(),
                            columns.len()
                        )));
                    }
                    return Dataset::from_columns(labels.into_iter().zip(columns))
                        .map_err(invalid_data);
                }
            }
        }
    }
}

fn print_model<S: Symbol>(model: &ChowLiuModel<S>) {
    println!("  tree:");
    for (parent, child, weight) in model.tree().edges() {
        println!("    {} -> {} (mutual information {:.5})", parent, child, -weight);
    }
    println!("  roots: {:?}", model.tree().roots());
    println!("  mutual information: {:?}", model.mi_vector().as_slice());
}

fn report(name: &str, estimate: Estimate) {
    match estimate.value() {
        Some(similarity) => println!("  {}: {:.5}%", name, 100.0 * similarity),
        None => println!("  {}: undefined", name),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if !args.delimiter.is_ascii() {
        return Err("the delimiter must be a single ASCII character".into());
    }
    let delimiter = args.delimiter as u8;
    let policy = if args.strict {
        ZeroPolicy::Strict
    } else {
        ZeroPolicy::Mask
    };

    // One interner for both files, so equal symbols get equal keys and sort the same way.
    let mut rodeo: Rodeo<Spur> = Rodeo::new();

    let data = load_data(File::open(&args.data)?, delimiter, args.header, &mut rodeo)?;
    info!(
        "read {} variables with {} samples from {}",
        data.len(),
        data.sample_count(),
        args.data.display()
    );
    let model = ChowLiuModel::fit_with(data, args.strategy)?;
    println!("{}:", args.data.display());
    print_model(&model);

    if let Some(path) = &args.compare {
        let data = load_data(File::open(path)?, delimiter, args.header, &mut rodeo)?;
        info!(
            "read {} variables with {} samples from {}",
            data.len(),
            data.sample_count(),
            path.display()
        );
        let other = ChowLiuModel::fit_with(data, args.strategy)?;
        println!();
        println!("{}:", path.display());
        print_model(&other);

        let comparison = Comparison::new(&model, &other).with_policy(policy);
        println!();
        println!("similarity:");
        for metric in Metric::ALL.iter() {
            report(metric.name(), comparison.divergence(*metric)?);
        }
        report("inference", comparison.conditional_queries()?);
    }

    Ok(())
}
