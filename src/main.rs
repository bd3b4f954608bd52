//! Pipeline runner: load tables, build, train, predict, write submission.
//!
//! Usage:
//!   cargo run --release -- \
//!     --x-train data/05_model_input/x_train.csv \
//!     --y-train data/05_model_input/y_train.csv \
//!     --x-test data/05_model_input/x_test.csv \
//!     --sample-submission data/01_raw/sample_submission.csv \
//!     --params conf/parameters.yml \
//!     --output data/08_reporting/submission.csv

use clap::Parser;
use har_pipeline::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "har-pipeline", about = "HAR classifier training pipeline")]
struct Cli {
    /// Training feature table (headered CSV, numeric columns).
    #[arg(long)]
    x_train: PathBuf,

    /// Training label column (headered CSV of integer class ids).
    #[arg(long)]
    y_train: PathBuf,

    /// Inference feature table (headered CSV carrying the id column).
    #[arg(long)]
    x_test: PathBuf,

    /// Sample submission template (header-less CSV).
    #[arg(long)]
    sample_submission: PathBuf,

    /// Hyperparameter YAML file.
    #[arg(long, default_value = "conf/parameters.yml")]
    params: PathBuf,

    /// Destination for the filled submission.
    #[arg(long, default_value = "data/08_reporting/submission.csv")]
    output: PathBuf,

    /// Name of the identifier column in the inference table.
    #[arg(long, default_value = "id")]
    id_column: String,
}

fn run(cli: &Cli) -> Result<()> {
    let params = Parameters::from_yaml_file(&cli.params)?;
    let device = select_device();

    let x_train = har_pipeline::data::load_features(&cli.x_train, &device)?;
    let y_train = har_pipeline::data::load_labels(&cli.y_train, &device)?;
    let x_test = har_pipeline::data::load_inference(&cli.x_test, &cli.id_column, &device)?;
    let template = har_pipeline::submission::load_template(&cli.sample_submission)?;

    let mut network = build_model(&x_train, &y_train, &params, &device)?;
    tracing::info!(
        in_features = network.in_features(),
        mid_features = network.mid_features(),
        n_class = network.n_class(),
        "model built"
    );

    let history = train(&x_train, &y_train, &network, &params)?;
    if let Some(last) = history.last() {
        println!("Final epoch {}: train_loss={:.4}", last.epoch, last.train_loss);
    }

    let logits = predict(&mut network, &x_test)?;
    let classes = predicted_classes(&logits)?;

    create_submission(template, &classes, &cli.output)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
