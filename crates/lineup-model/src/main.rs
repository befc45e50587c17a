//! CLI entry point: parse a role-tagged dataset and print the view model as JSON.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use lineup_model::{
    Dataset, ModelConfig, RoleAssignment, ViewModel, ViewModelError, dataset_from_frame,
    parse_custom_mappings, read_csv,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info};

/// Build the row-oriented view model of a role-tagged dataset.
#[derive(Parser, Debug)]
#[command(name = "lineup-model")]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "INPUT:\n  \
                  Either --input with --roles, or --dataset.\n\n\
                  EXAMPLES:\n  \
                  # CSV plus a role assignment\n  \
                  lineup-model -i patients.csv --roles roles.json --pretty\n\n  \
                  # Pre-built dataset JSON, lenient row lengths\n  \
                  lineup-model --dataset dataset.json --lenient-lengths\n\n  \
                  # Column descriptors with a custom numeric domain\n  \
                  lineup-model -i patients.csv --roles roles.json --describe \\\n    \
                  --custom-mapping '{\"Score\": [0, 100]}'"
)]
struct Args {
    /// Path to the CSV file to parse
    #[arg(short, long, requires = "roles", conflicts_with = "dataset")]
    input: Option<String>,

    /// JSON file assigning CSV columns to roles
    #[arg(long)]
    roles: Option<String>,

    /// Path to a dataset JSON file (columns with roles, types and values)
    #[arg(long)]
    dataset: Option<String>,

    /// Custom column mapping JSON, e.g. '{"Score": [0, 100]}'
    #[arg(long)]
    custom_mapping: Option<String>,

    /// Print column descriptors instead of the full model
    #[arg(long)]
    describe: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write the JSON output to a file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Minimum number of duration tokens for a box-plot summary
    #[arg(long)]
    min_samples: Option<usize>,

    /// Outlier fence multiplier applied to the interquartile range
    #[arg(long)]
    outlier_fence: Option<f64>,

    /// Read missing cells of short columns as null instead of failing
    #[arg(long)]
    lenient_lengths: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so stdout only carries the JSON output.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables (RUST_LOG) from .env file
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let dataset = load_dataset(&args)?;
    let config = build_config(&args)?;

    match run(&args, &dataset, config) {
        Ok(output) => write_json(&args, &output),
        Err(err) => {
            error!("Parsing failed [{}]: {}", err.error_code(), err);
            write_json(&args, &err)?;
            std::process::exit(1);
        }
    }
}

/// Load the dataset from `--dataset`, or from `--input` plus `--roles`.
fn load_dataset(args: &Args) -> Result<Dataset> {
    if let Some(path) = &args.dataset {
        info!("Loading dataset from: {}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("Invalid dataset JSON in {}", path));
    }

    let (input, roles) = match (&args.input, &args.roles) {
        (Some(input), Some(roles)) => (input, roles),
        _ => return Err(anyhow!("Either --dataset or --input with --roles is required")),
    };

    if !Path::new(input).exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }

    info!("Loading dataset from: {}", input);
    let df = read_csv(input)?;
    let roles = RoleAssignment::from_json_file(roles)?;
    debug!("Role assignment: {:?}", roles);
    Ok(dataset_from_frame(&df, &roles)?)
}

fn build_config(args: &Args) -> Result<ModelConfig> {
    let mut builder = ModelConfig::builder().strict_row_lengths(!args.lenient_lengths);
    if let Some(samples) = args.min_samples {
        builder = builder.min_box_plot_samples(samples);
    }
    if let Some(fence) = args.outlier_fence {
        builder = builder.outlier_fence(fence);
    }
    Ok(builder.build()?)
}

/// Build the model and the JSON value to print.
fn run(args: &Args, dataset: &Dataset, config: ModelConfig) -> Result<Value, ViewModelError> {
    let model = ViewModel::from_dataset(dataset, config)?;
    info!(
        "Model built: {} rows, {} data columns, {} event columns",
        model.row_count(),
        model.column_data().len(),
        model.event_columns().len()
    );

    if args.describe {
        let mappings = parse_custom_mappings(args.custom_mapping.as_deref().unwrap_or_default())?;
        let descriptors = model.column_descriptors(&mappings)?;
        Ok(serde_json::to_value(descriptors)?)
    } else {
        Ok(serde_json::to_value(&model)?)
    }
}

/// Serialize `value` to `--output` or stdout.
fn write_json<T: Serialize>(args: &Args, value: &T) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
            info!("Output written to: {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
