//! Model zoo command line.
//!
//! ```bash
//! # List registered models
//! cargo run --bin zoo -- list
//!
//! # Build a model and run one forward pass on random input
//! cargo run --bin zoo -- info se_resnext50_32x4d --classes 10 --input-size 64
//! ```

use anyhow::{Context, Result};
use burn::{backend::NdArray, prelude::*, tensor::Distribution};
use clap::{Parser, Subcommand};
use cvzoo::{check_input_size, get_model, list_models, ModelName, ModelOptions};
use tracing_subscriber::EnvFilter;

type SelectedBackend = NdArray<f32>;

#[derive(Parser)]
#[command(name = "zoo", version, about = "Build and inspect cvzoo models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered models
    List,

    /// Build a model and report its size and output shape
    Info {
        /// Registered model name, e.g. "resnext50_32x4d"
        model: String,

        /// Number of classification classes
        #[arg(long, default_value_t = 1000)]
        classes: usize,

        /// Side length of the square dummy input
        #[arg(long, default_value_t = 224)]
        input_size: usize,

        /// Batch size of the dummy input
        #[arg(long, default_value_t = 1)]
        batch_size: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for name in list_models() {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Info {
            model,
            classes,
            input_size,
            batch_size,
        } => info(&model, classes, input_size, batch_size),
    }
}

fn info(model: &str, classes: usize, input_size: usize, batch_size: usize) -> Result<()> {
    let name: ModelName = model.parse()?;
    check_input_size(input_size)?;
    anyhow::ensure!(batch_size > 0, "Batch size must be greater than 0");

    let device = Default::default();
    let options = ModelOptions::new().with_num_classes(classes);
    let net = get_model::<SelectedBackend>(name, &options, &device)
        .with_context(|| format!("Failed to build {name}"))?;

    let input = Tensor::<SelectedBackend, 4>::random(
        [batch_size, options.in_channels, input_size, input_size],
        Distribution::Normal(0.0, 1.0),
        &device,
    );
    tracing::info!(model = %name, shape = ?input.dims(), "running forward pass");
    let features = net.features(input.clone());
    let logits = net.forward(input);

    println!("Model: {name}");
    println!("  Parameters: {}", net.num_params());
    println!("  Stages: {}", net.num_stages());
    println!("  Feature map: {:?}", features.dims());
    println!("  Output: {:?}", logits.dims());
    Ok(())
}
