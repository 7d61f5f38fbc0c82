use clap::{Args, Parser, Subcommand};
use leafscan_classifiers::Architecture;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "leafscan-demo")]
#[command(
    author,
    version,
    about = "Plant-health demo: classify a leaf photo as healthy or diseased"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the demo server with web UI
    Serve {
        #[command(flatten)]
        model: ModelArgs,

        /// Listen port (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen address (overrides the config file)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Analyze a single image file and print the result
    Analyze {
        /// Leaf photo (jpeg or png)
        image: PathBuf,

        /// Treat the image as a camera snapshot rather than an upload
        #[arg(long)]
        camera: bool,

        /// Print the rendered view as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        model: ModelArgs,
    },
}

/// Options shared by every command that loads the model
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Configuration file path
    #[arg(short, long, env = "LEAFSCAN_CONFIG", default_value = "leafscan.yaml")]
    pub config: String,

    /// Model weights (safetensors), overrides the config file
    #[arg(short, long, env = "LEAFSCAN_MODEL")]
    pub model: Option<PathBuf>,

    /// Label table file, overrides the config file
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Network architecture of the weights
    #[arg(long, value_parser = parse_architecture)]
    pub architecture: Option<Architecture>,

    /// Write every analysis to one fixed transient file (racy across sessions)
    #[arg(long)]
    pub shared_transient: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_architecture(s: &str) -> Result<Architecture, String> {
    s.parse()
}
