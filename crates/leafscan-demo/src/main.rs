use clap::Parser;
use leafscan_classifiers::ModelLoader;
use leafscan_core::Error;
use leafscan_demo::acquire::{acquire, CaptureSource};
use leafscan_demo::cli::{Cli, Commands};
use leafscan_demo::config::AppConfig;
use leafscan_demo::pipeline::run_analysis;
use leafscan_demo::render::{
    render_acquire_error, render_analysis, render_idle, render_inference_error, render_load_error,
    PageView,
};
use leafscan_demo::server::run_server;
use leafscan_demo::state::{AppState, ModelStatus};
use leafscan_demo::telemetry::{init_logging, init_metrics};
use leafscan_demo::transient::TransientStore;
use std::net::SocketAddr;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            model,
            port,
            address,
        } => {
            init_logging(model.verbose);

            let mut config = AppConfig::load(&model)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(address) = address {
                config.server.address = address;
            }

            let addr: SocketAddr =
                format!("{}:{}", config.server.address, config.server.port).parse()?;

            let handle = init_metrics()?;
            let loader = ModelLoader::new(config.model.clone());
            let state = AppState::initialize(config, &loader, Some(handle));

            println!();
            println!("  ╔═══════════════════════════════════════════════╗");
            println!("  ║                                               ║");
            println!("  ║   🌿  LeafScan: Plant Disease Detection  🌿   ║");
            println!("  ║                                               ║");
            println!("  ╚═══════════════════════════════════════════════╝");
            println!();
            match &state.model {
                ModelStatus::Ready(classifier) => {
                    println!("  Model:     {}", classifier.name());
                    println!("  Classes:   {}", classifier.labels().len());
                }
                ModelStatus::Unavailable(e) => {
                    println!(
                        "  Model:     {} unavailable ({})",
                        loader.config().display_name(),
                        e
                    );
                }
            }
            println!(
                "  Transient: {:?} in {}",
                state.transient.mode(),
                state.transient.dir().display()
            );
            println!();
            println!("  Open http://{} in your browser", addr);
            println!();

            run_server(state, addr).await?;
        }

        Commands::Analyze {
            image,
            camera,
            json,
            model,
        } => {
            init_logging(model.verbose);

            let config = AppConfig::load(&model)?;
            let source = if camera {
                CaptureSource::Camera
            } else {
                CaptureSource::Upload
            };

            let (view, failed) = match analyze_file(&config, &image, source) {
                Ok(view) => (view, false),
                Err(Error::Load(e)) => (render_load_error(&e), true),
                Err(Error::Acquire(e)) => (render_acquire_error(&e), true),
                Err(Error::Inference(e)) => (render_inference_error(&e), true),
                Err(e @ Error::Config(_)) => return Err(e.into()),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", view);
            }

            if failed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Load the model and run one analysis on an image file
fn analyze_file(
    config: &AppConfig,
    image: &Path,
    source: CaptureSource,
) -> leafscan_core::Result<PageView> {
    let bytes = std::fs::read(image)
        .map_err(|e| Error::config(format!("cannot read {}: {}", image.display(), e)))?;

    let loader = ModelLoader::new(config.model.clone());
    let classifier = loader.load()?;

    let Some(leaf) = acquire(source, Some(&bytes))? else {
        return Ok(render_idle());
    };

    let store = TransientStore::from_config(&config.transient);
    let report = run_analysis(classifier.as_ref(), &leaf, &store)?;
    Ok(render_analysis(&report, &config.page))
}
