mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;
use std::time::Duration;
use vplyer::api::HttpVideoApi;
use vplyer::catalog::SourceCatalog;
use vplyer::config;
use vplyer::player::{MediaElement, PlaybackController, SimulatedMedia, ViewState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "vplyer=debug" } else { "vplyer=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Watch { video_id, seconds } => {
            watch(cli.config.as_deref(), video_id, seconds).await
        }
        Commands::Sources { video_id, json } => {
            sources(cli.config.as_deref(), video_id, json).await
        }
        Commands::Validate { config: path } => {
            let path = path.or(cli.config);
            match config::load_config_or_default(path.as_deref()) {
                Ok(_) => {
                    println!("Configuration is valid");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Configuration error: {e:#}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Open a session against the configured backend and drive a simulated
/// media element through `seconds` of playback.
async fn watch(config_path: Option<&std::path::Path>, video_id: i64, seconds: u64) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let api = Arc::new(HttpVideoApi::new(
        &config.api.base_url,
        config.api.token.clone(),
    ));
    let media = Arc::new(SimulatedMedia::new());

    let mut controller = PlaybackController::open(
        api,
        Arc::clone(&media) as Arc<dyn MediaElement>,
        config.playback.clone(),
        video_id,
    )
    .await;

    tracing::info!(video_id, state = ?controller.state(), "Session opened");

    if controller.state() == ViewState::Ready {
        media.set_ready(true);
        media.play();
        controller.apply_saved_position().await;
    }

    let mut last_state = controller.state();
    for _ in 0..seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;
        controller.pump();

        let state = controller.state();
        if state != last_state {
            tracing::info!(?state, "State changed");
            if state == ViewState::Ready {
                media.set_ready(true);
                media.play();
                controller.apply_saved_position().await;
            }
            last_state = state;
        }

        media.tick(1.0);
        controller.on_time_update();
    }

    if let Some(source) = controller.active_source() {
        println!(
            "Watched video {video_id} via {} ({}) up to {:.0}s",
            source.provider,
            source.resolution,
            media.position()
        );
    } else {
        println!("No playable source for video {video_id} (state {:?})", controller.state());
    }

    controller.close();
    Ok(())
}

async fn sources(config_path: Option<&std::path::Path>, video_id: i64, json: bool) -> Result<()> {
    use vplyer::api::VideoApi;

    let config = config::load_config_or_default(config_path)?;
    let api = HttpVideoApi::new(&config.api.base_url, config.api.token.clone());

    let record = api.get_video(video_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let catalog = SourceCatalog::from_record(&record);
    println!("{} ({} sources)", record.title, catalog.len());
    for source in catalog.sources() {
        println!("  {:<12} {}", source.provider.to_string(), source.resolution);
    }
    if let Some(initial) = catalog.initial_selection() {
        println!("initial: {} {}", initial.provider, initial.resolution);
    }
    Ok(())
}
