mod cli;

use clipforge::{app::App, config};
use clipforge_av::{probe_duration, ToolRegistry};
use clipforge_common::paths::guess_content_type;
use clipforge_common::StageResponse;
use clipforge_pipeline::{
    AudioMode, AudioRequest, AudioSource, ExportRequest, MergeRequest, TextOverlayRequest,
    TrimRequest, UploadRequest,
};
use clipforge_store::{Sweeper, SweeperConfig};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepReport {
    removed: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeReport {
    path: PathBuf,
    duration_secs: f64,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set. Logs go to stderr; stdout carries the JSON envelope.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipforge=trace,clipforge_pipeline=trace,clipforge_av=trace,clipforge_store=debug"
                .to_string()
        } else {
            "clipforge=info,clipforge_pipeline=info,clipforge_av=info,clipforge_store=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipforge {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let app = App::build(config)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_command(&app, command))
        }
    }
}

async fn run_command(app: &App, command: Commands) -> Result<ExitCode> {
    let pipeline = &app.pipeline;

    match command {
        Commands::Upload { file, content_type } => {
            let result: clipforge_common::Result<_> = async {
                let req = read_upload(&file, content_type).await?;
                pipeline.upload(req).await
            }
            .await;
            emit(result)
        }
        Commands::Trim {
            video_id,
            start,
            end,
        } => emit(
            pipeline
                .trim(TrimRequest {
                    video_id,
                    start_time: start,
                    end_time: end,
                })
                .await,
        ),
        Commands::Merge { video_ids } => emit(
            pipeline
                .merge(MergeRequest {
                    video_ids,
                    order: None,
                })
                .await,
        ),
        Commands::AddText {
            video_id,
            text,
            x,
            y,
            font_size,
            color,
            start,
            end,
        } => emit(
            pipeline
                .add_text(TextOverlayRequest {
                    video_id,
                    text,
                    x,
                    y,
                    font_size,
                    color,
                    start_time: start,
                    end_time: end,
                })
                .await,
        ),
        Commands::AddAudio {
            video_id,
            audio,
            audio_id,
            mode,
            volume,
        } => {
            let result: clipforge_common::Result<_> = async {
                let mode: AudioMode = mode.parse()?;
                let source = match (audio, audio_id) {
                    (Some(path), _) => Some(AudioSource::Upload {
                        bytes: tokio::fs::read(&path).await?,
                        file_name: file_name(&path),
                    }),
                    (None, Some(id)) => Some(AudioSource::Existing { id }),
                    (None, None) => None,
                };
                pipeline
                    .add_audio(AudioRequest {
                        video_id,
                        audio: source,
                        mode,
                        volume,
                    })
                    .await
            }
            .await;
            emit(result)
        }
        Commands::Export { output_id } => {
            emit(pipeline.export(ExportRequest { output_id }).await)
        }
        Commands::Sweep { max_age_secs } => {
            let sweeper = match max_age_secs {
                Some(secs) => Sweeper::new(
                    pipeline.store().clone(),
                    SweeperConfig {
                        max_age: Duration::from_secs(secs),
                        ..app.config.sweeper_config()
                    },
                ),
                None => pipeline.sweeper().clone(),
            };
            let removed = sweeper.sweep_now().await;
            emit(Ok(SweepReport { removed }))
        }
        Commands::RunSweeper => run_sweeper(app).await,
        Commands::Probe { file } => {
            let duration = probe_duration(&app.ffprobe(), &file).await;
            emit(duration.map(|duration_secs| ProbeReport {
                path: file,
                duration_secs,
            }))
        }
        Commands::CheckTools | Commands::Validate { .. } | Commands::Version => {
            anyhow::bail!("Command does not use the pipeline")
        }
    }
}

/// Print the response envelope; failures exit non-zero.
fn emit<T: Serialize>(result: clipforge_common::Result<T>) -> Result<ExitCode> {
    if let Err(e) = &result {
        tracing::debug!(kind = %e.kind(), error = %e, "command failed");
    }

    let response = StageResponse::from(result);
    let code = if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(code)
}

async fn read_upload(
    file: &Path,
    content_type: Option<String>,
) -> clipforge_common::Result<UploadRequest> {
    let bytes = tokio::fs::read(file).await?;
    let content_type =
        content_type.or_else(|| guess_content_type(file).map(|t| t.to_string()));

    Ok(UploadRequest {
        bytes,
        file_name: file_name(file),
        content_type,
    })
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

async fn run_sweeper(app: &App) -> Result<ExitCode> {
    let cancel = CancellationToken::new();
    let Some(handle) = app.start_sweeper(cancel.clone()) else {
        anyhow::bail!("Background sweeper is disabled in the configuration");
    };

    tracing::info!(
        "Sweeping {:?} every {}s (max age {}s), Ctrl+C to stop",
        app.pipeline.store().root(),
        app.config.sweeper.interval_secs,
        app.config.sweeper.max_age_secs
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    tracing::info!("Shutting down...");
    cancel.cancel();
    handle.await.context("Sweeper task failed")?;

    Ok(ExitCode::SUCCESS)
}

fn check_tools(config_path: Option<&Path>) -> Result<ExitCode> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let registry = ToolRegistry::discover(&config.tool_paths());
    let tools = registry.check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    match registry.require("ffmpeg") {
        Ok(_) if all_ok => println!("All required tools are available!"),
        Ok(_) => println!("Some tools are missing. Encoding works but probing does not."),
        Err(e) => println!("{e}\nInstall ffmpeg to enable encoding."),
    }

    Ok(ExitCode::SUCCESS)
}

fn validate_config(path: Option<&Path>) -> Result<ExitCode> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Store: {:?}", config.store.dir);
    println!("  Public prefix: {}", config.store.public_prefix);
    println!(
        "  Sweeper: {} (max age {}s, every {}s, on request: {})",
        if config.sweeper.enabled { "enabled" } else { "disabled" },
        config.sweeper.max_age_secs,
        config.sweeper.interval_secs,
        config.sweeper.sweep_on_request
    );
    println!(
        "  Encoder: {}/{} (timeout {}s)",
        config.encoder.video_codec, config.encoder.audio_codec, config.encoder.timeout_secs
    );
    println!("  Upload types: {}", config.upload.allowed_types.join(", "));

    Ok(ExitCode::SUCCESS)
}
