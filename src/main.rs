use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vod_relay::{ApiServer, AppState, Config, ConfigBuilder, SegmentRequest};

fn cli() -> Command {
    let video_args = [
        Arg::new("video-id")
            .short('i')
            .long("video-id")
            .value_name("ID")
            .help("Video identifier on the content host")
            .required(true),
        Arg::new("quality")
            .short('q')
            .long("quality")
            .value_name("TIER")
            .help("Quality tier, e.g. 1500")
            .required(true),
    ];

    Command::new("VOD Relay")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Segment discovery, playlist and download proxy for course videos")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP server (default)")
                .arg(Arg::new("host").long("host").value_name("ADDR").help("Bind address"))
                .arg(Arg::new("port").short('p').long("port").value_name("PORT").help("Bind port")),
        )
        .subcommand(
            Command::new("playlist")
                .about("Discover segments and print the HLS playlist")
                .args(video_args.clone()),
        )
        .subcommand(
            Command::new("download")
                .about("Discover segments and write the reassembled video to a file")
                .args(video_args)
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file (default: <videoId>-<quality>.ts)"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Load configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    // Initialize logging
    let level = if matches.get_flag("verbose") { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vod_relay={},tower_http={},warn", level, level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match matches.subcommand() {
        Some(("playlist", sub)) => run_playlist(config, sub).await,
        Some(("download", sub)) => run_download(config, sub).await,
        Some(("serve", sub)) => run_server(config, Some(sub)).await,
        _ => run_server(config, None).await,
    }
}

/// Apply `serve --host/--port` on top of the loaded config
fn server_config(config: Config, matches: Option<&ArgMatches>) -> Result<Config> {
    let mut builder = ConfigBuilder::from_config(config);
    if let Some(matches) = matches {
        if let Some(host) = matches.get_one::<String>("host") {
            builder = builder.with_host(host.as_str());
        }
        if let Some(port) = matches.get_one::<String>("port") {
            builder = builder.with_port(port.parse()?);
        }
    }
    Ok(builder.build())
}

async fn run_server(config: Config, matches: Option<&ArgMatches>) -> Result<()> {
    let config = server_config(config, matches)?;
    config.validate()?;
    info!("🚀 VOD Relay starting...");
    info!("{}", config.summary());

    let state = AppState::from_config(config)?;
    ApiServer::new(state).start().await
}

fn segment_request(matches: &ArgMatches) -> Result<SegmentRequest> {
    let video_id = matches.get_one::<String>("video-id").cloned().unwrap_or_default();
    let quality = matches.get_one::<String>("quality").cloned().unwrap_or_default();
    Ok(SegmentRequest::new(video_id, quality)?)
}

async fn run_playlist(config: Config, matches: &ArgMatches) -> Result<()> {
    config.validate()?;
    let request = segment_request(matches)?;
    let state = AppState::from_config(config)?;

    let progress = state.progress.track(&request.video_id);
    let count = state.locator.locate(&request, &progress).await?;
    println!("{}", state.playlists.render(&request, count));
    Ok(())
}

async fn run_download(config: Config, matches: &ArgMatches) -> Result<()> {
    config.validate()?;
    let request = segment_request(matches)?;
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(request.download_filename()));

    let state = AppState::from_config(config)?;
    let progress = state.progress.track(&request.video_id);
    let count = state.locator.locate(&request, &progress).await?;
    info!("📂 Writing {} segments to {}", count, output.display());

    let mut file = tokio::fs::File::create(&output).await?;
    let mut handle = state.reassembler.spawn(request.clone(), count, progress);
    let start_time = std::time::Instant::now();

    while let Some(chunk) = handle.stream.next().await {
        match chunk {
            Ok(bytes) => file.write_all(&bytes).await?,
            Err(e) => {
                warn!("Download of {} stopped, {} is incomplete", request, output.display());
                return Err(anyhow!(e));
            }
        }
    }
    file.flush().await?;

    let written = handle.task.await??;
    info!(
        "🎉 Downloaded {} bytes in {:.2}s to {}",
        written,
        start_time.elapsed().as_secs_f64(),
        output.display()
    );
    Ok(())
}
