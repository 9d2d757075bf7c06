use std::process::ExitCode;
use std::sync::Arc;

use canvas::engine::EngineCore;
use clap::{Parser, Subcommand};
use pixelboard::api::{Backend, HttpBackend, into_pixel};
use pixelboard::app::{App, Services};
use pixelboard::channel::{ChannelConfig, WsChannel};
use pixelboard::config::AppConfig;
use pixelboard::contract::{ContractError, PixelContract, TxReceipt, format_eth};
use pixelboard::error::{AppError, ErrorCode};
use pixelboard::leaderboard::{Leaderboard, LeaderboardRow, shorten_address};
use pixelboard::notify::Notification;
use pixelboard::wallet::{Address, ProviderRegistry};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pixelboard", about = "Pixel board backend and push channel CLI")]
struct Cli {
    /// Overrides `PIXELBOARD_BACKEND_URL`; the push URL is derived from it.
    #[arg(long, env = "PIXELBOARD_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the pixel snapshot and summarize it.
    Pixels,
    /// Print the leaderboard.
    Leaderboard,
    /// Print stats for one wallet.
    User { address: String },
    /// Load the board, then apply pushed updates until Ctrl-C.
    Watch,
}

/// Contract binding for sessions without a signer.
struct ReadOnlyContract;

#[async_trait::async_trait]
impl PixelContract for ReadOnlyContract {
    async fn paint_pixels(&self, _pixels_hash: [u8; 32], _count: u64, _fee_wei: u128) -> Result<TxReceipt, ContractError> {
        Err(ContractError::Rpc("read-only session has no signer".to_owned()))
    }

    async fn withdraw_fees(&self) -> Result<TxReceipt, ContractError> {
        Err(ContractError::Rpc("read-only session has no signer".to_owned()))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment and defaults still apply.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.backend_url.as_deref() {
        config = config.with_backend_url(url)?;
    }
    let backend = HttpBackend::new(&config.backend_url, config.request_timeout)?;

    match cli.command {
        Command::Pixels => run_pixels(&backend).await,
        Command::Leaderboard => run_leaderboard(&backend).await,
        Command::User { address } => run_user(&backend, &address).await,
        Command::Watch => run_watch(config, backend).await,
    }
}

async fn run_pixels(backend: &HttpBackend) -> Result<(), AppError> {
    let pixels = backend.fetch_pixels().await?;
    let mut engine = EngineCore::new();
    // No host to redraw; the frame is built below.
    let _actions = engine.load_snapshot(pixels.into_iter().map(into_pixel).collect());

    println!("pixels: {}", engine.store.len());
    if let Some((min, max)) = engine.store.extent() {
        println!("extent: ({}, {}) .. ({}, {})", min.x, min.y, max.x, max.y);
    }
    println!("surface: {} x {}", engine.surface.width, engine.surface.height);
    let frame = engine.frame();
    println!("render buffer: {} instances", frame.buffers.len());
    Ok(())
}

async fn run_leaderboard(backend: &HttpBackend) -> Result<(), AppError> {
    let mut board = Leaderboard::new();
    board.replace(backend.fetch_leaderboard().await?);
    print_rows(&board.rows());
    Ok(())
}

async fn run_user(backend: &HttpBackend, raw: &str) -> Result<(), AppError> {
    let address = Address::parse(raw)?;
    match backend.fetch_user(&address).await? {
        Some(stats) => {
            println!("{}", stats.wallet_address);
            println!("points: {}", stats.points);
            println!("pixels painted: {}", stats.pixels_painted);
        }
        None => println!("{}: no stats yet", shorten_address(address.as_str())),
    }
    Ok(())
}

async fn run_watch(config: AppConfig, backend: HttpBackend) -> Result<(), AppError> {
    let channel_config = ChannelConfig::new(config.ws_url.clone(), config.channel_attempts);
    let fee = format_eth(config.fee_per_pixel_wei);
    let (channel, mut events) = WsChannel::connect(channel_config).await?;

    let services = Services { backend: Arc::new(backend), contract: Arc::new(ReadOnlyContract), channel: Arc::new(channel) };
    let mut app = App::new(config, ProviderRegistry::new(), services);
    app.start().await;
    print_notifications(app.drain_notifications());
    info!(pixels = app.engine().store.len(), fee_per_pixel = %fee, "watching for updates");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
            event = events.recv() => {
                let Some(event) = event else {
                    return Err(AppError::Channel("push channel closed".to_owned()));
                };
                let name = event.name();
                app.handle_server_event(event);
                let applied = 1 + app.pump(&mut events);
                // Headless: render requests have no surface to act on.
                drop(app.drain_actions());
                println!("{name}: {applied} event(s), {} pixels", app.engine().store.len());
                if name == frames::EVENT_LEADERBOARD_UPDATE {
                    print_rows(&app.leaderboard().rows());
                }
            }
        }
    }
}

fn print_rows(rows: &[LeaderboardRow]) {
    for row in rows {
        let marker = if row.is_current { "*" } else { " " };
        println!(
            "{marker}{:>3}  {:<13}  {:>6} px  {:>6} pts",
            row.rank, row.short_address, row.pixels_painted, row.points
        );
    }
}

fn print_notifications(notifications: Vec<Notification>) {
    for n in notifications {
        eprintln!("{}: {}", n.title(), n.message);
    }
}
