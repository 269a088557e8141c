use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::SubscriberInitExt;

use ratebot::bot::{App, Messenger, TelegramBot};
use ratebot::broadcast::Broadcaster;
use ratebot::config::{LogCfg, RatebotConfig};
use ratebot::rate::{RandomSource, RateGenerator, SeededRandom, ThreadRandom};
use ratebot::registry::UserRegistry;

#[derive(Debug, Parser)]
#[command(version, about = "Telegram exchange rate bot")]
struct Args {
    #[clap(short, long, default_value = "config/ratebot.toml")]
    pub config: PathBuf,
}

fn main() {
    enable_panic_hook();
    if let Err(e) = boot() {
        eprintln!("ratebot: {:#}", e);
        error!("{:#}", e);
        exit(1);
    }
}

fn boot() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = RatebotConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let _guard = init_logging(&config.log)?;
    let token = config.token()?;

    // inbound handling and the broadcaster share one thread
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    rt.block_on(run(config, token))
}

async fn run(config: RatebotConfig, token: String) -> anyhow::Result<()> {
    let catalogue = Arc::new(config.catalogue()?);
    let source: Arc<dyn RandomSource> = match config.random.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };
    let rates = RateGenerator::new(source);
    let registry = Arc::new(UserRegistry::open(&config.store.path));
    info!(
        "[main] {} pairs, user store at {}",
        catalogue.len(),
        registry.path().display()
    );

    let bot = TelegramBot::new(token);
    let app = Arc::new(App::new(catalogue.clone(), rates.clone(), registry.clone()));

    let cancel = CancellationToken::new();
    let broadcaster = if config.broadcast.enabled {
        let messenger: Arc<dyn Messenger> = Arc::new(bot.clone());
        let broadcaster = Broadcaster::new(registry, catalogue, rates, messenger)
            .with_interval(config.broadcast.min_interval(), config.broadcast.max_interval())
            .with_initial_broadcast(config.broadcast.on_start);
        let token = cancel.clone();
        Some(tokio::spawn(async move { broadcaster.run(token).await }))
    } else {
        info!("[main] broadcast disabled");
        None
    };

    bot.run(app).await;

    cancel.cancel();
    if let Some(handle) = broadcaster {
        handle.await.context("broadcast task")?;
    }
    info!("[main] shut down");
    Ok(())
}

fn init_logging(cfg: &LogCfg) -> anyhow::Result<WorkerGuard> {
    let level = LevelFilter::from_str(&cfg.level)
        .with_context(|| format!("invalid log level {:?}", cfg.level))?;

    let file_appender = tracing_appender::rolling::daily(&cfg.dir, "ratebot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_writer(non_blocking)
        .finish()
        .init();

    Ok(guard)
}

pub fn enable_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Some(location) = panic_info.location() {
            error!(
                "panic at {}:{}",
                location.file(),
                location.line()
            );
        }
        if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
            error!("panic payload: {}", payload);
        }
        default_hook(panic_info);
        exit(-1);
    }));
}
