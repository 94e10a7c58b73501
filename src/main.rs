use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use sysview::presenter::{JsonPresenter, TablePresenter};
use sysview::shared::rate::parse_rate_command;
use sysview::{
    system_query, Collector, Config, LifecycleManager, NotificationChannel, Presenter,
    RateController, SnapshotKind, SysviewError,
};

#[derive(Parser, Debug)]
#[command(name = "sysview")]
#[command(version, about = "Live CPU, memory, disk, process, service and scheduled task viewer")]
struct Cli {
    #[arg(long, default_value = "./sysview.yaml")]
    config: String,
    #[arg(long)]
    print_default_config: bool,
    /// Print one JSON object per update instead of tables.
    #[arg(long)]
    json: bool,
    /// Rows shown per table; 0 shows all.
    #[arg(long, default_value_t = 25)]
    max_rows: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return ExitCode::SUCCESS;
    }

    let cfg = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("sysview: {e}");
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_level))
        .target(env_logger::Target::Stderr)
        .init();

    match run(&cli, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, cfg: &Config) -> Result<(), SysviewError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("sysview-collector")
        .enable_all()
        .build()?;

    let channel = NotificationChannel::new();
    let mut dispatcher = channel.dispatcher();

    let presenter: Rc<RefCell<dyn Presenter>> = if cli.json {
        Rc::new(RefCell::new(JsonPresenter::new(io::stdout())))
    } else {
        Rc::new(RefCell::new(TablePresenter::new(io::stdout(), cli.max_rows)))
    };
    dispatcher.subscribe_presenter(presenter)?;

    let mut lifecycle = LifecycleManager::new(runtime.handle().clone());
    for kind in SnapshotKind::ALL {
        let collector_cfg = cfg.collectors.get(kind);
        if !collector_cfg.enabled {
            info!("{} collector disabled", kind);
            continue;
        }
        lifecycle.register(Collector::new(
            system_query(kind, cfg),
            channel.clone(),
            collector_cfg.interval_ms,
        ));
    }

    for (kind, e) in lifecycle.start_all() {
        warn!("{} view will stay empty: {}", kind, e);
    }
    info!("{} collectors running", lifecycle.active_count());

    let mut rates: HashMap<SnapshotKind, RateController> = lifecycle
        .collectors()
        .iter()
        .map(|c| (c.kind(), RateController::new(c.clone(), cfg.rate)))
        .collect();

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    runtime.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, closing"),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
        on_signal.cancel();
    });

    runtime.block_on(async {
        tokio::join!(dispatcher.run(&shutdown), read_rate_commands(&mut rates, &shutdown));
    });

    lifecycle.stop_all();
    let grace = cfg.shutdown_grace();
    if !runtime.block_on(lifecycle.wait_stopped(grace)) {
        warn!("Some collectors did not finish within {:?}", grace);
    }
    runtime.shutdown_timeout(grace);
    Ok(())
}

/// Reads `<ms>` or `<kind> <ms>` lines from stdin until shutdown.
async fn read_rate_commands(
    rates: &mut HashMap<SnapshotKind, RateController>,
    shutdown: &CancellationToken,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => return,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read rate command: {}", e);
                break;
            }
        };

        let (kind, value) = match parse_rate_command(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        let Some(rate) = rates.get_mut(&kind) else {
            warn!("{} collector is not running", kind);
            continue;
        };
        info!("{} rate: {} ms", kind, rate.preview(value));
        if let Err(e) = rate.commit(value) {
            warn!("{}", e);
        }
    }
    // stdin closed: keep showing updates until interrupted.
    shutdown.cancelled().await;
}
