use anyhow::Result;
use clap::Parser;
use insoapp_action::commands::{self, Cli, Commands};
use insoapp_action::config::EffectiveConfig;
use insoapp_action::errors::{CliError, ClientError};
use insoapp_action::logging::init_logging;
use std::process;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format)?;
    let cfg = match EffectiveConfig::load() {
        Ok(c) => c,
        Err(e) => { let e = anyhow::Error::from(e); eprintln!("error: {e:#}"); finish(start, classify_exit_code(&e)); }
    };
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() { warn!(event="cli.interrupted", "cancelling"); on_signal.cancel(); }
    });
    let exit_code = match dispatch(cli, cfg, cancel).await { Ok(()) => 0, Err(e) => classify_exit_code(&e) };
    finish(start, exit_code)
}

fn finish(start: Instant, exit_code: i32) -> ! {
    info!(took_ms=%start.elapsed().as_millis(), event="cli.finished", exit_code);
    process::exit(exit_code)
}

async fn dispatch(cli: Cli, cfg: EffectiveConfig, cancel: CancellationToken) -> Result<()> {
    let start = Instant::now();
    let output = cli.output;
    let result = match cli.command.unwrap_or(Commands::Run {}) {
        Commands::Run {} => commands::run::handle(&cfg, output, cancel).instrument(info_span!("cmd.run")).await,
        Commands::Status { name } => { let span = info_span!("cmd.status", app=%name); commands::status::handle(&cfg, &name, output).instrument(span).await }
        Commands::Deploy { name, image } => { let span = info_span!("cmd.deploy", app=%name); commands::deploy::handle(&cfg, &name, image, output, cancel).instrument(span).await }
        Commands::Delete { name } => { let span = info_span!("cmd.delete", app=%name); commands::delete::handle(&cfg, &name, output, cancel).instrument(span).await }
    };
    let took = start.elapsed().as_millis();
    match &result { Ok(_) => info!(event="cmd.finished", took_ms=%took), Err(e) => { eprintln!("error: {e:#}"); info!(event="cmd.failed", took_ms=%took); } }
    result
}

fn classify_exit_code(e: &anyhow::Error) -> i32 {
    use std::error::Error;
    let mut cur: &dyn Error = e.as_ref();
    loop {
        if let Some(cli) = cur.downcast_ref::<CliError>() { tracing::debug!(?cli, code=cli.kind.code(), "classified_cli_error"); return cli.kind.code(); }
        if let Some(ce) = cur.downcast_ref::<ClientError>() { return ce.kind().code(); }
        if let Some(ioe) = cur.downcast_ref::<std::io::Error>() { eprintln!("io error: {ioe}"); return 30; }
        if let Some(src) = cur.source() { cur = src; } else { break; }
    }
    eprintln!("runtime error: {e}");
    20
}
