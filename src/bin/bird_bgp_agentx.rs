//! bird-bgp-agentx: serve BIRD BGP session state as BGP4-MIB over AgentX.

use std::process::ExitCode;
use std::sync::Arc;

use bird_bgp_agentx::agent::Subagent;
use bird_bgp_agentx::cli::args::{AgentxArgs, DaemonArgs, OutputArgs, agent_config};
use bird_bgp_agentx::cli::output::{OutputContext, write_error};
use bird_bgp_agentx::handler::SnapshotHandler;
use bird_bgp_agentx::refresh::{Refresher, collect_snapshot};
use bird_bgp_agentx::{AgentConfig, BirdClient};
use clap::Parser;
use tokio_util::sync::CancellationToken;

/// AgentX subagent exposing BIRD BGP sessions as BGP4-MIB (1.3.6.1.2.1.15).
#[derive(Debug, Parser)]
#[command(name = "bird-bgp-agentx", version, about)]
struct Args {
    #[command(flatten)]
    daemon: DaemonArgs,

    #[command(flatten)]
    agentx: AgentxArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Poll the daemon once, print the MIB and exit without AgentX.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.output.init_tracing();

    let config = agent_config(&args.daemon, &args.agentx);
    let client = BirdClient::new(&config.bird_socket, config.daemon_timeout);

    if args.once {
        return dump(client, &args.output).await;
    }

    match run(client, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn dump(mut client: BirdClient, output: &OutputArgs) -> ExitCode {
    let snapshot = match collect_snapshot(&mut client).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = OutputContext {
        format: output.format,
        show_hints: !output.no_hints,
    };
    if let Err(e) = ctx.write_snapshot(&snapshot) {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(client: BirdClient, config: &AgentConfig) -> bird_bgp_agentx::Result<()> {
    let refresher = Refresher::start(client).await?;
    let handler = SnapshotHandler::new(Arc::clone(refresher.cell()));

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));
    let refresh_task = tokio::spawn(refresher.run(config.refresh_interval, cancel.clone()));

    // Registration failures at startup are fatal; later ones are retried.
    let mut session = Subagent::connect(config).await?;

    loop {
        match session.serve(&handler, cancel.clone()).await {
            Ok(()) => break,
            Err(e) if e.is_session_lost() => {
                tracing::warn!(error = %e, "AgentX session lost, reconnecting");
            }
            Err(e) => {
                cancel.cancel();
                return Err(e);
            }
        }

        match reconnect(config, &cancel).await {
            Some(next) => session = next,
            None => break,
        }
    }

    let _ = refresh_task.await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Retry the session until it is re-established or `cancel` fires.
async fn reconnect(config: &AgentConfig, cancel: &CancellationToken) -> Option<Subagent<tokio::net::UnixStream>> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(config.reconnect_interval) => {}
        }
        match Subagent::connect(config).await {
            Ok(session) => return Some(session),
            Err(e) => tracing::warn!(
                agentx.master = %config.master_socket.display(),
                error = %e,
                "reconnect failed"
            ),
        }
    }
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
                _ = term.recv() => tracing::info!("received SIGTERM"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "cannot install SIGTERM handler, SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received SIGINT");
        }
    }
    cancel.cancel();
}
