//! `dockhand` application entry point.
//!
//! Uses `eyre` for opaque error handling at the application boundary,
//! converting domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/dockhand/config.toml` or path from `DOCKHAND_CONFIG_PATH`)
//! 3. Environment variables (`DOCKHAND_*`)
//! 4. Command-line arguments
//!
//! Diagnostics go to stderr, filtered by `RUST_LOG`.

use std::sync::Arc;

use clap::Parser;
use dockhand::config::{AppConfig, Cli, Commands, RunArgs, TopArgs, load_config};
use dockhand::engine::{
    ArgumentAssembler, Containment, EngineClient, LaunchEnvResolver, TokioProcessRunner,
    TracingDiagnostics,
};
use dockhand::error::Result as DockhandResult;
use eyre::{Report, Result as EyreResult};
use tracing_subscriber::EnvFilter;

fn main() -> EyreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;

    run(&cli, &config).map_err(Report::from)
}

/// Execute the CLI command, returning domain-specific errors.
fn run(cli: &Cli, config: &AppConfig) -> DockhandResult<()> {
    let client = build_client(config)?;
    match &cli.command {
        Commands::Run(args) => run_container(&client, args),
        Commands::Top(args) => list_processes(&client, args),
        Commands::Whoami => who_am_i(&client),
        Commands::Containerized => containerized(&client),
    }
}

fn build_client(config: &AppConfig) -> DockhandResult<EngineClient<TokioProcessRunner>> {
    let env = mockable::DefaultEnv::new();
    let launch_env = LaunchEnvResolver::new(&env).resolve(config.engine_host.as_deref());
    let assembler = ArgumentAssembler::new(
        config.engine.binary.as_str(),
        config.engine.resolved_path_style(),
    );
    tracing::debug!(
        engine = assembler.engine(),
        path_style = ?assembler.path_style(),
        timeout_secs = config.engine.timeout_secs,
        "engine client configured"
    );

    Ok(EngineClient::new(
        TokioProcessRunner::new()?,
        assembler,
        Arc::new(TracingDiagnostics),
    )
    .with_timeout(config.engine.timeout())
    .with_launch_env(launch_env))
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn run_container(client: &EngineClient<TokioProcessRunner>, args: &RunArgs) -> DockhandResult<()> {
    let request = args.to_request()?;
    let stdout = client.run(&request)?;
    println!("{}", stdout.trim_end());
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn list_processes(
    client: &EngineClient<TokioProcessRunner>,
    args: &TopArgs,
) -> DockhandResult<()> {
    for name in client.list_processes(&args.container)? {
        println!("{name}");
    }
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn who_am_i(client: &EngineClient<TokioProcessRunner>) -> DockhandResult<()> {
    println!("{}", client.who_am_i()?);
    Ok(())
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn containerized(client: &EngineClient<TokioProcessRunner>) -> DockhandResult<()> {
    if let Containment::Present { container_id } = client.container_id_if_containerized()? {
        println!("{container_id}");
    }
    Ok(())
}
