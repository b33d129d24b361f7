//! modman - dependency-aware mod manager
//!
//! Thin front end over the ops crate: every command refreshes the catalogs,
//! queues changes, previews them and applies them in one patch run.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{OperationResult, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use modman_config::Config;
use modman_events::EventReceiver;
use modman_ops::{OpsContextBuilder, OpsCtx, PatchReport, Removal, Session};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting modman v{}", env!("CARGO_PKG_VERSION"));

    // file, then environment, then flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let (event_sender, event_receiver) = modman_events::channel();
    let ctx = OpsContextBuilder::new()
        .with_config(config)
        .with_http_sources()?
        .with_event_sender(event_sender)
        .build()?;
    ctx.paths.ensure().await?;

    let mut event_handler = EventHandler::new(cli.global.debug);
    let result = execute_command_with_events(
        cli.command,
        &cli.global,
        &ctx,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    OutputRenderer::new().render_result(&result);
    info!("Command completed successfully");
    Ok(())
}

fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(path) = &global.path {
        config.paths.install_root = Some(path.clone());
    }
    if let Some(app_type) = global.app_type {
        config.general.app_type = app_type;
    }
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    global: &GlobalArgs,
    ctx: &OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, global, ctx));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    global: &GlobalArgs,
    ctx: &OpsCtx,
) -> Result<OperationResult, CliError> {
    let mut session = Session::new();
    modman_ops::refresh(ctx, &mut session, global.update).await?;

    if global.update && !session.queue.is_empty() {
        let report = apply(ctx, &mut session, global.yes).await?;
        OutputRenderer::new().render_result(&OperationResult::PatchReport(report));
    }

    match command {
        Commands::Search { query } => {
            let results =
                modman_ops::search(ctx, &session, query.as_deref().unwrap_or_default()).await?;
            Ok(OperationResult::SearchResults(results))
        }

        Commands::List => Ok(OperationResult::PackageList(modman_ops::list(&session))),

        Commands::Install { packages } => {
            for name in &packages {
                let resolution = modman_ops::install(ctx, &mut session, name)?;
                if resolution.is_noop() {
                    println!("{name} is already installed or queued");
                }
            }
            let report = apply(ctx, &mut session, global.yes).await?;
            Ok(OperationResult::PatchReport(report))
        }

        Commands::Remove { packages, force } => {
            for name in &packages {
                if modman_ops::uninstall(ctx, &mut session, name, force)?
                    == Removal::AlreadyQueued
                {
                    println!("{name} is already queued for removal");
                }
            }
            let report = apply(ctx, &mut session, global.yes).await?;
            Ok(OperationResult::PatchReport(report))
        }

        Commands::Ignore { package } => {
            modman_ops::ignore_package(ctx, &mut session, &package).await?;
            Ok(OperationResult::Success(format!("{package} is now ignored")))
        }

        Commands::Import { archive } => {
            let (resolution, origin) =
                modman_ops::import_archive(ctx, &mut session, &archive).await?;
            info!(origin = ?origin, queued = ?resolution.queued, "Archive imported");
            let report = apply(ctx, &mut session, global.yes).await?;
            Ok(OperationResult::PatchReport(report))
        }

        Commands::Patch => {
            let report = apply(ctx, &mut session, global.yes).await?;
            Ok(OperationResult::PatchReport(report))
        }

        Commands::Reinstall => {
            if !global.yes && !confirm("Remove and reinstall every installed package?").await? {
                return Ok(OperationResult::Success("Nothing changed.".to_string()));
            }
            let report = modman_ops::clean_reinstall(ctx, &mut session).await?;
            Ok(OperationResult::ReinstallReport(report))
        }
    }
}

/// Show the pending plan, confirm it and patch
async fn apply(ctx: &OpsCtx, session: &mut Session, yes: bool) -> Result<PatchReport, CliError> {
    let plan = modman_ops::plan(session);
    if plan.is_empty() {
        return Ok(PatchReport::default());
    }

    println!("Pending changes:\n{plan}");
    if !yes && !confirm("Apply these changes?").await? {
        return Ok(PatchReport::default());
    }

    let report = modman_ops::patch(ctx, session).await?;
    modman_ops::refresh(ctx, session, false).await?;
    Ok(report)
}

async fn confirm(prompt: &'static str) -> Result<bool, CliError> {
    tokio::task::spawn_blocking(move || {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))
    })
    .await
    .map_err(|e| CliError::Prompt(e.to_string()))?
}
