// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod startup;
pub mod supervisor;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, render_to_file, RenderContext, TemplateRenderer};
use crate::errors::{Result, ZonewatchError};
use crate::exec::{RebuildCommand, RebuildCoordinator};
use crate::fs::{FileSystem, RealFileSystem};
use crate::startup::{wait_for_directory, DEFAULT_POLL_INTERVAL};
use crate::supervisor::{CurrentProcess, ProcessSupervisor, ServerCommand};
use crate::watch::{spawn_watcher, ChangePipeline};

/// High-level entry point used by `main.rs`.
///
/// This wires together, in order:
/// - zone description loading and named.conf rendering
/// - the startup gate on `--make-path`
/// - one synchronous rebuild
/// - the file watcher (background) and the supervision loop (foreground)
/// - Ctrl-C handling
///
/// Returns once supervision ends. An error exit of named tears everything
/// down, watcher included, and is reported as
/// [`ZonewatchError::SupervisionEnded`].
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;

    if args.dry_run {
        let rendered = render_config(&fs, &args, false)?;
        print!("{rendered}");
        debug!("dry-run complete (nothing started)");
        return Ok(());
    }

    render_config(&fs, &args, true)?;

    wait_for_directory(&fs, &args.make_path, args.initial_wait, DEFAULT_POLL_INTERVAL).await?;

    let coordinator = Arc::new(RebuildCoordinator::new(RebuildCommand::make(
        &args.make_binary,
    )));
    coordinator.run(&args.make_path).await;

    let current = CurrentProcess::new();
    let pipeline = ChangePipeline::new(
        Arc::clone(&coordinator),
        current.clone(),
        args.make_path.clone(),
    );
    let watcher = spawn_watcher(&args.path, args.recursive, pipeline)?;
    debug!(?watcher, "watch subscription active");

    let server = ServerCommand::named(
        &args.named_binary,
        &args.bind_config,
        &args.bind_user,
        args.port,
    );
    let supervisor = ProcessSupervisor::new(server, current);

    let outcome = tokio::select! {
        end = supervisor.run() => Err(ZonewatchError::SupervisionEnded(end.to_string())),
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "failed to listen for Ctrl+C");
            }
            info!("shutdown requested; stopping name server");
            Ok(())
        }
    };

    // The supervisor future (and the child with it) is gone by now; stop
    // watching as well.
    drop(watcher);
    outcome
}

/// Load the zone description and render named.conf from the template.
///
/// With `write` set the result goes to `--bind-config`; otherwise it is only
/// returned (used by `--dry-run`).
fn render_config(fs: &dyn FileSystem, args: &CliArgs, write: bool) -> Result<String> {
    let cfg = load_and_validate(fs, &args.config)?;
    let ctx = RenderContext {
        config: &cfg,
        port: args.port,
        user: &args.bind_user,
    };

    if write {
        return render_to_file(fs, &args.config_template, &args.bind_config, &ctx);
    }

    let template = fs.read_to_string(&args.config_template).map_err(|e| {
        ZonewatchError::TemplateError(format!(
            "cannot read template file {:?}: {e:#}",
            args.config_template
        ))
    })?;
    TemplateRenderer::new()?.render(&template, &ctx)
}
