pub mod args;
pub mod error;
pub mod logging;
pub mod project;

use std::path::Path;

use anyhow::Context;
use scaffold::{ExternalPlugin, PluginRunner, RunError, RunnerConfig, WriteError, materialize};

use crate::args::CliArgs;
use crate::project::prepare_project_dir;

/// Check the project directory, run the plugin, print and write its universe.
pub async fn run(cli: CliArgs) -> anyhow::Result<()> {
    let plugin_path = std::path::absolute(&cli.plugin)
        .with_context(|| format!("invalid plugin path {}", cli.plugin.display()))?;
    let plugin = ExternalPlugin::new(plugin_path, &cli.dir);

    prepare_project_dir(cli.kind, plugin.dir_context())?;

    let mut config = RunnerConfig::new();
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    let runner = PluginRunner::new(config);

    println!(
        "Running: {} {} {}",
        plugin.path.display(),
        cli.request.command,
        cli.request.args.join(" ")
    );

    let response = runner
        .run(&plugin, &cli.request)
        .await
        .with_context(|| format!("unable to run plugin {plugin}"))?;

    let pretty = serde_json::to_string_pretty(&response)?;
    println!("Universe:\n{pretty}");

    let report = materialize(plugin.dir_context(), &response.universe)?;
    tracing::info!(
        dir = %display_dir(plugin.dir_context()),
        files = report.written.len(),
        "Project updated"
    );
    Ok(())
}

/// Follow-up hint printed after `err`, if any.
pub fn failure_note(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(RunError::Timeout(_)) = err.downcast_ref::<RunError>() {
        return Some("the plugin was killed; raise --timeout if it needs longer");
    }
    // Unsafe paths are rejected before the first write, so only I/O failures
    // can leave a partial project behind.
    if let Some(WriteError::Io { .. }) = err.downcast_ref::<WriteError>() {
        return Some("files written before the failure were kept; the project may be partially updated");
    }
    None
}

fn display_dir(dir: &Path) -> String {
    dir.canonicalize()
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string()
}
