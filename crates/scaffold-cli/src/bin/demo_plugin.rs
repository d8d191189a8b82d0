//! Demo plugin speaking the scaffold protocol.
//!
//! Supports `init --domain <d> [--repo <r>]` and
//! `create api --group <g> --version <v> --kind <k>`.

use std::process;

use scaffold::plugin::{flag, serve};
use scaffold::{PluginRequest, Universe};

fn main() {
    if let Err(e) = serve(handle) {
        eprintln!("scaffold-demo-plugin: {e}");
        process::exit(1);
    }
}

fn handle(req: &PluginRequest) -> Result<Universe, String> {
    // The response carries the full universe, so start from what the host sent.
    let mut universe = req.universe.clone();
    match req.command.as_str() {
        "init" => init(&req.args, &mut universe)?,
        "create api" => create_api(&req.args, &mut universe)?,
        other => return Err(format!("unknown command: {other:?}")),
    }
    Ok(universe)
}

fn init(args: &[String], universe: &mut Universe) -> Result<(), String> {
    let domain = required(args, "--domain", "init")?;
    let mut project = format!("domain: {domain}\n");
    if let Some(repo) = flag(args, "--repo") {
        project.push_str(&format!("repo: {repo}\n"));
    }
    universe.insert("PROJECT".to_string(), project);
    Ok(())
}

fn create_api(args: &[String], universe: &mut Universe) -> Result<(), String> {
    let group = required(args, "--group", "create api")?;
    let version = required(args, "--version", "create api")?;
    let kind = required(args, "--kind", "create api")?;

    let path = format!("api/{version}/{}_types.yaml", kind.to_lowercase());
    universe.insert(
        path.clone(),
        format!("group: {group}\nversion: {version}\nkind: {kind}\n"),
    );
    eprintln!("scaffold-demo-plugin: wrote {path}");
    Ok(())
}

fn required<'a>(args: &'a [String], name: &str, command: &str) -> Result<&'a str, String> {
    flag(args, name).ok_or_else(|| format!("{command} requires {name}"))
}
