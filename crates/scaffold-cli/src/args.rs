//! Command-line parsing.
//!
//! Host options come before the command word; everything after it belongs to
//! the plugin and is passed through untouched.

use std::path::PathBuf;
use std::time::Duration;

use scaffold::PluginRequest;

pub const DEFAULT_PROJECT_DIR: &str = "project";

pub const USAGE: &str = "\
Usage: scaffold [OPTIONS] <command> [args...]

Commands:
  init [args...]                Scaffold a new project (directory must not exist)
  create <subtype> [args...]    Add to an existing project, e.g. `create api`

Options:
  --plugin <path>     Plugin executable [env: SCAFFOLD_PLUGIN]
  --dir <dir>         Project directory [env: SCAFFOLD_DIR] [default: project]
  --timeout <secs>    Kill the plugin after this many seconds [env: SCAFFOLD_TIMEOUT]
  -h, --help          Print help
  -V, --version       Print version
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Init,
    Create,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub plugin: PathBuf,
    pub dir: PathBuf,
    pub timeout: Option<Duration>,
    pub kind: CommandKind,
    pub request: PluginRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Run(CliArgs),
    Help,
    Version,
}

/// Parse `args` (including argv[0]). `env` looks up `SCAFFOLD_*` fallbacks.
pub fn parse_args<E>(args: &[String], env: E) -> Result<Parsed, String>
where
    E: Fn(&str) -> Option<String>,
{
    let mut plugin: Option<PathBuf> = None;
    let mut dir: Option<PathBuf> = None;
    let mut timeout: Option<String> = None;

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--plugin" => {
                i += 1;
                plugin = Some(PathBuf::from(
                    args.get(i).ok_or("--plugin requires a value")?,
                ));
            }
            "--dir" => {
                i += 1;
                dir = Some(PathBuf::from(args.get(i).ok_or("--dir requires a value")?));
            }
            "--timeout" => {
                i += 1;
                timeout = Some(args.get(i).ok_or("--timeout requires a value")?.clone());
            }
            "--help" | "-h" => return Ok(Parsed::Help),
            "--version" | "-V" => return Ok(Parsed::Version),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            _ => break,
        }
        i += 1;
    }

    let (kind, request) = build_request(&args[i.min(args.len())..])?;

    let plugin = plugin
        .or_else(|| env("SCAFFOLD_PLUGIN").map(PathBuf::from))
        .ok_or("missing plugin: pass --plugin <path> or set SCAFFOLD_PLUGIN")?;
    let dir = dir
        .or_else(|| env("SCAFFOLD_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_DIR));
    let timeout = timeout
        .or_else(|| env("SCAFFOLD_TIMEOUT"))
        .map(|raw| parse_timeout(&raw))
        .transpose()?;

    Ok(Parsed::Run(CliArgs {
        plugin,
        dir,
        timeout,
        kind,
        request,
    }))
}

/// `init a b` → ("init", [a, b]); `create api a b` → ("create api", [a, b]).
fn build_request(rest: &[String]) -> Result<(CommandKind, PluginRequest), String> {
    let Some(first) = rest.first() else {
        return Err("missing required argument: <command>".to_string());
    };

    match first.as_str() {
        "init" => Ok((
            CommandKind::Init,
            PluginRequest::new("init").with_args(rest[1..].iter().cloned()),
        )),
        "create" => {
            let subtype = rest
                .get(1)
                .ok_or("create requires a subtype, e.g. `create api`")?;
            Ok((
                CommandKind::Create,
                PluginRequest::new(format!("create {subtype}"))
                    .with_args(rest[2..].iter().cloned()),
            ))
        }
        other => Err(format!("unknown command: {other:?}")),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| format!("invalid timeout '{raw}', expected seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("invalid timeout '{raw}', must be positive"));
    }
    Ok(Duration::from_secs_f64(secs))
}
