use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when neither `RUST_LOG` nor `SCAFFOLD_LOG` is set.
pub const DEFAULT_LEVEL: &str = "info";

/// Subscriber configuration resolved from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directives.
    pub directives: String,
    pub json: bool,
}

impl LogSettings {
    /// `RUST_LOG` is taken verbatim. Otherwise `SCAFFOLD_LOG` picks one level
    /// for the scaffold crates, falling back to `default_level` when unset or
    /// unrecognized. `LOG_FORMAT=json` selects JSON lines.
    pub fn from_lookup(default_level: &str, env: impl Fn(&str) -> Option<String>) -> Self {
        let directives = match env("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw,
            None => {
                let level = match env("SCAFFOLD_LOG").as_deref() {
                    Some("trace") => "trace",
                    Some("debug") => "debug",
                    Some("info") => "info",
                    Some("warn") | Some("warning") => "warn",
                    Some("error") => "error",
                    _ => default_level,
                };
                format!("scaffold={level},scaffold_cli={level}")
            }
        };

        Self {
            directives,
            json: env("LOG_FORMAT").as_deref() == Some("json"),
        }
    }
}

/// Install the global subscriber. Logs go to stderr: stdout carries the
/// printed universe.
pub fn init_tracing(settings: &LogSettings) {
    let filter = EnvFilter::try_new(&settings.directives).unwrap_or_else(|e| {
        eprintln!("warning: ignoring invalid log filter {:?}: {e}", settings.directives);
        EnvFilter::new(format!(
            "scaffold={DEFAULT_LEVEL},scaffold_cli={DEFAULT_LEVEL}"
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if settings.json {
        let _ = registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init();
    } else {
        let _ = registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}
