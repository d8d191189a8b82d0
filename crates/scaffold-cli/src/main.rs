use std::process;

use scaffold::SCAFFOLD_VERSION;
use scaffold_cli::args::{Parsed, USAGE, parse_args};
use scaffold_cli::failure_note;
use scaffold_cli::logging::{DEFAULT_LEVEL, LogSettings, init_tracing};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = match parse_args(&args, |key| std::env::var(key).ok()) {
        Ok(Parsed::Run(cli)) => cli,
        Ok(Parsed::Help) => {
            print!("{USAGE}");
            return;
        }
        Ok(Parsed::Version) => {
            println!("scaffold {SCAFFOLD_VERSION}");
            return;
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!();
            eprint!("{USAGE}");
            process::exit(2);
        }
    };

    init_tracing(&LogSettings::from_lookup(DEFAULT_LEVEL, |key| std::env::var(key).ok()));

    if let Err(e) = scaffold_cli::run(cli).await {
        eprintln!("error: {e:#}");
        if let Some(note) = failure_note(&e) {
            eprintln!("note: {note}");
        }
        process::exit(1);
    }
}
