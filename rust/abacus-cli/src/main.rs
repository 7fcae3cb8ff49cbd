//! Abacus CLI: evaluate spreadsheet-style expressions against a JSON scope.

use abacus_core::json::scope_from_json;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

// ANSI color helpers
fn green(s: &str) -> String {
    format!("\x1b[32m{}\x1b[0m", s)
}
fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}

#[derive(Parser)]
#[command(
    name = "abacus",
    version,
    about = "Evaluate spreadsheet-style expressions over structured data",
    after_help = "Examples:\n  \
        abacus '1 + 2 * 3'\n  \
        abacus 'price * qty' --scope '{\"price\": 25, \"qty\": 4}'\n  \
        abacus 'sum(orders[*].(qty*price))' --scope-file orders.json\n  \
        abacus 'abs(-1)' --check"
)]
struct Cli {
    /// Expression to evaluate
    expr: String,

    /// Scope as an inline JSON object
    #[arg(long)]
    scope: Option<String>,

    /// Read the scope from a JSON file
    #[arg(long, conflicts_with = "scope")]
    scope_file: Option<PathBuf>,

    /// Only check that the expression parses and compiles
    #[arg(long)]
    check: bool,

    /// Print the result as JSON instead of the display form
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", red(&message));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    if cli.check {
        abacus_rt::validate(&cli.expr).map_err(|err| err.to_string())?;
        println!("{}", green("ok"));
        return Ok(());
    }
    let scope_text = match (&cli.scope, &cli.scope_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|err| format!("cannot read {}: {}", path.display(), err))?,
        (None, None) => "{}".to_string(),
    };
    let scope =
        scope_from_json(&scope_text).map_err(|err| format!("invalid scope JSON: {}", err))?;
    let result = abacus_rt::eval(&cli.expr, &scope).map_err(|err| err.to_string())?;
    if cli.json {
        println!("{}", result.to_json());
    } else {
        println!("{}", result);
    }
    Ok(())
}
