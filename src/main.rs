mod commands;

use commands::{ClassifyArgs, ImportArgs, OpensArgs};

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Bookkeeping helpers for plain text ledgers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate open directives for the accounts used in a ledger file
    Opens(OpensArgs),
    /// Print the ledger account a bank transaction is classified into
    Classify(ClassifyArgs),
    /// Convert an SEB statement export into ledger transactions
    Import(ImportArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Opens(args) => {
            let outcome = commands::opens(&args, &mut out)?;
            eprintln!("{}", outcome);
        }
        Command::Classify(args) => {
            commands::classify(&args, &mut out)?;
        }
        Command::Import(args) => {
            commands::import(&args, &mut out)?;
        }
    }

    Ok(())
}
