use libbookie::classify::fees::KeywordFees;
use libbookie::seb::{self, SebImporter};
use libbookie::{
    input_not_found, scan, AccountPath, BankContext, Classifier, Config, Direction,
    DirectiveGenerator, Generated, Header, LedgerError, OpenRegistry, Transaction,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, ValueEnum};

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "accounts.beancount";

#[derive(Args, Debug)]
pub struct OpensArgs {
    /// Ledger file to scan for account names
    pub input: PathBuf,

    /// Output file for the open directives [default: accounts.beancount]
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print directives to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Append to the output file instead of overwriting it
    #[arg(short, long)]
    pub append: bool,

    /// File with existing open directives, accounts opened there are skipped
    #[arg(long, value_name = "PATH")]
    pub check_existing: Option<PathBuf>,

    /// Date to open accounts at [default: 1900-01-01]
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub open_date: Option<NaiveDate>,

    /// Currency for accounts without one of their own [default: EUR]
    #[arg(long, value_name = "CUR")]
    pub currency: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// `target` is `None` when printed to stdout.
    Written {
        count: usize,
        target: Option<PathBuf>,
        appended: bool,
    },
    NoAccountsDiscovered,
    NoNewAccounts,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Written {
                count,
                target: Some(path),
                appended,
            } => write!(
                f,
                "{} '{}' - {} open directives generated.",
                if *appended { "Appended to" } else { "Written to" },
                path.display(),
                count
            ),
            Outcome::Written { count, target: None, .. } => {
                write!(f, "{} open directives generated.", count)
            }
            Outcome::NoAccountsDiscovered => write!(f, "No accounts found in the input file."),
            Outcome::NoNewAccounts => write!(f, "All accounts already have open directives."),
        }
    }
}

fn config(open_date: Option<NaiveDate>, currency: Option<&str>) -> Result<Config> {
    let mut config = Config::standard()?;
    if let Some(date) = open_date {
        config = config.with_open_date(date);
    }
    if let Some(currency) = currency {
        config = config.with_default_currency(currency)?;
    }
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| input_not_found(path.to_path_buf()))
}

/// A missing file is the first run state, anything else unreadable is
/// reported and treated the same way.
fn load_registry(path: &Path) -> OpenRegistry {
    log::info!("Checking for existing opens in '{}'...", path.display());
    match fs::read_to_string(path) {
        Ok(text) => {
            let registry = OpenRegistry::load(&text);
            if !registry.is_empty() {
                log::info!("Found {} existing open directives.", registry.len());
            }
            registry
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("'{}' does not exist yet", path.display());
            OpenRegistry::new()
        }
        Err(e) => {
            log::warn!(
                "Could not read existing opens from '{}': {}",
                path.display(),
                e
            );
            OpenRegistry::new()
        }
    }
}

/// Modification time of the input, so an unchanged input renders the same header.
fn modified(path: &Path) -> DateTime<Utc> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_default()
}

fn write_output(path: &Path, content: &str, append: bool) -> Result<()> {
    let written = if append {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| {
                file.write_all(b"\n")?;
                file.write_all(content.as_bytes())
            })
    } else {
        fs::write(path, content)
    };
    written.with_context(|| LedgerError::new("cannot write output").with_context(path.to_path_buf()))
}

pub fn opens<W: Write>(args: &OpensArgs, out: &mut W) -> Result<Outcome> {
    let config = config(args.open_date, args.currency.as_deref())?;

    log::info!("Scanning '{}' for account names...", args.input.display());
    let input = read_input(&args.input)?;
    let discovered = scan(&input);
    if !discovered.is_empty() {
        log::info!("Found {} unique accounts.", discovered.len());
    }

    let existing = match &args.check_existing {
        Some(path) if !discovered.is_empty() => load_registry(path),
        _ => OpenRegistry::new(),
    };

    let generated =
        DirectiveGenerator::new(&config).generate(&discovered, &existing, config.open_date());
    let count = match generated {
        Generated::Sections(_) => generated.count(),
        Generated::NoAccountsDiscovered => return Ok(Outcome::NoAccountsDiscovered),
        Generated::NoNewAccounts => return Ok(Outcome::NoNewAccounts),
    };

    let header = Header {
        source: args.input.display().to_string(),
        generated_on: modified(&args.input),
    };
    let content = format!("{}{}", header, generated.render());

    if args.stdout {
        out.write_all(content.as_bytes())?;
        return Ok(Outcome::Written {
            count,
            target: None,
            appended: false,
        });
    }

    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    write_output(&target, &content, args.append)?;
    Ok(Outcome::Written {
        count,
        target: Some(target),
        appended: args.append,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Side {
    #[value(alias = "D")]
    Debit,
    #[value(alias = "C")]
    Credit,
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::Debit => Direction::Debit,
            Side::Credit => Direction::Credit,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Bank the transaction comes from, selects its fee rules
    #[arg(long, default_value = "")]
    pub bank: String,

    #[arg(long, default_value = "")]
    pub payee: String,

    #[arg(long, default_value = "")]
    pub explanation: String,

    /// Transaction type code
    #[arg(long = "type", value_name = "CODE", default_value = "")]
    pub txn_type: String,

    #[arg(long, value_enum, default_value_t = Side::Debit)]
    pub direction: Side,

    /// Counterparty account, a transfer when it is a valid account path
    #[arg(long, value_name = "ACCOUNT", default_value = "")]
    pub counterparty: String,
}

pub fn classify<W: Write>(args: &ClassifyArgs, out: &mut W) -> Result<AccountPath> {
    let config = Config::standard()?;
    let mut classifier = Classifier::new(&config);
    if !args.bank.trim().is_empty() {
        classifier = classifier.with_fee_hook(&args.bank, KeywordFees::for_bank(&args.bank));
    }

    let txn = Transaction::new(args.direction.into())
        .payee(&args.payee)
        .explanation(&args.explanation)
        .txn_type(&args.txn_type)
        .counterparty(&args.counterparty);
    let result = classifier.explain(&txn, &BankContext::new(&args.bank));
    log::debug!("classified by {:?} {:?}", result.step, result.rule);

    writeln!(out, "{}", result.account)?;
    Ok(result.account)
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// SEB statement export (CSV)
    pub statement: PathBuf,

    /// Account holding the statement, the client account suffix is appended
    #[arg(long, value_name = "ACCOUNT", default_value = "Assets:EE:SEB")]
    pub prefix: String,

    /// Do not emit open directives for the accounts the transactions use
    #[arg(long)]
    pub no_opens: bool,

    /// File with existing open directives, accounts opened there are not opened again
    #[arg(long, value_name = "PATH")]
    pub check_existing: Option<PathBuf>,
}

pub fn import<W: Write>(args: &ImportArgs, out: &mut W) -> Result<usize> {
    let config = Config::standard()?;
    let prefix = AccountPath::parse(&args.prefix)?;

    let input = read_input(&args.statement)?;
    if !SebImporter::identify(&input) {
        return Err(anyhow!(
            "'{}' is not an SEB statement export",
            args.statement.display()
        ));
    }

    let classifier = SebImporter::classifier(&config);
    let importer = SebImporter::new(prefix).with_open_directives(!args.no_opens);
    let entries = importer.extract(&input, &classifier)?;
    if let Some(date) = SebImporter::date(&entries) {
        log::info!("Statement runs until {}.", date);
    }

    let existing = match &args.check_existing {
        Some(path) => load_registry(path),
        None => OpenRegistry::new(),
    };
    let opens = importer.open_directives(&entries, &existing);
    out.write_all(seb::render(&opens, &entries).as_bytes())?;
    Ok(entries.len())
}
