//! `phonebook-admin`: maintenance commands for a phone book deployment.
//!
//! - `hash-password` prints configuration for a salted password digest.
//! - `generate` builds the baseline data source from a spreadsheet.
//! - `status` summarizes a file-backed store (override and lockout).
//!
//! Logging goes to stderr and is controlled by `PHONEBOOK_LOG`
//! (default `warn`).

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use phonebook_core::{
    AdminConfig, Clock, DIGEST_PREFIX, FileStore, LockoutLedger, OverrideStore, PhonebookError,
    Result, Sha256Digest, SystemClock, format_duration, iso_timestamp, load_theme,
    read_source_rows, render_generated_source,
};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Maintenance commands for a phone book deployment.
#[derive(Parser, Debug)]
#[command(name = "phonebook-admin")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a salted SHA-256 admin password configuration
    HashPassword {
        /// Admin password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Salt to use (random when omitted)
        #[arg(long)]
        salt: Option<String>,
    },

    /// Generate the baseline data source from an .xlsx or .csv export
    Generate {
        /// Input spreadsheet
        #[arg(long, default_value = "PhoneBook.xlsx")]
        input: PathBuf,

        /// Output data-source file
        #[arg(long, default_value = "mobile/phonebook_data.js")]
        output: PathBuf,

        /// Sheet name to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Show the stored override and lockout state of a file-backed store
    Status {
        /// Store directory
        #[arg(long)]
        store: PathBuf,
    },
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_env("PHONEBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::HashPassword { password, salt } => hash_password(password, salt),
        Command::Generate {
            input,
            output,
            sheet,
        } => generate(&input, &output, sheet.as_deref()),
        Command::Status { store } => status(store),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn hash_password(password: Option<String>, salt: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };
    if password.is_empty() {
        return Err(PhonebookError::MissingPassword);
    }
    let salt = salt.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    let digest = Sha256Digest::detect().digest_hex(&format!("{salt}:{password}"));
    let config = AdminConfig::with_digest(salt, format!("{DIGEST_PREFIX}{digest}"));

    println!("Environment:\n");
    println!("PHONEBOOK_ADMIN_PASSWORD_SALT={}", config.password_salt);
    println!("PHONEBOOK_ADMIN_PASSWORD_HASH={}", config.password_hash);
    println!("\nOr as an admin config file:\n");
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!(
        "\nTip: keep your password safe. Anyone who knows it can edit the phone book on that device."
    );
    Ok(())
}

fn read_password() -> Result<String> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password("Admin password: ").map_err(|err| {
            PhonebookError::InvalidConfig {
                reason: format!("could not read password: {err}"),
            }
        });
    }
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| PhonebookError::InvalidConfig {
            reason: format!("could not read password from stdin: {err}"),
        })?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn generate(input: &Path, output: &Path, sheet: Option<&str>) -> Result<()> {
    let rows = read_source_rows(input, sheet)?;
    let source_name = input
        .file_name()
        .map_or_else(|| input.display().to_string(), |name| name.to_string_lossy().into_owned());
    let generated_at = iso_timestamp(SystemClock.now_ms());
    let text = render_generated_source(&rows.records, &source_name, &generated_at)?;

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(output, text)?;
    println!("Wrote {} records to {}", rows.records.len(), output.display());
    Ok(())
}

fn status(root: PathBuf) -> Result<()> {
    let store = FileStore::new(root);
    let now = SystemClock.now_ms();

    println!("Store: {}", store.root().display());
    match OverrideStore::new(&store).load() {
        Some(payload) => println!(
            "Override: {} records, saved {}",
            payload.data.len(),
            payload.saved_at.as_deref().unwrap_or("(unknown)")
        ),
        None => println!("Override: none (baseline active)"),
    }

    let lock = LockoutLedger::new(&store).load();
    if lock.is_locked(now) {
        println!(
            "Lockout: {} failures, locked for {}",
            lock.failure_count,
            format_duration(lock.remaining_ms(now))
        );
    } else {
        println!("Lockout: {} failures, not locked", lock.failure_count);
    }

    if let Some(theme) = load_theme(&store) {
        println!("Theme: {theme:?}");
    }
    Ok(())
}
