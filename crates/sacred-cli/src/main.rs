//! `SacredSecret` CLI — sign-up validation from the terminal.
//!
//! Runs the same validation engine as the web sign-up page locally, and talks
//! to `sacred-server` only to register a form that is already valid.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod client;
mod prompt;

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;

use sacred_core::signup::fields;
use sacred_core::{FormState, FormValidationEngine, ValidationResult, password};

use crate::client::Client;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

static COLOR: AtomicBool = AtomicBool::new(true);

/// `code`, or nothing when color is disabled.
pub(crate) fn paint(code: &'static str) -> &'static str {
    if COLOR.load(Ordering::Relaxed) { code } else { "" }
}

const BANNER_SMALL: &str = "⟐ SacredSecret";

// ── CLI structure ────────────────────────────────────────────────────

/// SacredSecret — secure your digital legacy.
#[derive(Parser)]
#[command(
    name = "sacred",
    version,
    about = "SacredSecret CLI — check passwords, validate sign-up fields, create an account",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         SACRED_ADDR   Server address (default: http://127.0.0.1:8300)\n\n\
         {DIM}Examples:{RESET}\n  \
         sacred criteria\n  \
         sacred check-password 'Abcdef1!'\n  \
         sacred validate email jane@example.com\n  \
         sacred validate confirmPassword 'Abcdef1!' --set password='Abcdef1!'\n  \
         sacred signup"
    ),
)]
struct Cli {
    /// SacredSecret server address.
    #[arg(long, env = "SACRED_ADDR", default_value = "http://127.0.0.1:8300")]
    addr: String,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the password criteria.
    Criteria,
    /// Show which password criteria a password meets.
    CheckPassword {
        /// Password to check.
        password: String,
    },
    /// Validate one sign-up field.
    Validate {
        /// Field name (fullName, email, phone, country, password, confirmPassword).
        field: String,
        /// Field value.
        value: String,
        /// Other field values, as `field=value` (repeatable).
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },
    /// Fill in the sign-up form on stdin and register.
    Signup,
    /// Show server health.
    Status,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{}{}{icon} {title}{}", paint(BOLD), paint(CYAN), paint(RESET));
    println!(
        "{}─────────────────────────────────────────{}",
        paint(DIM),
        paint(RESET)
    );
}

fn kv_line(key: &str, value: &str) {
    println!(
        "  {}{key:<20}{} {}{value}{}",
        paint(DIM),
        paint(RESET),
        paint(WHITE),
        paint(RESET)
    );
}

pub(crate) fn success(msg: &str) {
    println!("{}{}✓{} {msg}", paint(GREEN), paint(BOLD), paint(RESET));
}

pub(crate) fn failure(msg: &str) {
    println!("{}{}✗{} {msg}", paint(RED), paint(BOLD), paint(RESET));
}

fn warning(msg: &str) {
    println!(
        "{}{}⚠{} {}{msg}{}",
        paint(YELLOW),
        paint(BOLD),
        paint(RESET),
        paint(YELLOW),
        paint(RESET)
    );
}

/// One checklist line per criterion.
pub(crate) fn print_checklist(statuses: &[password::CriterionStatus]) {
    for status in statuses {
        if status.met {
            println!(
                "    {}✓{} {}{}{}",
                paint(GREEN),
                paint(RESET),
                paint(GREEN),
                status.label,
                paint(RESET)
            );
        } else {
            println!(
                "    {}✗{} {}{}{}",
                paint(RED),
                paint(RESET),
                paint(DIM),
                status.label,
                paint(RESET)
            );
        }
    }
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        COLOR.store(false, Ordering::Relaxed);
    }
    let client = Client::new(cli.addr);

    match run(client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!(
                "  {}{}✗ Error:{} {e:#}",
                paint(RED),
                paint(BOLD),
                paint(RESET)
            );
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(client: Client, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Criteria => {
            cmd_criteria();
            Ok(())
        }
        Commands::CheckPassword { password } => cmd_check_password(&password),
        Commands::Validate { field, value, set } => cmd_validate(&field, &value, &set),
        Commands::Signup => prompt::cmd_signup(&client).await,
        Commands::Status => cmd_status(&client).await,
    }
}

fn cmd_criteria() {
    header("🔑", "Password must contain");
    for (i, criterion) in password::criteria().iter().enumerate() {
        println!("  {}{}.{} {}", paint(DIM), i + 1, paint(RESET), criterion.label);
    }
    println!();
}

fn cmd_check_password(candidate: &str) -> Result<()> {
    header("🔑", "Password check");
    let statuses = password::checklist(candidate);
    print_checklist(&statuses);
    println!();

    let failed = statuses.iter().filter(|s| !s.met).count();
    if failed > 0 {
        bail!("password fails {failed} of {} criteria", statuses.len());
    }
    success("Password meets all criteria");
    Ok(())
}

fn cmd_validate(field: &str, value: &str, set: &[String]) -> Result<()> {
    let engine = FormValidationEngine::signup();
    let Some(rule) = engine.rule(field) else {
        bail!(
            "unknown field '{field}' (expected one of: {})",
            fields::ALL.join(", ")
        );
    };

    let mut snapshot: FormState = parse_kv_pairs(set)?.into_iter().collect();
    snapshot.set(field, value);

    let result = engine.evaluate(field, value, &snapshot);
    match &result {
        ValidationResult::Valid => success(&format!("{} is valid", rule.label)),
        ValidationResult::Invalid { message } => failure(message),
    }
    if let Some(statuses) = engine.criteria_for(field, value) {
        print_checklist(&statuses);
    }

    if let Some(message) = result.message() {
        bail!("{field}: {message}");
    }
    Ok(())
}

async fn cmd_status(client: &Client) -> Result<()> {
    println!();
    println!(
        "  {BANNER_SMALL} {}checking health...{}",
        paint(DIM),
        paint(RESET)
    );
    println!();

    let resp = client
        .get("/v1/sys/health")
        .await
        .context("server unreachable")?;

    header("🩺", "Server Status");
    kv_line("Address", client.addr());
    kv_line(
        "Status",
        resp.get("status").and_then(Value::as_str).unwrap_or("unknown"),
    );
    kv_line(
        "Version",
        resp.get("version").and_then(Value::as_str).unwrap_or("unknown"),
    );
    if resp.get("status").and_then(Value::as_str) != Some("ok") {
        warning("server reported a degraded status");
    }
    println!();
    Ok(())
}

fn parse_kv_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("invalid field=value pair: '{pair}'"))?;
        map.insert(key.to_owned(), value.to_owned());
    }
    Ok(map)
}
