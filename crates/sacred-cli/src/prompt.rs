//! Interactive sign-up over stdin.
//!
//! Each line read becomes one field value in a [`FormSession`]. A terminal
//! observer prints every field result as the session produces it, so a
//! mismatched confirmation shows up again when the password changes.

use std::collections::HashMap;
use std::io::{BufRead, Write as _};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use sacred_core::signup::fields;
use sacred_core::{FieldObserver, FieldUpdate, FormSession, SubmitOutcome, ValidationResult};

use crate::client::{Client, ServerRegistrar};
use crate::{BOLD, CYAN, DIM, RESET, failure, paint, print_checklist, success};

/// Prints field results as they arrive.
struct TerminalObserver {
    labels: HashMap<String, String>,
}

impl FieldObserver for TerminalObserver {
    fn on_field_update(&self, update: &FieldUpdate) {
        let label = self
            .labels
            .get(&update.field)
            .map_or(update.field.as_str(), String::as_str);
        match &update.result {
            ValidationResult::Valid => success(label),
            ValidationResult::Invalid { message } => failure(&format!("{label}: {message}")),
        }
        if let Some(criteria) = &update.criteria {
            print_checklist(criteria);
        }
    }
}

pub async fn cmd_signup(client: &Client) -> Result<()> {
    let mut session = FormSession::signup();
    let labels = session
        .engine()
        .rules()
        .iter()
        .map(|r| (r.field_name.clone(), r.label.clone()))
        .collect::<HashMap<_, _>>();
    session.subscribe(Arc::new(TerminalObserver {
        labels: labels.clone(),
    }));

    println!(
        "{}{}Create Your Account{}",
        paint(BOLD),
        paint(CYAN),
        paint(RESET)
    );
    println!(
        "{}Join SacredSecret to secure your digital legacy{}",
        paint(DIM),
        paint(RESET)
    );
    println!();

    {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();
        for field in fields::ALL {
            let label = labels.get(field).map_or(field, String::as_str);
            print!("{}{label}:{} ", paint(BOLD), paint(RESET));
            std::io::stdout().flush().context("failed to flush stdout")?;

            let Some(line) = lines.next() else {
                println!();
                bail!("input ended before the form was complete");
            };
            let line = line.context("failed to read stdin")?;
            session.set_value(field, line.trim_end_matches('\r'));
        }
    }
    println!();

    let registrar = ServerRegistrar::new(client);
    match session.submit(&registrar).await {
        SubmitOutcome::Registered(account) => {
            success(&format!("Account created for {}", account.email));
            println!("  {}id {}{}", paint(DIM), account.id, paint(RESET));
            Ok(())
        }
        SubmitOutcome::Rejected(report) => {
            bail!(
                "{} field(s) need attention, nothing was submitted",
                report.errors().len()
            )
        }
        SubmitOutcome::Failed(e) => Err(e).context("registration failed"),
    }
}
