use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use sailhouse_schema::{
    ApplyOptions, ApplyOutcome, DEFAULT_KEY, MAX_KEY_LEN, ReconcileContext, Reconciler, RunResult,
    YamlSchemaLoader, schema_path, starter_schema,
};

use crate::cli::{OutputFormat, SchemaApplyArgs, SchemaCreateArgs};
use crate::client::{SailhouseClient, SchemaGateway};
use crate::config::Session;
use crate::console::TerminalConsole;
use crate::output::{print_data, print_success, print_warning};

pub fn create(args: &SchemaCreateArgs) -> Result<()> {
    let key = args.key.as_deref().unwrap_or(DEFAULT_KEY);
    if key.is_empty() || key.chars().count() > MAX_KEY_LEN {
        anyhow::bail!("Key must be between 1 and {MAX_KEY_LEN} characters");
    }
    let path = schema_path(args.name.as_deref());
    write_new(&path, &starter_schema(key, args.empty))?;
    print_success(&format!("Created schema {}", path.display().to_string().cyan()));
    Ok(())
}

/// Writes `content` to `path`, refusing to replace an existing file.
fn write_new(path: &Path, content: &str) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            anyhow::bail!("Schema file {} already exists", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub async fn apply(
    client: &SailhouseClient,
    session: &Session,
    args: &SchemaApplyArgs,
) -> Result<()> {
    let team = session.team()?;
    let app = session.app(client, team).await?;
    let gateway = SchemaGateway::new(client, team);
    let path = schema_path(args.name.as_deref());
    let options = ApplyOptions {
        dry_run: args.dry_run,
        auto_confirm: args.yes,
    };
    let mut console = TerminalConsole::stdio(session.format);

    let result = Reconciler::new(&YamlSchemaLoader, &gateway)
        .reconcile(&path, &ReconcileContext::new(app), options, &mut console)
        .await;
    let result = match result {
        Ok(result) => result,
        Err(e) if !e.is_fatal() => {
            print_warning(&e.to_string());
            return Ok(());
        }
        Err(e) => {
            tracing::debug!(category = %e.category(), "schema apply aborted");
            return Err(e.into());
        }
    };
    report(&result, session.format)
}

fn report(result: &RunResult, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Text {
        print_data(result, format, |_| {})?;
    }
    let total = result.changes.len();
    match &result.outcome {
        ApplyOutcome::Failed {
            completed,
            change,
            error,
        } => {
            anyhow::bail!("Stopped after {completed} of {total} changes: {change} failed: {error}")
        }
        _ if format != OutputFormat::Text => {}
        ApplyOutcome::Applied { count } => {
            print_success(&format!("Applied {count} changes to key {}", result.key.cyan()));
        }
        ApplyOutcome::DryRun => println!("Dry run: no changes applied"),
        ApplyOutcome::Declined => println!("Cancelled: no changes applied"),
        ApplyOutcome::NoChanges => {}
    }
    Ok(())
}
