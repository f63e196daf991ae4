//! Binary entry point: load the catalog, open the audit trail, start the
//! healthcheck, and drive the console until the user quits.
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use hymnal_bot::audit::{fetch_recent_deliveries, open_audit_store, AuditLog};
use hymnal_bot::config::{Cli, Command, ExtractArgs, ServeArgs, UsageArgs};
use hymnal_bot::extract::extract_titles;
use hymnal_bot::logging::{init_file_logger, init_stderr_logger};
use hymnal_bot::{health, run_console, AssetStore, Bot, Catalog, ConsoleApp};

fn main() -> Result<()> {
    match Cli::parse().into_command() {
        Command::Serve(args) => serve(args),
        Command::ExtractTitles(args) => {
            init_stderr_logger();
            extract(args)
        }
        Command::Usage(args) => {
            init_stderr_logger();
            usage(args)
        }
    }
}

/// Everything that can fail here stops the process before it serves anyone.
fn serve(args: ServeArgs) -> Result<()> {
    init_file_logger(&args.data.log_file_path()?)?;

    let catalog = Catalog::load(&args.catalog).context("failed to load hymn catalog")?;
    let conn = open_audit_store(&args.data.audit_db_path()?)?;
    let (addr, _health) = health::spawn(args.port)?;
    info!("bot started; healthcheck on {addr}");

    let bot = Bot::new(
        Arc::new(catalog),
        AssetStore::new(&args.assets),
        AuditLog::new(conn),
    );
    let mut app = ConsoleApp::new(bot, args.user_id);
    run_console(&mut app)?;
    info!("bot stopped");
    Ok(())
}

fn extract(args: ExtractArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let rows = extract_titles(&text, args.collection);
    let body = rows.join("\n");

    match &args.output {
        Some(path) => {
            fs::write(path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {} rows to {}", rows.len(), path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn usage(args: UsageArgs) -> Result<()> {
    let conn = open_audit_store(&args.data.audit_db_path()?)?;
    let deliveries = fetch_recent_deliveries(&conn, args.limit)?;

    let mut out = io::stdout().lock();
    for delivery in deliveries {
        writeln!(
            out,
            "{} | user_id={} | collection={} | hymn_number={}",
            delivery.delivered_at, delivery.user_id, delivery.collection, delivery.number
        )?;
    }
    Ok(())
}
