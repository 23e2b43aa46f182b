mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use filedrop_core::{format_file_size, registry};
use filedrop_ingest::{scan_folder, FileSource, IngestionPipeline, LocalFile, TracingNotifier};
use serde_json::json;
use tracing::info;

use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the JSON report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = CliConfig::parse();
    if config.list_types {
        print_types();
        return Ok(());
    }

    let ingest_config = config.ingest_config();
    ingest_config.validate()?;

    let files = select(&config.paths).await?;
    info!("{} files selected", files.len());

    let pipeline = IngestionPipeline::new(ingest_config, Arc::new(TracingNotifier));
    let outcome = pipeline.ingest(files).await;

    for a in &outcome.accepted {
        info!(
            "attached {} ({}, {})",
            a.display_label(),
            a.type_name(),
            format_file_size(a.size_bytes())
        );
    }

    let report = json!({
        "attachments": pipeline.store().list(),
        "rejected": &outcome.rejected,
        "batchError": &outcome.batch_error,
    });
    let out = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");

    if let Some(rejection) = outcome.batch_error {
        bail!(rejection.message);
    }
    Ok(())
}

/// Expand the command-line paths into file sources, scanning folders.
async fn select(paths: &[PathBuf]) -> Result<Vec<Box<dyn FileSource>>> {
    let mut files: Vec<Box<dyn FileSource>> = Vec::new();
    for path in paths {
        let meta = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("stat {}", path.display()))?;
        if meta.is_dir() {
            let found = scan_folder(path)
                .await
                .with_context(|| format!("scan {}", path.display()))?;
            files.extend(found.into_iter().map(|f| Box::new(f) as Box<dyn FileSource>));
        } else {
            let file = LocalFile::open(path)
                .await
                .with_context(|| format!("open {}", path.display()))?;
            files.push(Box::new(file));
        }
    }
    Ok(files)
}

fn print_types() {
    for t in registry::ALLOWED_TYPES {
        println!(
            "{:<24} {:<10} .{:<6} {}",
            t,
            registry::display_name(t),
            registry::extension_for(t),
            registry::classify(t).as_str()
        );
    }
    println!();
    println!("accept: {}", registry::accept_attribute());
}
