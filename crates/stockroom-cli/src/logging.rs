// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "STOCKROOM_LOG";

/// Where log lines go. The TUI owns the terminal, so interactive runs log to
/// a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

pub fn filter(configured: &str) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(raw) if !raw.trim().is_empty() => EnvFilter::try_new(&raw)
            .map_err(|error| anyhow!("{LOG_ENV}={raw:?} is not a valid filter ({error})")),
        _ => EnvFilter::try_new(configured)
            .map_err(|error| anyhow!("log.level {configured:?} is not a valid filter ({error})")),
    }
}

pub fn init(configured: &str, target: LogTarget<'_>) -> Result<()> {
    let filter = filter(configured)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match target {
        LogTarget::Stderr => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| {
                    format!("open log file {} -- set [log].file to a writable path", path.display())
                })?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .try_init()
        }
    };

    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}
