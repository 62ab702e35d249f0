// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV_VAR: &str = "TODOS_LOG";

/// Routes JSON events to `path`. The terminal belongs to the interface, so
/// nothing is written to stdout or stderr.
pub fn init_logging(path: &Path, level: &str) -> Result<()> {
    let file = open_log_file(path)?;
    let filter = build_filter(std::env::var(LOG_ENV_VAR).ok().as_deref(), level)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })
}

fn build_filter(env_value: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(directives) = env_value
        && !directives.trim().is_empty()
    {
        return EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV_VAR} filter {directives:?}"));
    }
    EnvFilter::try_new(level).with_context(|| format!("invalid [log].level {level:?}"))
}
