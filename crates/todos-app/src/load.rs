// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

pub const LOAD_FAILURE_NOTICE: &str = "Could not load the todos";

/// Any transport, status, or decode failure of the one-time collection fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not load the todos: {cause}")]
pub struct LoadFailure {
    cause: String,
}

impl LoadFailure {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Pending,
    Settled,
}

/// A blocking alert; input is swallowed until it is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    pub fn load_failed() -> Self {
        Self {
            message: LOAD_FAILURE_NOTICE.to_owned(),
        }
    }
}
