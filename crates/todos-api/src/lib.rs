// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::Deserialize;
use std::time::Duration;
use todos_app::{LoadFailure, Todo, User, UserId};
use tracing::{error, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://mate-academy.github.io/react_dynamic-list-of-todos/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const TODOS_PATH: &str = "todos.json";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        if timeout.is_zero() {
            bail!("api.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn todos_url(&self) -> Result<Url> {
        self.base_url
            .join(TODOS_PATH)
            .with_context(|| format!("build todos URL from {}", self.base_url))
    }

    pub fn user_url(&self, id: UserId) -> Result<Url> {
        self.base_url
            .join(&format!("users/{id}.json"))
            .with_context(|| format!("build user URL from {}", self.base_url))
    }

    /// Reads the whole collection. Every failure mode collapses into a
    /// [`LoadFailure`].
    pub fn fetch_todos(&self) -> Result<Vec<Todo>, LoadFailure> {
        let url = self
            .todos_url()
            .map_err(|error| LoadFailure::new(format!("{error:#}")))?;
        info!(event = "api.todos.fetch_started", url = %url);

        match self.get_json::<Vec<Todo>>(&url, "decode todo list") {
            Ok(todos) => {
                info!(
                    event = "api.todos.fetch_completed",
                    url = %url,
                    count = todos.len()
                );
                Ok(todos)
            }
            Err(failure) => {
                let cause = format!("{failure:#}");
                error!(event = "api.todos.fetch_failed", url = %url, error = %cause);
                Err(LoadFailure::new(cause))
            }
        }
    }

    pub fn fetch_user(&self, id: UserId) -> Result<User> {
        let url = self.user_url(id)?;
        info!(event = "api.user.fetch_started", url = %url, user_id = id.get());

        let result = self.get_json::<User>(&url, "decode user");
        match &result {
            Ok(user) => info!(
                event = "api.user.fetch_completed",
                user_id = id.get(),
                name = user.name.as_str()
            ),
            Err(failure) => error!(
                event = "api.user.fetch_failed",
                user_id = id.get(),
                error = %format!("{failure:#}")
            ),
        }
        result
    }

    fn get_json<T>(&self, url: &Url, what: &'static str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;
        let response = ensure_success(response)?;
        response.json::<T>().context(what)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("api.base_url must not be empty");
    }

    let url = Url::parse(&format!("{trimmed}/"))
        .with_context(|| format!("api.base_url {raw:?} is not a valid URL"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("api.base_url {raw:?} uses unsupported scheme {other:?}; use http or https"),
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(clean_error_response(status, &body))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [api].base_url or pass --url ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains(['{', '<']) {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}
