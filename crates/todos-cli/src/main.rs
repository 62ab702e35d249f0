// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::{DemoRuntime, HttpRuntime};
use std::env;
use std::path::PathBuf;
use todos_app::AppState;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `todos --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    logging::init_logging(&config.log_file()?, config.log_level())?;

    let base_url = options
        .base_url
        .as_deref()
        .unwrap_or_else(|| config.api_base_url());
    info!(
        event = "cli.startup",
        config_path = %options.config_path.display(),
        base_url,
        demo = options.demo,
        check = options.check_only
    );

    let client = todos_api::Client::new(base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values or pass --url",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        return run_check(&client, options.demo);
    }

    let mut state = AppState::with_status_filter(config.default_status());
    if options.demo {
        let mut runtime = DemoRuntime::new();
        todos_tui::run_app(&mut state, &mut runtime)
    } else {
        let mut runtime = HttpRuntime::new(client);
        todos_tui::run_app(&mut state, &mut runtime)
    }
}

fn run_check(client: &todos_api::Client, demo: bool) -> Result<()> {
    if demo {
        println!("demo mode: no network check needed");
        return Ok(());
    }

    let todos = client.fetch_todos()?;
    let completed = todos.iter().filter(|todo| todo.completed).count();
    info!(event = "cli.check.completed", count = todos.len(), completed);
    println!(
        "{} todos ({} active, {} completed) from {}",
        todos.len(),
        todos.len() - completed,
        completed,
        client.base_url()
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    base_url: Option<String>,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        base_url: None,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--url requires a base URL"))?;
                options.base_url = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("todos: browse a remote todo list");
    println!("  --config <path>          Use a specific config path");
    println!("  --url <base>             Override [api].base_url for this run");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with generated todos (no network)");
    println!("  --check                  Validate config, fetch once, print counts");
    println!("  --help                   Show this help");
}
