// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use logging::LogTarget;
use runtime::Backend;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use stockroom_app::{ListView, ListViewOptions};
use time::{Date, OffsetDateTime};

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
            "load config {}; run `stockroom --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_file = config.log_file()?;
    let target = if options.check_only {
        LogTarget::Stderr
    } else {
        LogTarget::File(&log_file)
    };
    logging::init(config.log_level(), target)?;

    let today = today();
    let backend = Backend::from_config(&config, options.demo, today)?;
    tracing::info!(backend = %backend.describe(), "starting");

    if options.check_only {
        let report = runtime::check(&backend)?;
        println!(
            "ok: {} inventory records, {} products from {}",
            report.records,
            report.products,
            backend.describe()
        );
        return Ok(());
    }

    let mut view = ListView::new(list_view_options(&config, today)?);
    stockroom_tui::run_app(&mut view, Arc::new(backend))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn list_view_options(config: &Config, today: Date) -> Result<ListViewOptions> {
    Ok(ListViewOptions {
        sort: config.sort_state()?,
        submit_policy: config.submit_policy()?,
        ..ListViewOptions::new(today)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
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
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
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
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("stockroom: pantry inventory in the terminal");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Launch against seeded in-memory data");
    println!("  --check                  Validate config and fetch once from the backend");
    println!("  --help                   Show this help");
    println!();
    println!("Logs go to [log].file; set {} to override [log].level.", logging::LOG_ENV);
}
