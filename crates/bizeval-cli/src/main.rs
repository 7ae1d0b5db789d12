// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, bail};
use bizeval_app::AppState;
use bizeval_tui::UiOptions;
use config::Config;
use runtime::{ApiRuntime, DemoRuntime, evaluate_once};
use std::env;
use std::path::PathBuf;

const DEMO_SEED: u64 = 42;

fn main() {
    pretty_env_logger::init();
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
            "load config {}; run `bizeval --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let ui_options = UiOptions {
        max_suggestions: config.max_suggestions(),
    };

    if options.demo {
        log::info!("running against the offline demo backend");
        let mut runtime = DemoRuntime::new(DEMO_SEED);
        if options.check_only {
            return Ok(());
        }
        return launch(&options, &mut runtime, ui_options);
    }

    let base_url = options
        .api_url
        .clone()
        .unwrap_or_else(|| config.api_base_url());
    let client = bizeval_api::Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values or pass --api-url",
            options.config_path.display()
        )
    })?;
    log::info!("evaluation service at {}", client.base_url());

    if options.check_only {
        return client.ping();
    }

    let mut runtime = ApiRuntime::new(client);
    launch(&options, &mut runtime, ui_options)
}

fn launch<R: bizeval_tui::AppRuntime>(
    options: &CliOptions,
    runtime: &mut R,
    ui_options: UiOptions,
) -> Result<()> {
    if let (Some(idea), Some(location)) = (&options.idea, &options.location) {
        let report = evaluate_once(runtime, idea, location)?;
        println!("{report}");
        return Ok(());
    }

    let mut state = AppState::default();
    bizeval_tui::run_app(&mut state, runtime, ui_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    api_url: Option<String>,
    idea: Option<String>,
    location: Option<String>,
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
        api_url: None,
        idea: None,
        location: None,
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
            "--api-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--api-url requires a URL"))?;
                options.api_url = Some(value.as_ref().to_owned());
            }
            "--idea" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--idea requires a business idea"))?;
                options.idea = Some(value.as_ref().to_owned());
            }
            "--location" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--location requires a location"))?;
                options.location = Some(value.as_ref().to_owned());
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

    if options.idea.is_some() != options.location.is_some() {
        bail!("--idea and --location must be given together");
    }

    Ok(options)
}

fn print_help() {
    println!("bizeval - evaluate a business idea for a location");
    println!("  --config <path>          Use a specific config path");
    println!("  --api-url <url>          Override the evaluation service base URL");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use the offline demo backend");
    println!("  --check                  Validate config and probe the suggestion endpoints");
    println!("  --idea <text>            Business idea for a one-shot evaluation");
    println!("  --location <text>        Location for a one-shot evaluation");
    println!("  --help                   Show this help");
}
