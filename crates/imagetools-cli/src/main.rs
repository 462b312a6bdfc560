// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// imagetools: command-line host for the image tools bridge.
//
// Entry point. Initialises logging and configuration, runs one bridge call
// and prints the JSON response on stdout. Logs go to stderr.

mod cli;

use anyhow::Context;
use clap::Parser;

use imagetools_bridge::platform_image_tools;
use imagetools_core::{Response, ToolsConfig};

use cli::{Cli, Cmd};

fn load_config(cli: &Cli) -> anyhow::Result<ToolsConfig> {
    let mut config = match &cli.config {
        Some(path) => ToolsConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ToolsConfig::default(),
    };
    if let Some(dir) = &cli.cache_dir {
        config = config.with_cache_dir(dir);
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<Response> {
    let tools = platform_image_tools(load_config(&cli)?);
    tracing::debug!(platform = tools.platform_name(), "bridge ready");

    let response = match &cli.cmd {
        Cmd::Binarize(args) => tools
            .create_binary_image(args.to_request())
            .await
            .with_context(|| format!("binarizing {}", args.path))?,
        Cmd::Rgba { path } => tools
            .get_image_rgbas(path)
            .await
            .with_context(|| format!("reading pixels of {path}"))?,
    };
    Ok(response)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let pretty = cli.pretty;
    let response = run(cli).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");
    Ok(())
}
