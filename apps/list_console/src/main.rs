use std::{io::Write as _, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{FileListSource, HttpListSource, ListMergeClient, ListSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod controller;
mod render;

use commands::{parse_command, CommandError};
use config::{load_settings, validate_lists_url};
use controller::{Console, Flow};

#[derive(Parser, Debug)]
#[command(about = "Browse numbered lists and merge two of them into a new one")]
struct Args {
    /// Settings file; `list_console.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    lists_url: Option<String>,
    /// Read lists from a local JSON file instead of the network.
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Print one JSON line per view instead of text; status rides along in the line.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.lists_url {
        settings.lists_url = url;
        settings.fixture_path = None;
    }
    if let Some(path) = args.fixture {
        settings.fixture_path = Some(path);
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|error| {
        eprintln!("invalid log filter '{}': {error}; using info", settings.log_filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source: Arc<dyn ListSource> = match &settings.fixture_path {
        Some(path) => Arc::new(FileListSource::new(path)),
        None => {
            let url = validate_lists_url(&settings.lists_url)?;
            Arc::new(HttpListSource::with_timeout(
                url.as_str(),
                settings.request_timeout(),
            )?)
        }
    };

    let mut console = Console::new(ListMergeClient::new(source));
    console.load().await;
    draw(&mut console, args.json)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !args.json {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_command(&line) {
            Ok(cmd) => {
                if console.dispatch(cmd).await == Flow::Quit {
                    break;
                }
                draw(&mut console, args.json)?;
            }
            Err(CommandError::Empty) => {}
            Err(err) if args.json => eprintln!("{err}"),
            Err(err) => println!("{err} (type `help` for commands)"),
        }
    }

    Ok(())
}

fn draw(console: &mut Console, json: bool) -> Result<()> {
    let view = console.view();
    let status = console.take_status();
    if json {
        println!("{}", render::render_json(&view, status.as_deref())?);
        return Ok(());
    }
    print!("{}", render::render_text(&view));
    if let Some(status) = status {
        println!("{status}");
    }
    Ok(())
}
