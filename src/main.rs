use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use markup_bind::{Engine, Options};

/// Render an HTML template against JSON data.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Template file with a single `data-<prefix>-tmpl` root.
    template: PathBuf,
    /// JSON object to bind (string).
    #[arg(long, conflicts_with = "data_file")]
    data: Option<String>,
    /// Read the JSON object to bind from a file.
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// Fail on directive errors instead of logging them.
    #[arg(long)]
    throw_on_error: bool,
    /// Directive attribute prefix (defaults to $MARKUP_PREFIX, then `mu`).
    #[arg(long)]
    prefix: Option<String>,
    /// Extra setting as KEY=VALUE; VALUE is read as JSON when it parses.
    #[arg(long = "setting", value_name = "KEY=VALUE")]
    settings: Vec<String>,
    /// More log output on stderr (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Some(prefix) = args.prefix.as_ref() {
        markup_bind::set_prefix(prefix.clone());
    }

    let template = match std::fs::read_to_string(&args.template) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Cannot read {}: {e}", args.template.display());
            std::process::exit(1);
        }
    };

    let raw = match (&args.data, &args.data_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        (None, None) => "{}".to_string(),
    };
    let data: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON: {e}");
            std::process::exit(1);
        }
    };

    // Build options.
    let mut opts = Options::new().throw_on_error(args.throw_on_error);
    for setting in &args.settings {
        let Some((key, value)) = setting.split_once('=') else {
            eprintln!("Settings must look like KEY=VALUE, got `{setting}`");
            std::process::exit(1);
        };
        let value = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        opts = opts.setting(key, value);
    }

    let rendered = Engine::parse(&template).and_then(|mut engine| {
        engine.init(data, opts)?;
        Ok(engine.into_document().to_html())
    });

    match rendered {
        Ok(html) => println!("{html}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
