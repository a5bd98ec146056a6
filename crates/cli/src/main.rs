// ABOUTME: CLI binary for the hirek portal article extractor.
// ABOUTME: Reads a saved page from a file or stdin, runs its site adapter and prints the article.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use hirek_core::{decode_html, ContentType, ExtractError, ExtractedArticle, Extractor};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hirek")]
#[command(about = "Extract article metadata and cleaned bodies from Hungarian news portal pages")]
struct Args {
    /// URL the page was fetched from; selects the portal adapter
    #[arg(long = "url", required_unless_present = "list")]
    url: Option<String>,

    /// HTML file to read (default: stdin)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Content-Type header value of the page, used for charset detection
    #[arg(long = "content-type")]
    content_type: Option<String>,

    /// Use this portal's adapter regardless of the URL
    #[arg(short = 'p', long = "portal")]
    portal: Option<String>,

    /// Site file or directory of site files merged over the builtin portals
    #[arg(long = "sites")]
    sites: Vec<PathBuf>,

    /// Output format: html (default), markdown/md, text/txt
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// Output the full article record as JSON
    #[arg(long = "json")]
    json_output: bool,

    /// Compact JSON instead of pretty
    #[arg(long = "compact")]
    compact: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// List the registered portals and exit
    #[arg(long = "list")]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// What a successful run produced.
enum Outcome {
    Printed,
    NoArticle(String),
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(Outcome::Printed) => ExitCode::SUCCESS,
        Ok(Outcome::NoArticle(url)) => {
            eprintln!("no article extracted from {}", url);
            ExitCode::from(3)
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            exit_code(&err)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ExtractError>() {
        Some(e) if e.is_unknown_portal() => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}

fn run(args: &Args) -> Result<Outcome> {
    let content_type = ContentType::from(args.format.as_str());
    let mut builder = Extractor::builder().content_type(content_type);
    for path in &args.sites {
        builder = builder.site_path(path);
    }
    if let Some(portal) = &args.portal {
        builder = builder.portal(portal);
    }
    let extractor = builder.build()?;

    if args.list {
        let listing: Vec<String> = extractor
            .registry()
            .sites()
            .map(|site| format!("{}\t{}", site.id, site.url_prefix))
            .collect();
        emit(args, &listing.join("\n"))?;
        return Ok(Outcome::Printed);
    }

    let url = args.url.as_deref().ok_or_else(|| anyhow!("--url is required"))?;
    let bytes = load_bytes(args.html.as_deref())?;
    let html = decode_html(&bytes, args.content_type.as_deref());

    let Some(article) = extractor.extract_html(&html, url)? else {
        return Ok(Outcome::NoArticle(url.to_string()));
    };
    emit(args, &format_output(args, &article, content_type)?)?;
    Ok(Outcome::Printed)
}

/// JSON record, or the rendered body with a metadata header for markdown.
fn format_output(args: &Args, article: &ExtractedArticle, content_type: ContentType) -> Result<String> {
    if args.json_output {
        let json = if args.compact {
            serde_json::to_string(article)?
        } else {
            serde_json::to_string_pretty(article)?
        };
        return Ok(json);
    }
    Ok(match content_type {
        ContentType::Markdown => article.format_markdown(),
        other => article.content(other),
    })
}

fn emit(args: &Args, text: &str) -> Result<()> {
    match &args.output {
        Some(path) => fs::write(path, format!("{}\n", text))
            .with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn load_bytes(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}
