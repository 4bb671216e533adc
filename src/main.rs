//! Stub Networking - CLI Entry Point
//!
//! Loads a stub file and resolves one request against it, printing the
//! synthesized response. Handy for checking which stub answers what.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stub_networking::{Interceptor, Method, Request, StubConfig, StubInterceptor, StubRegistry};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "stub-networking",
    about = "HTTP request stubbing engine - resolve requests against a stub file",
    version
)]
struct Args {
    /// Path to stub file
    #[arg(short, long, default_value = "stubs.yaml")]
    stubs: PathBuf,

    /// Request URL to resolve
    url: Option<String>,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    /// Trace every stub evaluated during resolution
    #[arg(long)]
    debug_log: bool,

    /// Dump expected vs. actual for every comparison
    #[arg(long)]
    debug_conditions: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print example stub file and exit
    #[arg(long)]
    print_config: bool,

    /// Validate stub file and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.print_config {
        let example_config = include_str!("../demos/stubs.yaml");
        println!("{}", example_config);
        return Ok(());
    }

    let config = if args.stubs.exists() {
        info!(path = ?args.stubs, "Loading stub file");
        StubConfig::from_file(&args.stubs)?
    } else if args.validate {
        anyhow::bail!("Stub file not found: {:?}", args.stubs);
    } else {
        info!("Using empty stub file");
        StubConfig::default()
    };

    if args.validate {
        println!("Stub file is valid ({} stubs defined)", config.stubs.len());
        return Ok(());
    }

    let mut settings = config.settings;
    settings.print_debug_log |= args.debug_log;
    settings.debug_conditions |= args.debug_conditions;
    settings.apply();

    let registry = Arc::new(StubRegistry::new());
    config.install(&registry)?;

    let Some(url) = args.url else {
        println!("{} stubs installed; pass a URL to resolve a request", registry.len());
        return Ok(());
    };

    let mut request = Request::new(Method::from(args.method.as_str()), url);
    for header in &args.headers {
        let Some((name, value)) = header.split_once(':') else {
            anyhow::bail!("Invalid header (expected \"Name: value\"): {}", header);
        };
        request = request.with_header(name.trim(), value.trim());
    }
    if let Some(data) = args.data {
        request = request.with_body(data);
    }

    let interceptor = StubInterceptor::new(registry);
    let response = interceptor.start(request).await?;

    println!("HTTP {}", response.status);
    for (name, value) in &response.headers {
        println!("{}: {}", name, value);
    }
    if !response.body.is_empty() {
        println!();
        println!("{}", String::from_utf8_lossy(&response.body));
    }

    Ok(())
}
