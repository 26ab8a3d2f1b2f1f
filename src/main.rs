//! nyaa-uploader - Main entry point
//!
//! Uploads a release torrent to Nyaa and optionally TokyoTosho.

use anyhow::{Context, Result};
use nyaa_uploader::{
    resolve_explicit, resolve_local, CliArgs, Credentials, Invocation, Pipeline, ResolvedInputs, StatusDisplay,
};
use tracing::{debug, error, info};

/// Set up panic handler for unexpected errors
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();

        match panic_info.location() {
            Some(location) => error!(
                "PANIC occurred at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
            None => error!("PANIC occurred at an unknown location"),
        }
        let payload = panic_info.payload();
        if let Some(s) = payload.downcast_ref::<&str>() {
            error!("Panic message: {}", s);
        } else if let Some(s) = payload.downcast_ref::<String>() {
            error!("Panic message: {}", s);
        } else {
            error!("Panic message: unknown");
        }
        error!("Backtrace:\n{:?}", backtrace);
    }));
}

#[tokio::main]
async fn main() {
    setup_panic_handler();

    let args = CliArgs::parse_args();
    init_logging(&args);
    debug!("CLI arguments: {:?}", args);

    let verbose = args.is_verbose();
    let quiet = args.is_quiet();

    if let Err(e) = run(args).await {
        let mut display = StatusDisplay::new(verbose, quiet);
        // Nothing left to report to if stdout is gone.
        let _ = report_failure(&mut display, &e);
        std::process::exit(1);
    }
}

/// Print the fatal error once for the user; stderr only gets it at debug level
fn report_failure<W: std::io::Write>(display: &mut StatusDisplay<W>, err: &anyhow::Error) -> std::io::Result<()> {
    debug!("Run failed: {:?}", err);
    display.print_error(&format!("{:#}", err))
}

async fn run(args: CliArgs) -> Result<()> {
    info!("nyaa-uploader starting");

    let credentials = Credentials::load(args.config.as_deref()).context("Failed to load credentials")?;

    let inputs = resolve_inputs(&args)?;
    info!("Video: {}", inputs.video.display());
    info!("Torrent: {}", inputs.torrent.display());

    let invocation = Invocation::from_args(&args, inputs);
    let display = StatusDisplay::new(invocation.verbose, args.is_quiet());

    let mut pipeline = Pipeline::new(credentials, invocation, display).context("Invalid configuration")?;
    pipeline.run().await?;

    info!("nyaa-uploader finished");
    Ok(())
}

/// Resolve the video/torrent pair from flags or the working directory
fn resolve_inputs(args: &CliArgs) -> Result<ResolvedInputs> {
    if args.local {
        let cwd = std::env::current_dir().context("Cannot read the working directory")?;
        let inputs = resolve_local(&cwd, args.torrent.as_deref())?;
        return Ok(inputs);
    }

    match &args.video {
        Some(video) => Ok(resolve_explicit(video, args.torrent.as_deref())),
        None => anyhow::bail!("Either --video or --local is required"),
    }
}

/// Initialize logging based on verbosity settings
fn init_logging(args: &CliArgs) {
    let level = args.log_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if args.is_verbose() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    debug!("Logging initialized with level: {:?}", level);
}
