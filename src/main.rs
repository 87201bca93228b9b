use anyhow::{Context, Result};
use calltree::{cli::Cli, CallTreePrinter, PrinterOptions, ProfileResult};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the profile snapshot from a file or stdin
fn load_profile(args: &Cli) -> Result<ProfileResult> {
    if args.reads_stdin() {
        let mut json = String::new();
        io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read profile from stdin")?;
        ProfileResult::from_json_str(&json).context("Failed to load profile from stdin")
    } else {
        ProfileResult::from_file(&args.profile)
            .with_context(|| format!("Failed to load profile {}", args.profile.display()))
    }
}

fn load_options(args: &Cli) -> Result<PrinterOptions> {
    let base = match &args.config {
        Some(path) => PrinterOptions::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PrinterOptions::default(),
    };
    Ok(args.printer_options(base))
}

/// Export into the requested sink
fn export(printer: &CallTreePrinter, profile: &ProfileResult, args: &Cli) -> Result<()> {
    let summary = match &args.output {
        Some(path) => {
            // Render first so a failed export leaves an existing file intact
            let mut rendered = Vec::new();
            let summary = printer.print(profile, &mut rendered)?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            out.write_all(&rendered)?;
            out.flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
            summary
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let summary = printer.print(profile, &mut out)?;
            out.flush()?;
            summary
        }
    };

    tracing::info!(
        "Exported {} threads, {} blocks",
        summary.threads,
        summary.blocks_written
    );
    if summary.blocks_skipped > 0 {
        eprintln!(
            "calltree: skipped {} block(s) with unresolvable source paths",
            summary.blocks_skipped
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let options = load_options(&args)?;
    let mut profile = load_profile(&args)?;
    if let Some(mode) = &args.measure_mode {
        profile.measure_mode = mode.clone();
    }

    let printer = CallTreePrinter::new(options);
    export(&printer, &profile, &args)?;

    Ok(())
}
