//! field-hint CLI: run the engine over a page and show the result.
//!
//! Usage:
//!   field-hint attach page.xhtml              # Print transformed markup and a summary
//!   field-hint dump page.xhtml --visible-only # Print the node tree after attachment
//!   field-hint attach page.xhtml --url '#/content/content/edit/1060'

use clap::{Args, Parser, Subcommand};
use field_hint::attach::KeepVisibleReason;
use field_hint::config::EngineConfig;
use field_hint::dump::print_node_tree;
use field_hint::event::DeviceKind;
use field_hint::markup::{outer_markup, parse_document_file};
use field_hint::{Engine, PassReport};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "field-hint")]
#[command(about = "Collapse field descriptions into tooltip indicators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach indicators and print the transformed markup
    Attach {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Attach indicators and print the node tree
    Dump {
        #[command(flatten)]
        run: RunArgs,

        /// Filter lines by tag or class (substring match)
        #[arg(short, long)]
        filter: Option<String>,

        /// Skip hidden subtrees
        #[arg(long)]
        visible_only: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// XHTML page to load
    page: PathBuf,

    /// JSON config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Route the page was opened at; inactive routes are left untouched
    #[arg(long)]
    url: Option<String>,

    /// Treat the host as a touch device
    #[arg(long)]
    touch: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Attach { run } => {
            let (engine, report) = run_engine(&run)?;
            println!("{}", outer_markup(engine.doc(), engine.doc().root()));
            if let Some(report) = report {
                print_report(&report);
            }
        }
        Commands::Dump {
            run,
            filter,
            visible_only,
        } => {
            let (engine, report) = run_engine(&run)?;
            if let Some(report) = report {
                print_report(&report);
            }
            print_node_tree(&engine, filter.as_deref(), visible_only);
        }
    }
    Ok(())
}

/// Load the page, arm the flash guard and run the first discovery pass.
/// Returns no report when the route is inactive.
fn run_engine(run: &RunArgs) -> Result<(Engine, Option<PassReport>), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default(run.config.as_deref());
    let doc = parse_document_file(&run.page)?;
    let device = if run.touch {
        DeviceKind::Touch
    } else {
        DeviceKind::Pointer
    };
    let mut engine = Engine::new(doc, config)?.with_device(device);

    if let Some(url) = &run.url {
        if !engine.route_is_active(url) {
            eprintln!("Route {url} is not an editing route; page left untouched");
            return Ok((engine, None));
        }
    }

    engine.install_flash_guard()?;
    let report = engine.activate()?;
    // Let any debounced work settle.
    engine.advance(Duration::from_millis(engine.config().debounce_ms));
    Ok((engine, Some(report)))
}

fn print_report(report: &PassReport) {
    eprintln!(
        "Attached: {}, Skipped: {}, Kept visible: {}",
        report.attached.len(),
        report.skipped,
        report.kept_visible.len()
    );
    for reason in [
        KeepVisibleReason::TooShort,
        KeepVisibleReason::NoLabel,
        KeepVisibleReason::AlreadyWrapped,
        KeepVisibleReason::Failed,
    ] {
        let count = report.kept_for(reason);
        if count > 0 {
            eprintln!("  {}: {}", reason.as_str(), count);
        }
    }
}
