use std::{io, path::Path, process};

use clap::{Parser, Subcommand};

use tocspy::{load, parse, render, trace, viewer};

/// Explicit subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Preview a markdown file with a scroll-spy TOC sidebar
    View {
        /// Path to the markdown file
        file: String,
    },
    /// Print the active TOC section for each scroll offset (in CSS pixels)
    Trace {
        /// Path to the markdown file
        file: String,
        /// Scroll offsets, applied in order
        #[arg(required = true, allow_negative_numbers = true)]
        scroll_tops: Vec<f64>,
    },
}

/// Full CLI with explicit subcommands.
#[derive(Parser)]
#[command(
    name = "tocspy",
    version,
    about = "Scroll-spy table-of-contents highlighting",
    after_help = "INVOCATION FORMS:\n  tocspy <file>                         Preview file (legacy)\n  tocspy view <file>                    Preview file\n  tocspy trace <file> <scroll_top>...   Print the active section per offset"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Legacy positional form: tocspy <file>
#[derive(Parser)]
#[command(name = "tocspy", version, about = "Scroll-spy table-of-contents highlighting")]
struct LegacyCli {
    /// Path to a markdown file to preview
    file: String,
}

enum DispatchMode {
    View { file: String },
    Trace { file: String, scroll_tops: Vec<f64> },
}

fn resolve_dispatch_mode() -> DispatchMode {
    match Cli::try_parse() {
        Ok(cli) => match cli.command {
            Commands::View { file } => DispatchMode::View { file },
            Commands::Trace { file, scroll_tops } => DispatchMode::Trace { file, scroll_tops },
        },
        Err(clap_err) => {
            use clap::error::ErrorKind;
            if matches!(
                clap_err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                clap_err.exit();
            }
            // A known subcommand with bad arguments reports its own error.
            let first = std::env::args().nth(1);
            if matches!(first.as_deref(), Some("view" | "trace")) {
                clap_err.exit();
            }
            match LegacyCli::try_parse() {
                Ok(legacy) => DispatchMode::View { file: legacy.file },
                Err(legacy_err) => legacy_err.exit(),
            }
        }
    }
}

/// Load and render `file`, or exit with status 1.
fn open(file: &str) -> render::RenderedDocument {
    let source = load::load_markdown(Path::new(file)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    render::render_document(&parse::parse(&source))
}

pub fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    match resolve_dispatch_mode() {
        DispatchMode::View { file } => {
            log::info!("[view] preview dispatched file={file}");
            let rendered = open(&file);
            ratatui::run(|terminal| viewer::run(terminal, rendered))
        }
        DispatchMode::Trace { file, scroll_tops } => {
            log::info!("[trace] dispatched file={file} offsets={}", scroll_tops.len());
            let rendered = open(&file);
            for line in trace::trace(&rendered, &scroll_tops) {
                println!("{line}");
            }
            Ok(())
        }
    }
}
