//! bsp-recombine - merge skeleton XHTML with bog-standard paragraphs

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use bsp_recombine::recombine::{DEFAULT_PLACEHOLDER_CLASS, DEFAULT_STRIP_HREF};
use bsp_recombine::{RecombineOptions, run};

#[derive(Parser)]
#[command(name = "bsp-recombine")]
#[command(version, about = "Recombine skeleton and bsps and optionally add title page, creating final xhtml version")]
#[command(long_about = "Recombine skeleton and bsps and optionally add title page, creating final xhtml version.

The title page is generated from the title tag and the author meta tag of the skeleton.")]
#[command(after_help = "EXAMPLES:
    bsp-recombine                                 Use skeleton.xhtml and bsps.xhtml
    bsp-recombine -s ch1.xhtml -o ch1.final.xhtml Recombine a single chapter
    bsp-recombine --notitle                       Skip the title page")]
struct Cli {
    /// Name of 'skeleton' input file
    #[arg(short, long, value_name = "PATH", default_value = "skeleton.xhtml")]
    skeleton: PathBuf,

    /// Name of 'bog standard paragraphs' input file
    #[arg(short, long, value_name = "PATH", default_value = "bsps.xhtml")]
    bsps: PathBuf,

    /// Output file name
    #[arg(short, long, value_name = "PATH", default_value = "recombined.xhtml")]
    output: PathBuf,

    /// Do not insert title page
    #[arg(long)]
    notitle: bool,

    /// Stylesheet href to strip from the head
    #[arg(long, value_name = "HREF", default_value = DEFAULT_STRIP_HREF)]
    strip_href: String,

    /// Class marking placeholder blocks
    #[arg(long, value_name = "CLASS", default_value = DEFAULT_PLACEHOLDER_CLASS)]
    placeholder_class: String,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log each placeholder expansion
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> RecombineOptions {
        RecombineOptions::new()
            .with_skeleton(&self.skeleton)
            .with_library(&self.bsps)
            .with_output(&self.output)
            .with_title_page(!self.notitle)
            .with_strip_href(&self.strip_href)
            .with_placeholder_class(&self.placeholder_class)
    }

    fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(cli.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli.options()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
