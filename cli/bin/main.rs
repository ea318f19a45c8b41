use std::path::PathBuf;

use clap::Parser;

use xpathgrep::cli;
use xpathgrep::logger;
use xpathgrep_search::DEFAULT_GLOB;

#[derive(Parser, Debug)]
#[command(
    name = "xpathgrep",
    about = "Search multiple XML files for nodes matching an XPath expression"
)]
struct Args {
    /// XPath expression to search for.
    xpath_expr: String,

    /// File or folder path.
    path: PathBuf,

    /// Glob to filter files when the path is a folder (use ** to recurse).
    #[arg(short, long, default_value = DEFAULT_GLOB)]
    glob: String,

    /// Turn on verbose logging. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write log messages to this file instead of standard error.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose, args.log_file)?;

    let stdout = std::io::stdout();
    cli::search(
        &mut stdout.lock(),
        &args.xpath_expr,
        &args.path,
        &args.glob,
        false,
    )
}
