//! tmpl-resources CLI entry point
//!
//! Parses flags and environment, sets up logging, runs the updater, and turns
//! any failure into a single-line diagnostic plus a non-zero exit code.

use clap::Parser;
use tmpl_resources::cli;
use tmpl_resources::core::user_friendly_error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = cli::Cli::parse();
    let config = cli.build_config();
    let verbose = cli.is_verbose();

    config.init_logging();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute_with_config(config).await {
        let error_ctx = user_friendly_error(e);
        error_ctx.display(verbose);
        std::process::exit(error_ctx.exit_code());
    }
}
