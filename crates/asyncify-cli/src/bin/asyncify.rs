use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use asyncify_cli::args::CliArgs;

fn main() -> Result<()> {
    // ASYNCIFY_LOG / RUST_LOG enable tracing on stderr; ASYNCIFY_LOG_FORMAT picks the layout.
    asyncify::tracing_config::init_tracing();

    let mut args = CliArgs::parse();
    if !std::io::stdout().is_terminal() {
        args.no_color = true;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let status = asyncify_cli::run(&args, &mut out)?;
    drop(out);
    std::process::exit(status);
}
