use amp_core::cli::{execute, init_logging, Cli};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);
    let code = execute(&cli);
    std::process::exit(code.as_i32());
}
