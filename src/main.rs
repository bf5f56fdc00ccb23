use anyhow::Result;
use bankbook::cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    bankbook::telemetry::init(cli.verbose);
    cli.run()
}
