use clap::Parser;

mod cli;
mod concat;
mod config;
mod library;
mod logging;
mod organize;
mod runtime;
mod tags;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let settings = runtime::load_settings();

    logging::init(cli.log_level.unwrap_or(settings.log.level));

    runtime::run(&cli.command, &settings)
}
