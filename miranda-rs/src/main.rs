//! Main entry point for the miranda-rs CLI

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use std::io;

use miranda_rs::cli::{Cli, Commands};
use miranda_rs::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.verbose, cli.quiet) {
        (0, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Info,
        (2, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose > 0 || cli.quiet {
        logger.filter_level(level);
    }
    logger.init();

    let load = &cli.load;
    match cli.command {
        Commands::Info { file } => commands::info::execute(&file, load),
        Commands::Names { file } => commands::contacts::names(&file, load),
        Commands::Find { file, key, value } => {
            commands::contacts::find(&file, &key, &value, load)
        }
        Commands::Contacts { file } => commands::contacts::list(&file, load),
        Commands::Events { file } => commands::events::execute(&file, load),
        Commands::Export {
            file,
            output,
            format,
            force,
        } => commands::export::execute(&file, &output, format, force, load),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
