mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, count, extract, save, tree, CheckArgs, CountArgs, ExtractArgs, SaveArgs, TreeArgs};
use config::Config;

/// Courseweave CLI - block/document sync for course content
#[derive(Parser, Debug)]
#[command(name = "courseweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the editor tree for a block list
    Tree(TreeArgs),

    /// Recover blocks from an editor tree
    Extract(ExtractArgs),

    /// Count words, characters and blocks
    Count(CountArgs),

    /// Verify blocks survive a load/save cycle unchanged
    Check(CheckArgs),

    /// Persist an edited tree to the block store
    Save(SaveArgs),
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.log_level()
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()
        .context("Cannot get current directory")?
        .display()
        .to_string();

    let config = Config::load(&cwd)?;
    init_logging(&cli, &config);

    match cli.command {
        Command::Tree(args) => tree(args, &cwd),
        Command::Extract(args) => extract(args, &cwd),
        Command::Count(args) => count(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Save(args) => save(args, &config, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
