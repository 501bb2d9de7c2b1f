use super::{load_blocks, print_json, resolve};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use courseweave_sync::{build_tree, extent, Registry};

#[derive(Debug, Args)]
pub struct CountArgs {
    /// JSON array of blocks
    pub blocks: String,

    /// Print the counts as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn count(args: CountArgs, cwd: &str) -> Result<()> {
    let blocks = load_blocks(&resolve(cwd, &args.blocks))?;
    let counts = extent(&build_tree(&Registry::standard(), &blocks));

    if args.json {
        return print_json(&counts, true);
    }

    println!("{} {}", "Words:".bright_white().bold(), counts.words);
    println!("{} {}", "Characters:".bright_white().bold(), counts.characters);
    println!("{} {}", "Blocks:".bright_white().bold(), counts.blocks);
    Ok(())
}
