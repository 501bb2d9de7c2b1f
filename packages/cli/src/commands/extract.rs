use super::{load_blocks, load_tree, print_json, resolve};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use courseweave_sync::{extract_blocks, Registry};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Document tree JSON, as printed by `tree`
    pub tree: String,

    /// Last-known blocks to match identity and detect changes against
    #[arg(short, long)]
    pub last: Option<String>,

    /// Single-line output
    #[arg(long)]
    pub compact: bool,
}

pub fn extract(args: ExtractArgs, cwd: &str) -> Result<()> {
    let tree = load_tree(&resolve(cwd, &args.tree))?;
    let last_known = match &args.last {
        Some(path) => load_blocks(&resolve(cwd, path))?,
        None => Vec::new(),
    };

    let result = extract_blocks(&Registry::standard(), &tree, &last_known);
    for node in &result.unmapped {
        eprintln!(
            "  {} node {} ({}) not saved: {}",
            "⚠️".yellow(),
            node.position,
            node.kind,
            node.reason
        );
    }

    print_json(&result, args.compact)
}
