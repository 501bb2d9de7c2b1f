use super::{load_blocks, print_json, resolve};
use anyhow::Result;
use clap::Args;
use courseweave_sync::{build_tree, Registry};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// JSON array of blocks
    pub blocks: String,

    /// Single-line output
    #[arg(long)]
    pub compact: bool,
}

pub fn tree(args: TreeArgs, cwd: &str) -> Result<()> {
    let blocks = load_blocks(&resolve(cwd, &args.blocks))?;
    let tree = build_tree(&Registry::standard(), &blocks);
    print_json(&tree, args.compact)
}
