pub mod check;
pub mod count;
pub mod extract;
pub mod save;
pub mod tree;

pub use check::{check, CheckArgs};
pub use count::{count, CountArgs};
pub use extract::{extract, ExtractArgs};
pub use save::{save, SaveArgs};
pub use tree::{tree, TreeArgs};

use anyhow::{Context, Result};
use courseweave_common::read_json;
use courseweave_model::{Block, DocumentTree};
use serde::Serialize;
use std::path::{Path, PathBuf};

fn resolve(cwd: &str, path: &str) -> PathBuf {
    PathBuf::from(cwd).join(path)
}

pub(crate) fn load_blocks(path: &Path) -> Result<Vec<Block>> {
    read_json(path).with_context(|| format!("Cannot read blocks from {}", path.display()))
}

pub(crate) fn load_tree(path: &Path) -> Result<DocumentTree> {
    read_json(path).with_context(|| format!("Cannot read document tree from {}", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", output);
    Ok(())
}
