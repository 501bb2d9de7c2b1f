use super::{load_blocks, resolve};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use courseweave_model::{sort_blocks, Block};
use courseweave_sync::{build_tree, extract_blocks, Registry};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// JSON array of blocks
    pub blocks: String,

    /// Treat block types without a registered kind as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct CheckReport {
    pub blocks: usize,

    /// (id, type) of blocks loaded as passthrough nodes
    pub unrecognized: Vec<(String, String)>,

    /// (id, reason) of registered blocks whose content did not convert
    pub malformed: Vec<(String, String)>,

    /// Ids whose stored form a save would change (order or content)
    pub rewritten: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self, strict: bool) -> bool {
        self.malformed.is_empty() && self.rewritten.is_empty() && (!strict || self.unrecognized.is_empty())
    }
}

/// Load the blocks into a tree and extract them again without edits
pub fn check_blocks(registry: &Registry, blocks: &[Block]) -> CheckReport {
    let mut sorted = blocks.to_vec();
    sort_blocks(&mut sorted);

    let mut report = CheckReport {
        blocks: sorted.len(),
        ..CheckReport::default()
    };

    for block in &sorted {
        match registry.build(&block.block_type, &block.content) {
            None => report
                .unrecognized
                .push((block.id.clone(), block.block_type.to_string())),
            Some(Err(err)) => report.malformed.push((block.id.clone(), err.to_string())),
            Some(Ok(_)) => {}
        }
    }

    let tree = build_tree(registry, &sorted);
    let result = extract_blocks(registry, &tree, &sorted);
    report.rewritten = result
        .blocks
        .iter()
        .zip(sorted.iter())
        .filter(|(next, prev)| !next.same_as(prev))
        .map(|(_, prev)| prev.id.clone())
        .collect();

    report
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let blocks = load_blocks(&resolve(cwd, &args.blocks))?;
    let report = check_blocks(&Registry::standard(), &blocks);

    println!("{}", "🔍 Checking blocks...".bright_blue().bold());

    for (id, block_type) in &report.unrecognized {
        println!(
            "  {} {} has unrecognized type `{}` (kept as-is)",
            "⚠️".yellow(),
            id,
            block_type
        );
    }
    for (id, reason) in &report.malformed {
        println!("  {} {} - {}", "✗".red(), id, reason.red());
    }
    for id in &report.rewritten {
        println!("  {} {} would be rewritten on save", "✗".red(), id);
    }

    println!();
    if report.is_clean(args.strict) {
        println!(
            "{} {} blocks round-trip unchanged",
            "✅".green(),
            report.blocks
        );
        Ok(())
    } else {
        let failures = report.malformed.len()
            + report.rewritten.len()
            + if args.strict { report.unrecognized.len() } else { 0 };
        Err(anyhow!(
            "{} of {} blocks do not round-trip cleanly",
            failures,
            report.blocks
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseweave_model::BlockType;
    use serde_json::json;

    #[test]
    fn test_clean_document() {
        let blocks = vec![
            Block::new("b1", BlockType::Heading, 0, json!({ "level": 1, "text": "Intro" })),
            Block::new("b2", BlockType::Paragraph, 1, json!({ "text": "Hello" })),
        ];
        let report = check_blocks(&Registry::standard(), &blocks);
        assert!(report.is_clean(true));
        assert_eq!(report.blocks, 2);
    }

    #[test]
    fn test_reports_problems() {
        let blocks = vec![
            Block::new("b1", BlockType::Heading, 0, json!({ "level": 9, "text": "Too deep" })),
            Block::new("b2", BlockType::Other("poll".into()), 1, json!({ "question": "?" })),
            Block::new("b3", BlockType::Paragraph, 5, json!({ "text": "gap before me" })),
        ];
        let report = check_blocks(&Registry::standard(), &blocks);

        assert_eq!(report.unrecognized, vec![("b2".to_string(), "poll".to_string())]);
        assert_eq!(report.malformed.len(), 1);
        assert_eq!(report.malformed[0].0, "b1");
        assert_eq!(report.rewritten, vec!["b3".to_string()]);
        assert!(!report.is_clean(false));
    }
}
