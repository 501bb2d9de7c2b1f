//! JSON file helpers for block and tree documents

use crate::error::CommonError;
use crate::result::CommonResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CommonResult<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CommonError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize to pretty JSON and write, creating parent directories
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> CommonResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(value).map_err(|source| CommonError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseweave_model::{Block, BlockType};
    use serde_json::json;

    #[test]
    fn test_write_then_read_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/lesson.json");
        let blocks = vec![Block::new("b1", BlockType::Paragraph, 0, json!({ "text": "Hi" }))];

        write_json(&path, &blocks).unwrap();
        let loaded: Vec<Block> = read_json(&path).unwrap();

        assert_eq!(loaded, blocks);
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_json::<Vec<Block>>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
