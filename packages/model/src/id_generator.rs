use crc32fast::Hasher;

/// Deterministic seed for block ids of one document, CRC32 of the document id
pub fn get_document_seed(document_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"doc://");
    hasher.update(document_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block id generator scoped to one document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_id: &str) -> Self {
        Self {
            seed: get_document_seed(document_id),
            count: 0,
        }
    }

    /// Continue after the highest id already issued for this document, so a
    /// restarted store never hands out an id twice.
    pub fn resume<'a>(document_id: &str, existing: impl IntoIterator<Item = &'a str>) -> Self {
        let mut generator = Self::new(document_id);
        let prefix = format!("{}-", generator.seed);

        generator.count = existing
            .into_iter()
            .filter_map(|id| id.strip_prefix(&prefix))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        generator
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_seed_is_stable() {
        let a = get_document_seed("lesson-1");
        assert_eq!(a, get_document_seed("lesson-1"));
        assert_ne!(a, get_document_seed("lesson-2"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("lesson-1");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(gen.seed()));
    }

    #[test]
    fn test_resume_skips_issued_ids() {
        let mut first = IdGenerator::new("lesson-1");
        let issued = vec![first.new_id(), first.new_id(), "imported-42".to_string()];

        let mut resumed = IdGenerator::resume("lesson-1", issued.iter().map(String::as_str));
        let next = resumed.new_id();

        assert!(next.ends_with("-3"));
        assert!(!issued.contains(&next));
    }
}
