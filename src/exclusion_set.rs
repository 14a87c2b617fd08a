//! User-maintained list of excluded attribute tokens.

/// Ordered list of exclusion tokens.
///
/// Insertion order is kept for display. Duplicates are detected with an exact,
/// case-sensitive comparison; tokens are stored exactly as given and only
/// normalized when matched against a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    tokens: Vec<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `token` unless an identical entry exists. Returns `true` when the list changed.
    pub fn add(&mut self, token: &str) -> bool {
        if self.tokens.iter().any(|existing| existing == token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Removes the first entry equal to `token`. Returns `true` when the list changed.
    pub fn remove(&mut self, token: &str) -> bool {
        let Some(index) = self.tokens.iter().position(|existing| existing == token) else {
            return false;
        };
        self.tokens.remove(index);
        true
    }

    /// Removes the entry at display position `index`, returning it.
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.tokens.len() {
            Some(self.tokens.remove(index))
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.tokens.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::ExclusionSet;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = ExclusionSet::new();
        assert!(set.add("electric"));
        assert!(!set.add("electric"));
        assert_eq!(set.snapshot(), vec!["electric".to_string()]);
    }

    #[test]
    fn test_add_does_not_normalize_case() {
        let mut set = ExclusionSet::new();
        assert!(set.add("Fire"));
        assert!(set.add("fire"));
        assert_eq!(set.snapshot(), vec!["Fire".to_string(), "fire".to_string()]);
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut set = ExclusionSet::new();
        set.add("water");
        set.add("25");
        set.add("pika");
        assert_eq!(
            set.snapshot(),
            vec!["water".to_string(), "25".to_string(), "pika".to_string()]
        );
    }

    #[test]
    fn test_remove_deletes_exact_match_only() {
        let mut set = ExclusionSet::new();
        set.add("Grass");
        set.add("grass");
        assert!(!set.remove("GRASS"));
        assert!(set.remove("grass"));
        assert_eq!(set.snapshot(), vec!["Grass".to_string()]);
        assert!(!set.remove("grass"), "second remove should be a no-op");
    }

    #[test]
    fn test_remove_at_uses_display_position() {
        let mut set = ExclusionSet::new();
        set.add("a");
        set.add("b");
        set.add("c");
        assert_eq!(set.remove_at(1).as_deref(), Some("b"));
        assert_eq!(set.remove_at(5), None);
        assert_eq!(set.snapshot(), vec!["a".to_string(), "c".to_string()]);
    }
}
