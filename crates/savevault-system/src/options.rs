//! Per-file store options.

/// Options recorded into a file's header when it is saved or stored.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Per-file encryption request, recorded in the header. The engine's
    /// cipher applies to every payload regardless; this flag documents the
    /// caller's intent for tooling.
    pub encrypted: Option<bool>,
    /// Free-form tags persisted with the header.
    pub tags: Vec<String>,
}

impl StoreOptions {
    /// Options carrying only tags.
    pub fn with_tags(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            encrypted: None,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the encryption request.
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = Some(encrypted);
        self
    }
}

impl From<&str> for StoreOptions {
    fn from(tag: &str) -> Self {
        Self::with_tags([tag])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tag_conversion() {
        let options = StoreOptions::from("autosave");
        assert_eq!(options.tags, vec!["autosave".to_string()]);
        assert!(options.encrypted.is_none());
    }
}
