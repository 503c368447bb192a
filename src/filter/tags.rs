use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct TagBlacklist {
    tags: BTreeSet<String>,
}

pub fn default_tag_blacklist() -> Vec<String> {
    vec![
        "text".to_string(),
        "screenshot".to_string(),
        "military uniform".to_string(),
    ]
}

impl TagBlacklist {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TagBlacklist {
            tags: tags
                .into_iter()
                .map(|tag| tag.as_ref().trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.trim().to_lowercase())
    }

    /// First tag that is blacklisted.
    pub fn find<'a, S: AsRef<str>>(&self, tags: &'a [S]) -> Option<&'a str> {
        tags.iter()
            .map(|tag| -> &'a str { tag.as_ref() })
            .find(|tag| self.contains(tag))
    }

    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.find(tags).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
