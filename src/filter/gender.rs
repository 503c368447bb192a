use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum GenderMapError {
    #[error("replacement {replacement:?} for {word:?} is itself a gendered word")]
    ChainedReplacement { word: String, replacement: String },
    #[error("replacement {replacement:?} for {word:?} must be a single word or empty")]
    MultiWordReplacement { word: String, replacement: String },
}

/// Swaps gendered words in generated captions for neutral ones.
#[derive(Clone, Debug)]
pub struct GenderNeutralizer {
    words: BTreeMap<String, String>,
}

pub fn default_gendered_words() -> BTreeMap<String, String> {
    [
        ("woman", "person"),
        ("man", "person"),
        ("women", "people"),
        ("men", "people"),
        ("boy", "person"),
        ("girl", "person"),
        ("boys", "people"),
        ("girls", "people"),
        ("lady", "person"),
        ("ladies", "people"),
        ("gentleman", "person"),
        ("gentlemen", "people"),
        ("female", ""),
        ("male", ""),
    ]
    .iter()
    .map(|(word, replacement)| (word.to_string(), replacement.to_string()))
    .collect()
}

impl GenderNeutralizer {
    pub fn new(words: &BTreeMap<String, String>) -> Result<Self, GenderMapError> {
        let words: BTreeMap<String, String> = words
            .iter()
            .map(|(word, replacement)| (word.to_lowercase(), replacement.trim().to_lowercase()))
            .collect();

        for (word, replacement) in &words {
            if replacement.split_whitespace().count() > 1 {
                return Err(GenderMapError::MultiWordReplacement {
                    word: word.clone(),
                    replacement: replacement.clone(),
                });
            }
            if words.contains_key(replacement) {
                return Err(GenderMapError::ChainedReplacement {
                    word: word.clone(),
                    replacement: replacement.clone(),
                });
            }
        }

        Ok(GenderNeutralizer { words })
    }

    pub fn neutralize(&self, phrase: &str) -> String {
        let neutralized = phrase
            .split_whitespace()
            .filter_map(|token| match self.words.get(&token.to_lowercase()) {
                Some(replacement) if replacement.is_empty() => None,
                Some(replacement) => Some(replacement.as_str()),
                None => Some(token),
            })
            .collect::<Vec<_>>()
            .join(" ");

        if neutralized != phrase {
            tracing::info!(original = phrase, neutralized = %neutralized, "gender neutralized");
        }
        neutralized
    }
}

impl Default for GenderNeutralizer {
    fn default() -> Self {
        GenderNeutralizer {
            words: default_gendered_words(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_whole_words() {
        let neutralizer = GenderNeutralizer::default();
        assert_eq!(
            neutralizer.neutralize("a man and a woman standing near a car"),
            "a person and a person standing near a car"
        );
        assert_eq!(
            neutralizer.neutralize("a group of Men playing frisbee"),
            "a group of people playing frisbee"
        );
    }

    #[test]
    fn drops_empty_replacements() {
        let neutralizer = GenderNeutralizer::default();
        assert_eq!(
            neutralizer.neutralize("a female  tennis player"),
            "a tennis player"
        );
    }

    #[test]
    fn leaves_containing_words_alone() {
        let neutralizer = GenderNeutralizer::default();
        assert_eq!(
            neutralizer.neutralize("an old manor near a mansion"),
            "an old manor near a mansion"
        );
        assert_eq!(neutralizer.neutralize("a boyish grin"), "a boyish grin");
    }

    #[test]
    fn idempotent() {
        let neutralizer = GenderNeutralizer::default();
        let samples = [
            "a man and a woman standing near a car",
            "Two Boys and a GIRL on the beach",
            "a male lion",
            "female",
            "  spaced   out   gentlemen ",
            "ladies and gentlemen, the manor",
            "",
        ];
        for sample in samples {
            let once = neutralizer.neutralize(sample);
            assert_eq!(neutralizer.neutralize(&once), once, "sample: {:?}", sample);
        }
    }

    #[test]
    fn keeps_case_of_untouched_words() {
        let neutralizer = GenderNeutralizer::default();
        assert_eq!(
            neutralizer.neutralize("a Woman near the Eiffel Tower"),
            "a person near the Eiffel Tower"
        );
    }

    #[test]
    fn rejects_chained_mapping() {
        let mut words = default_gendered_words();
        words.insert("person".to_string(), "human".to_string());
        let err = GenderNeutralizer::new(&words).unwrap_err();
        assert!(matches!(err, GenderMapError::ChainedReplacement { .. }));
    }

    #[test]
    fn rejects_multi_word_replacement() {
        let mut words = BTreeMap::new();
        words.insert("guy".to_string(), "some person".to_string());
        assert!(matches!(
            GenderNeutralizer::new(&words),
            Err(GenderMapError::MultiWordReplacement { .. })
        ));
    }
}
