//! Content policy: every blacklist the bot checks, built once from
//! configuration and shared read-only afterwards.

use thiserror::Error;

use crate::config::FilterConfig;
use crate::models::Candidate;

pub mod category;
pub mod gender;
pub mod tags;
pub mod words;

pub use category::{strip_html, CategoryFilter};
pub use gender::{GenderMapError, GenderNeutralizer};
pub use tags::TagBlacklist;
pub use words::{PhraseFilter, WordFilter};

/// Why a candidate was thrown away before it was ever described.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("unusable media type {0:?}")]
    MediaType(picdescbot_api_structs::mediawiki::MediaType),
    #[error("too small ({width}x{height})")]
    TooSmall { width: u32, height: u32 },
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("bad word {word:?} in {field}")]
    BadWord { field: &'static str, word: String },
    #[error("bad phrase {phrase:?} in {field}")]
    BadPhrase { field: &'static str, phrase: String },
    #[error("category blacklist: {category} ({fragment:?})")]
    Category { category: String, fragment: String },
    #[error("extra category blacklist: {fragment:?}")]
    ExtraCategory { fragment: String },
    #[error("page usage: {page} (bad word {word:?})")]
    UsageWord { page: String, word: String },
    #[error("page usage: {page} ({fragment:?})")]
    UsageCategory { page: String, fragment: String },
}

#[derive(Clone, Debug)]
pub struct Policy {
    pub words: WordFilter,
    pub phrases: PhraseFilter,
    pub caption_words: WordFilter,
    pub caption_phrases: PhraseFilter,
    pub categories: CategoryFilter,
    pub tags: TagBlacklist,
    pub neutralizer: GenderNeutralizer,
}

impl Policy {
    pub fn from_config(config: &FilterConfig) -> Result<Self, GenderMapError> {
        let mut words = WordFilter::new(&config.words);
        words.add_words(&config.extra_words);

        Ok(Policy {
            words,
            phrases: PhraseFilter::new(&config.phrases),
            caption_words: {
                let mut caption_words = WordFilter::default();
                caption_words.add_words(&config.caption_words);
                caption_words
            },
            caption_phrases: PhraseFilter::new(&config.caption_phrases),
            categories: CategoryFilter::new(&config.categories),
            tags: TagBlacklist::new(&config.tags),
            neutralizer: GenderNeutralizer::new(&config.gendered_words)?,
        })
    }

    fn check_words(&self, field: &'static str, text: &str) -> Result<(), Rejection> {
        match self.words.find(text) {
            Some(word) => Err(Rejection::BadWord {
                field,
                word: word.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Lexical, category and cross-reference checks on repository metadata.
    ///
    /// The repository is inconsistent about where it records sensitive
    /// classifications, so the structured categories, the free-form category
    /// string and the pages using the file are all checked.
    pub fn screen_metadata(&self, candidate: &Candidate) -> Result<(), Rejection> {
        self.check_words("title", &candidate.title)?;
        self.check_words("object name", &candidate.object_name)?;
        self.check_words("restrictions", &candidate.restrictions)?;

        let description = strip_html(&candidate.image_description);
        self.check_words("description", &description)?;
        if let Some(phrase) = self.phrases.find(&description) {
            return Err(Rejection::BadPhrase {
                field: "description",
                phrase: phrase.to_string(),
            });
        }

        for category in &candidate.categories {
            if let Some(fragment) = self.categories.find(category) {
                return Err(Rejection::Category {
                    category: category.clone(),
                    fragment: fragment.to_string(),
                });
            }
        }
        if let Some(fragment) = self.categories.find(&candidate.extra_categories) {
            return Err(Rejection::ExtraCategory {
                fragment: fragment.to_string(),
            });
        }

        for page in &candidate.usage_pages {
            if let Some(word) = self.words.find(page) {
                return Err(Rejection::UsageWord {
                    page: page.clone(),
                    word: word.to_string(),
                });
            }
            if let Some(fragment) = self.categories.find(page) {
                return Err(Rejection::UsageCategory {
                    page: page.clone(),
                    fragment: fragment.to_string(),
                });
            }
        }

        Ok(())
    }
}
