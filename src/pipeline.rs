//! Candidate acquisition: fetch, describe, filter, retry.
//!
//! Cheap checks on repository metadata run inside the [`PictureSource`] before
//! the vision service is paid for; everything that depends on the description
//! runs here, broadest first (adult/racy) and narrowest last (tags).

use std::sync::Arc;

use thiserror::Error;

use crate::describe::{DescribeError, Describer};
use crate::filter::Policy;
use crate::models::{Candidate, Description, Picture};
use crate::source::{PictureSource, SourceError};
use crate::timing::Timing;

pub const DEFAULT_MAX_RETRIES: u32 = 20;
pub const DEFAULT_MAX_FETCH_ATTEMPTS: u32 = 100;
const FETCH_PAUSE: u32 = 1;
const RETRY_PAUSE: u32 = 3;

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("maximum retries exceeded, no good picture after {attempts} attempts")]
    RetriesExceeded { attempts: u32 },
    #[error("no usable picture in the repository after {fetches} fetches")]
    NoCandidate { fetches: u32 },
    #[error("media repository failure")]
    Source(#[source] SourceError),
    #[error("vision service failure")]
    Describe(#[from] DescribeError),
}

/// Why a described candidate was not good enough.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Discard {
    #[error("no description")]
    NoDescription,
    #[error("adult content")]
    Adult,
    #[error("racy content")]
    Racy,
    #[error("no caption")]
    NoCaption,
    #[error("caption {caption:?} contains {word:?}")]
    CaptionWord { caption: String, word: String },
    #[error("caption {caption:?} contains {phrase:?}")]
    CaptionPhrase { caption: String, phrase: String },
    #[error("tag blacklist: {tag}")]
    Tag { tag: String },
}

pub struct Pipeline<S, D> {
    source: S,
    describer: D,
    policy: Arc<Policy>,
    timing: Timing,
    max_fetch_attempts: u32,
}

impl<S: PictureSource, D: Describer> Pipeline<S, D> {
    pub fn new(source: S, describer: D, policy: Arc<Policy>, timing: Timing) -> Self {
        Pipeline {
            source,
            describer,
            policy,
            timing,
            max_fetch_attempts: DEFAULT_MAX_FETCH_ATTEMPTS,
        }
    }

    pub fn with_max_fetch_attempts(mut self, max_fetch_attempts: u32) -> Self {
        self.max_fetch_attempts = max_fetch_attempts.max(1);
        self
    }

    /// The neutralized caption if the description is acceptable.
    pub fn evaluate(&self, description: &Description) -> Result<String, Discard> {
        if description.is_adult {
            return Err(Discard::Adult);
        }
        if description.is_racy {
            return Err(Discard::Racy);
        }
        let caption = match description.first_caption() {
            Some(caption) => self.policy.neutralizer.neutralize(caption),
            None => return Err(Discard::NoCaption),
        };

        let word = self
            .policy
            .words
            .find(&caption)
            .or_else(|| self.policy.caption_words.find(&caption));
        if let Some(word) = word {
            return Err(Discard::CaptionWord {
                word: word.to_string(),
                caption,
            });
        }
        if let Some(phrase) = self.policy.caption_phrases.find(&caption) {
            return Err(Discard::CaptionPhrase {
                phrase: phrase.to_string(),
                caption,
            });
        }
        if let Some(tag) = self.policy.tags.find(&description.tags) {
            return Err(Discard::Tag {
                tag: tag.to_string(),
            });
        }

        Ok(caption)
    }

    fn next_candidate(&self, filename: Option<&str>) -> Result<Candidate, AcquireError> {
        for fetch in 1..=self.max_fetch_attempts {
            match self.source.fetch(filename) {
                Ok(Some(candidate)) => return Ok(candidate),
                Ok(None) => {},
                Err(err) if err.is_transient() => {
                    tracing::warn!(fetch, error = %err, "media repository fetch failed");
                },
                Err(err) => return Err(AcquireError::Source(err)),
            }
            // Be polite to the repository.
            self.timing.sleep(FETCH_PAUSE);
        }
        Err(AcquireError::NoCandidate {
            fetches: self.max_fetch_attempts,
        })
    }

    /// Keep going until a picture survives every filter or `max_retries + 1`
    /// described candidates have been thrown away.
    #[tracing::instrument(skip(self))]
    pub fn acquire(&self, filename: Option<&str>, max_retries: u32) -> Result<Picture, AcquireError> {
        for attempt in 1..=max_retries.saturating_add(1) {
            let candidate = self.next_candidate(filename)?;
            let url = candidate.preferred_url();
            if url != candidate.url {
                tracing::info!(size = candidate.size, width = candidate.width, height = candidate.height, "using thumbnail");
            }

            let verdict = match self.describer.describe(url)? {
                Some(description) => self
                    .evaluate(&description)
                    .map(|caption| (caption, description.tags)),
                None => Err(Discard::NoDescription),
            };

            match verdict {
                Ok((caption, tags)) => {
                    tracing::info!(attempt, %caption, %url, "accepted picture");
                    return Ok(Picture::new(
                        caption,
                        tags,
                        url.to_string(),
                        candidate.short_url.clone(),
                    ));
                },
                Err(discard) => {
                    tracing::warn!(attempt, %url, %discard, "discarded, retrying");
                },
            }
            self.timing.sleep(RETRY_PAUSE);
        }

        Err(AcquireError::RetriesExceeded {
            attempts: max_retries.saturating_add(1),
        })
    }
}
