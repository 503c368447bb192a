use std::sync::Arc;

use picdescbot_api_structs::mediawiki::{MediaType, QueryResponse};
use thiserror::Error;
use url::Url;

use crate::filter::{Policy, Rejection};
use crate::http::{Request, Transport, TransportError};
use crate::models::Candidate;

pub const MIN_DIMENSION: u32 = 50;
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("couldn't reach the media repository")]
    Transport(#[from] TransportError),
    #[error("media repository answered with status {0}")]
    Status(u16),
    #[error("unexpected media repository response from {url}: {body}")]
    Malformed {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Worth another fetch after a pause.
    pub fn is_transient(&self) -> bool {
        !matches!(self, SourceError::Malformed { .. })
    }
}

/// Where candidates come from. A policy rejection is `Ok(None)`, not an error.
pub trait PictureSource {
    fn fetch(&self, filename: Option<&str>) -> Result<Option<Candidate>, SourceError>;
}

impl<S: PictureSource + ?Sized> PictureSource for &S {
    fn fetch(&self, filename: Option<&str>) -> Result<Option<Candidate>, SourceError> {
        (**self).fetch(filename)
    }
}

#[derive(Debug, PartialEq)]
pub enum Verdict {
    /// The repository has no usable image under that name.
    Missing,
    Rejected(Box<Candidate>, Rejection),
    Accepted(Box<Candidate>),
}

impl Verdict {
    pub fn into_accepted(self) -> Option<Candidate> {
        match self {
            Verdict::Accepted(candidate) => Some(*candidate),
            _ => None,
        }
    }
}

/// Structural checks first, metadata checks after.
pub fn screen(candidate: &Candidate, policy: &Policy) -> Result<(), Rejection> {
    if candidate.media_type != MediaType::Bitmap {
        return Err(Rejection::MediaType(candidate.media_type));
    }
    if candidate.width <= MIN_DIMENSION || candidate.height <= MIN_DIMENSION {
        return Err(Rejection::TooSmall {
            width: candidate.width,
            height: candidate.height,
        });
    }
    if !has_supported_extension(&candidate.url) {
        return Err(Rejection::UnsupportedFormat(candidate.url.clone()));
    }
    policy.screen_metadata(candidate)
}

fn has_supported_extension(url: &str) -> bool {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    match path.rsplit_once('.') {
        Some((_, extension)) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| extension.eq_ignore_ascii_case(supported)),
        None => false,
    }
}

/// Wikimedia Commons.
pub struct Commons<T> {
    transport: T,
    endpoint: Url,
    policy: Arc<Policy>,
}

impl<T: Transport> Commons<T> {
    pub fn new(transport: T, endpoint: Url, policy: Arc<Policy>) -> Self {
        Commons {
            transport,
            endpoint,
            policy,
        }
    }

    fn query_url(&self, filename: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("action", "query")
                .append_pair("prop", "imageinfo|categories|globalusage")
                .append_pair("iiprop", "url|size|extmetadata|mediatype")
                .append_pair("iiurlheight", "1080")
                .append_pair("format", "json");
            match filename {
                Some(name) => {
                    let name = name.trim();
                    let title = if name.starts_with("File:") {
                        name.to_string()
                    } else {
                        format!("File:{}", name)
                    };
                    query.append_pair("titles", &title);
                },
                None => {
                    query
                        .append_pair("generator", "random")
                        .append_pair("grnnamespace", "6");
                },
            }
        }
        url
    }

    /// One repository round trip and every check, with the reason on failure.
    #[tracing::instrument(skip(self))]
    pub fn inspect(&self, filename: Option<&str>) -> Result<Verdict, SourceError> {
        let url = self.query_url(filename);
        let response = self.transport.send(Request::get(url.as_str()))?;
        if !response.is_success() {
            return Err(SourceError::Status(response.status));
        }

        let parsed: QueryResponse =
            serde_json::from_slice(&response.body).map_err(|source| SourceError::Malformed {
                url: url.to_string(),
                body: response.text(),
                source,
            })?;

        let candidate = match parsed.into_first_page().and_then(Candidate::from_page) {
            Some(candidate) => candidate,
            None => return Ok(Verdict::Missing),
        };

        Ok(match screen(&candidate, &self.policy) {
            Ok(()) => Verdict::Accepted(Box::new(candidate)),
            Err(rejection) => Verdict::Rejected(Box::new(candidate), rejection),
        })
    }
}

impl<T: Transport> PictureSource for Commons<T> {
    fn fetch(&self, filename: Option<&str>) -> Result<Option<Candidate>, SourceError> {
        let verdict = self.inspect(filename)?;
        match &verdict {
            Verdict::Missing => tracing::info!(?filename, "no image info in repository response"),
            Verdict::Rejected(candidate, rejection) => {
                tracing::warn!(title = %candidate.title, %rejection, "discarded candidate");
            },
            Verdict::Accepted(candidate) => {
                tracing::info!(title = %candidate.title, url = %candidate.url, "got candidate");
            },
        }
        Ok(verdict.into_accepted())
    }
}
