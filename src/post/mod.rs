//! Posting destinations.
//!
//! Each destination only knows how to make one posting attempt; retrying and
//! the lifetime of the downloaded picture are handled by [`Destination::send`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::filter::Policy;
use crate::http::{Response, Transport, TransportError};
use crate::models::{DownloadError, Picture, PictureData};
use crate::timing::Timing;

pub mod mastodon;
pub mod tumblr;
pub mod twitter;

pub use mastodon::Mastodon;
pub use tumblr::Tumblr;
pub use twitter::Twitter;

pub const SEND_ATTEMPTS: u32 = 3;
const SEND_BACKOFF: u32 = 5;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("http transport error")]
    Transport(#[from] TransportError),
    #[error("{destination} answered with status {status}: {body}")]
    Rejected {
        destination: &'static str,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {destination}: {body}")]
    Malformed {
        destination: &'static str,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("couldn't download the picture")]
    Download(#[from] DownloadError),
    #[error("couldn't read picture data")]
    Io(#[from] std::io::Error),
    #[error("{0} uploads the picture but none was downloaded")]
    MissingPicture(&'static str),
    #[error("posting to {destination} failed {attempts} times")]
    RetriesExceeded {
        destination: &'static str,
        attempts: u32,
        #[source]
        last: Box<PostError>,
    },
}

pub trait Destination {
    fn name(&self) -> &'static str;

    fn timing(&self) -> Timing;

    /// Download whatever the destination needs to upload. Defaults to nothing.
    fn prepare(&self, _picture: &Picture) -> Result<Option<PictureData>, PostError> {
        Ok(None)
    }

    /// One posting attempt, returning the id of the new post.
    fn post(&self, picture: &Picture, data: Option<&mut PictureData>) -> Result<String, PostError>;

    /// Post with retries. The downloaded picture belongs to this call and is
    /// only dropped once every attempt is done.
    fn send(&self, picture: &Picture) -> Result<String, PostError> {
        let destination = self.name();
        let mut data = self.prepare(picture)?;

        let mut attempt = 1;
        loop {
            if attempt > 1 {
                tracing::info!(destination, attempt, "retrying");
                if let Some(data) = data.as_mut() {
                    data.rewind();
                }
            }

            match self.post(picture, data.as_mut()) {
                Ok(id) => {
                    tracing::info!(destination, %id, caption = picture.caption(), "posted");
                    return Ok(id);
                },
                Err(err) if attempt < SEND_ATTEMPTS => {
                    tracing::warn!(destination, attempt, error = %err, "error when posting");
                    self.timing().sleep(SEND_BACKOFF);
                    attempt += 1;
                },
                Err(err) => {
                    tracing::error!(destination, attempt, error = %err, "giving up");
                    return Err(PostError::RetriesExceeded {
                        destination,
                        attempts: attempt,
                        last: Box::new(err),
                    });
                },
            }
        }
    }
}

/// Parse a successful JSON response, or turn anything else into an error.
pub(crate) fn parse_response<T: DeserializeOwned>(
    destination: &'static str,
    response: Response,
) -> Result<T, PostError> {
    if !response.is_success() {
        return Err(PostError::Rejected {
            destination,
            status: response.status,
            body: response.text(),
        });
    }
    serde_json::from_slice(&response.body).map_err(|source| PostError::Malformed {
        destination,
        body: response.text(),
        source,
    })
}

/// Every destination with a section in the configuration, in a fixed order.
pub fn destinations<T>(config: &Config, transport: T, policy: Arc<Policy>) -> Vec<Box<dyn Destination>>
where
    T: Transport + Clone + 'static,
{
    let timing = config.timing();
    let mut destinations: Vec<Box<dyn Destination>> = Vec::new();

    if let Some(twitter) = &config.twitter {
        destinations.push(Box::new(Twitter::new(
            transport.clone(),
            twitter.clone(),
            timing,
        )));
    }
    if let Some(tumblr) = &config.tumblr {
        destinations.push(Box::new(Tumblr::new(
            transport.clone(),
            tumblr.clone(),
            policy,
            timing,
        )));
    }
    if let Some(mastodon) = &config.mastodon {
        destinations.push(Box::new(Mastodon::new(transport, mastodon.clone(), timing)));
    }

    destinations
}
