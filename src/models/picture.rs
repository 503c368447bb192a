use std::io::{Cursor, Read, Seek, SeekFrom};

use serde::Serialize;
use thiserror::Error;

use crate::http::{Request, Transport};
use crate::timing::Timing;

pub const DOWNLOAD_ATTEMPTS: u32 = 20;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("fetching {url} failed {attempts} times in a row")]
    RetriesExceeded { url: String, attempts: u32 },
}

/// An accepted picture and its caption, ready to be posted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Picture {
    caption: String,
    tags: Vec<String>,
    url: String,
    source_url: String,
}

impl Picture {
    pub fn new(caption: String, tags: Vec<String>, url: String, source_url: String) -> Self {
        Picture {
            caption,
            tags,
            url,
            source_url,
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn filename(&self) -> &str {
        self.url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("picture.jpg")
    }

    /// Download the picture. Nothing is cached, every call hits the network.
    #[tracing::instrument(skip(self, transport, timing), fields(url = %self.url))]
    pub fn fetch_bytes<T: Transport + ?Sized>(
        &self,
        transport: &T,
        timing: Timing,
    ) -> Result<PictureData, DownloadError> {
        tracing::info!("downloading picture");
        for attempt in 1..=DOWNLOAD_ATTEMPTS {
            if attempt > 1 {
                tracing::info!(attempt, "trying again");
            }
            match transport.send(Request::get(self.url.as_str())) {
                Ok(response) if response.status == 200 => {
                    return Ok(PictureData::new(self.filename(), response.body));
                },
                Ok(response) => {
                    tracing::warn!(status = response.status, "fetching picture failed");
                },
                Err(err) => {
                    tracing::warn!(error = %err, "fetching picture failed");
                },
            }
            if attempt < DOWNLOAD_ATTEMPTS {
                timing.sleep(attempt.min(3));
            }
        }

        Err(DownloadError::RetriesExceeded {
            url: self.url.clone(),
            attempts: DOWNLOAD_ATTEMPTS,
        })
    }
}

/// Downloaded picture bytes. Whoever holds this decides when it is dropped;
/// uploaders only read from it and rewind between attempts.
#[derive(Debug)]
pub struct PictureData {
    filename: String,
    cursor: Cursor<Vec<u8>>,
}

impl PictureData {
    pub fn new(filename: &str, bytes: Vec<u8>) -> Self {
        PictureData {
            filename: filename.to_string(),
            cursor: Cursor::new(bytes),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }

    /// Read whatever is left from the current position.
    pub fn read_remaining(&mut self) -> std::io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.len());
        self.cursor.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Read for PictureData {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for PictureData {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}
