use picdescbot_api_structs::mastodon::{MediaAttachment, Status, StatusPayload};

use super::{parse_response, Destination, PostError};
use crate::config::MastodonConfig;
use crate::http::{image_content_type, Multipart, Request, Transport};
use crate::models::{Picture, PictureData};
use crate::timing::Timing;

const NAME: &str = "mastodon";

pub struct Mastodon<T> {
    transport: T,
    config: MastodonConfig,
    timing: Timing,
}

impl<T: Transport> Mastodon<T> {
    pub fn new(transport: T, config: MastodonConfig, timing: Timing) -> Self {
        Mastodon {
            transport,
            config,
            timing,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.instance.trim_end_matches('/'), path)
    }

    pub fn status_text(picture: &Picture) -> String {
        format!("{}\n\nsource: {}", picture.caption(), picture.source_url())
    }

    fn upload(&self, picture: &Picture, data: &mut PictureData) -> Result<MediaAttachment, PostError> {
        let bytes = data.read_remaining()?;
        let (content_type, body) = Multipart::new()
            .file("file", data.filename(), image_content_type(data.filename()), &bytes)
            .text("description", picture.caption())
            .finish();

        let request = Request::post(self.url("/api/v2/media"), body)
            .bearer(&self.config.access_token)
            .header("Content-Type", content_type);
        parse_response(NAME, self.transport.send(request)?)
    }
}

impl<T: Transport> Destination for Mastodon<T> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    fn prepare(&self, picture: &Picture) -> Result<Option<PictureData>, PostError> {
        Ok(Some(picture.fetch_bytes(&self.transport, self.timing)?))
    }

    fn post(&self, picture: &Picture, data: Option<&mut PictureData>) -> Result<String, PostError> {
        let data = data.ok_or(PostError::MissingPicture(NAME))?;
        let media = self.upload(picture, data)?;
        tracing::debug!(media_id = %media.id, "uploaded media");

        let text = Self::status_text(picture);
        let payload = StatusPayload {
            status: &text,
            media_ids: vec![media.id.as_str()],
            sensitive: self.config.sensitive,
            visibility: &self.config.visibility,
        };
        let body = serde_json::to_vec(&payload).map_err(|source| PostError::Malformed {
            destination: NAME,
            body: text.clone(),
            source,
        })?;

        let request = Request::post(self.url("/api/v1/statuses"), body)
            .bearer(&self.config.access_token)
            .header("Content-Type", "application/json");
        let status: Status = parse_response(NAME, self.transport.send(request)?)?;
        Ok(status.id)
    }
}
