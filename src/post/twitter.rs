use picdescbot_api_structs::twitter::{Created, Data, TweetMedia, TweetPayload};

use super::{parse_response, Destination, PostError};
use crate::config::TwitterConfig;
use crate::http::{image_content_type, Multipart, Request, Transport};
use crate::models::{Picture, PictureData};
use crate::timing::Timing;

const NAME: &str = "twitter";

pub struct Twitter<T> {
    transport: T,
    config: TwitterConfig,
    timing: Timing,
}

impl<T: Transport> Twitter<T> {
    pub fn new(transport: T, config: TwitterConfig, timing: Timing) -> Self {
        Twitter {
            transport,
            config,
            timing,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn upload(&self, data: &mut PictureData) -> Result<String, PostError> {
        let bytes = data.read_remaining()?;
        let (content_type, body) = Multipart::new()
            .text("media_category", "tweet_image")
            .file("media", data.filename(), image_content_type(data.filename()), &bytes)
            .finish();

        let request = Request::post(self.url("/2/media/upload"), body)
            .bearer(&self.config.access_token)
            .header("Content-Type", content_type);
        let created: Data<Created> = parse_response(NAME, self.transport.send(request)?)?;
        Ok(created.data.id)
    }
}

impl<T: Transport> Destination for Twitter<T> {
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
        let media_id = self.upload(data)?;

        let payload = TweetPayload {
            text: picture.caption(),
            media: TweetMedia {
                media_ids: vec![media_id.as_str()],
            },
        };
        let body = serde_json::to_vec(&payload).map_err(|source| PostError::Malformed {
            destination: NAME,
            body: picture.caption().to_string(),
            source,
        })?;

        let request = Request::post(self.url("/2/tweets"), body)
            .bearer(&self.config.access_token)
            .header("Content-Type", "application/json");
        let created: Data<Created> = parse_response(NAME, self.transport.send(request)?)?;
        Ok(created.data.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{json, ok, status, ScriptedTransport};

    fn twitter(transport: &ScriptedTransport) -> Twitter<&ScriptedTransport> {
        Twitter::new(
            transport,
            TwitterConfig {
                access_token: "token".to_string(),
                api_base: "https://api.x.example".to_string(),
            },
            Timing::instant(),
        )
    }

    fn picture() -> Picture {
        Picture::new(
            "a cat sitting on a couch".to_string(),
            vec![],
            "https://upload.example/a/ab/Cat.png".to_string(),
            "https://commons.example/w/index.php?curid=7".to_string(),
        )
    }

    #[test]
    fn uploads_then_tweets() {
        let transport = ScriptedTransport::new(vec![
            ok(b"PNGDATA".to_vec()),
            json(serde_json::json!({"data": {"id": "1880028106020515840", "media_key": "3_1"}})),
            json(serde_json::json!({"data": {"id": "1445880548472328192", "text": "a cat"}})),
        ]);
        assert_eq!(
            twitter(&transport).send(&picture()).unwrap(),
            "1445880548472328192"
        );

        let requests = transport.requests();
        assert_eq!(requests[1].url, "https://api.x.example/2/media/upload");
        let upload = String::from_utf8_lossy(&requests[1].body);
        assert!(upload.contains("Content-Type: image/png"));
        assert!(upload.contains("PNGDATA"));

        assert_eq!(requests[2].url, "https://api.x.example/2/tweets");
        let tweet: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
        assert_eq!(
            tweet,
            serde_json::json!({
                "text": "a cat sitting on a couch",
                "media": {"media_ids": ["1880028106020515840"]}
            })
        );
    }

    #[test]
    fn gives_up_after_three_attempts() {
        let transport = ScriptedTransport::new(vec![
            ok(b"PNGDATA".to_vec()),
            status(403),
            status(403),
            status(403),
        ]);
        match twitter(&transport).send(&picture()) {
            Err(PostError::RetriesExceeded { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("unexpected result {:?}", other),
        }
        // One download, three upload attempts.
        assert_eq!(transport.requests().len(), 4);
    }
}
