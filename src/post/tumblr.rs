use std::sync::Arc;

use picdescbot_api_structs::tumblr::Envelope;
use url::form_urlencoded;

use super::{parse_response, Destination, PostError};
use crate::config::TumblrConfig;
use crate::filter::{Policy, TagBlacklist};
use crate::http::{Request, Transport};
use crate::models::{Picture, PictureData};
use crate::timing::Timing;

const NAME: &str = "tumblr";
const DEFAULT_TAGS: [&str; 2] = ["picdescbot", "bot"];

/// Queues a photo post; Tumblr fetches the picture from its URL itself.
pub struct Tumblr<T> {
    transport: T,
    config: TumblrConfig,
    tag_blacklist: TagBlacklist,
    policy: Arc<Policy>,
    timing: Timing,
}

impl<T: Transport> Tumblr<T> {
    pub fn new(transport: T, config: TumblrConfig, policy: Arc<Policy>, timing: Timing) -> Self {
        let tag_blacklist = TagBlacklist::new(&config.tag_blacklist);
        Tumblr {
            transport,
            config,
            tag_blacklist,
            policy,
            timing,
        }
    }

    pub fn caption_html(&self, picture: &Picture) -> String {
        format!(
            "<h2><b>{}</b></h2>\
             <p><a href=\"{}\">about this bot</a>&nbsp;|&nbsp;<a href=\"{}\">picture source</a></p>\
             <p><i>this post is 100% computer-generated, including tags</i></p>",
            escape(picture.caption()),
            escape(&self.config.about_url),
            escape(picture.source_url()),
        )
    }

    pub fn tags(&self, picture: &Picture) -> Vec<String> {
        let mut tags: Vec<String> = DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect();
        if self.config.include_tags {
            tags.extend(
                picture
                    .tags()
                    .iter()
                    .filter(|tag| !self.tag_blacklist.contains(tag))
                    .filter(|tag| !self.policy.words.blacklisted(tag))
                    .filter(|tag| !tag.contains(','))
                    .cloned(),
            );
        }
        tags
    }

    fn form(&self, picture: &Picture) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("type", "photo")
            .append_pair("state", "queue")
            .append_pair("native_inline_images", "true")
            .append_pair("caption", &self.caption_html(picture))
            .append_pair("source", picture.url())
            .append_pair("tags", &self.tags(picture).join(","))
            .finish()
    }
}

impl<T: Transport> Destination for Tumblr<T> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    fn post(&self, picture: &Picture, _data: Option<&mut PictureData>) -> Result<String, PostError> {
        let url = format!(
            "{}/v2/blog/{}/post",
            self.config.api_base.trim_end_matches('/'),
            self.config.blog_id
        );
        let request = Request::post(url, self.form(picture).into_bytes())
            .bearer(&self.config.access_token)
            .header("Content-Type", "application/x-www-form-urlencoded");
        let envelope: Envelope = parse_response(NAME, self.transport.send(request)?)?;
        Ok(envelope.response.id.to_string())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
