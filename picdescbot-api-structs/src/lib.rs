//! Wire formats of the upstream services picdescbot talks to.

pub mod mediawiki {
    use std::collections::BTreeMap;

    #[derive(Debug, serde::Deserialize)]
    pub struct QueryResponse {
        pub query: Query,
    }

    /// `pages` is keyed by an opaque page id; one query returns one page.
    #[derive(Debug, serde::Deserialize)]
    pub struct Query {
        pub pages: BTreeMap<String, Page>,
    }

    impl QueryResponse {
        pub fn into_first_page(self) -> Option<Page> {
            self.query.pages.into_iter().next().map(|(_, page)| page)
        }
    }

    #[derive(Clone, Debug, Default, serde::Deserialize)]
    pub struct Page {
        pub title: String,
        #[serde(default)]
        pub imageinfo: Vec<ImageInfo>,
        #[serde(default)]
        pub categories: Vec<Titled>,
        #[serde(default)]
        pub globalusage: Vec<Titled>,
    }

    #[derive(Clone, Debug, Default, serde::Deserialize)]
    pub struct Titled {
        pub title: String,
    }

    #[derive(Clone, Debug, serde::Deserialize)]
    pub struct ImageInfo {
        pub url: String,
        pub thumburl: Option<String>,
        #[serde(default)]
        pub descriptionshorturl: Option<String>,
        pub descriptionurl: Option<String>,
        pub size: u64,
        pub width: u32,
        pub height: u32,
        pub mediatype: MediaType,
        #[serde(default)]
        pub extmetadata: ExtMetadata,
    }

    #[derive(Clone, Debug, Default, serde::Deserialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct ExtMetadata {
        pub object_name: Option<MetaValue>,
        pub restrictions: Option<MetaValue>,
        pub categories: Option<MetaValue>,
        pub image_description: Option<MetaValue>,
    }

    #[derive(Clone, Debug, Default, serde::Deserialize)]
    pub struct MetaValue {
        pub value: String,
    }

    /// Value of `ExtMetadata` field, empty when the repository omits it.
    pub fn meta_text(value: &Option<MetaValue>) -> String {
        value.as_ref().map(|v| v.value.clone()).unwrap_or_default()
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum MediaType {
        Bitmap,
        Drawing,
        Audio,
        Video,
        Multimedia,
        Office,
        Text,
        Executable,
        Archive,
        #[serde(other)]
        Unknown,
    }
}

pub mod vision {
    #[derive(Debug, serde::Serialize)]
    pub struct AnalyzeRequest<'a> {
        pub url: &'a str,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct Analysis {
        pub description: DescriptionPayload,
        pub adult: Adult,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct DescriptionPayload {
        #[serde(default)]
        pub captions: Vec<Caption>,
        #[serde(default)]
        pub tags: Vec<String>,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct Caption {
        pub text: String,
        pub confidence: f64,
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Adult {
        pub is_adult_content: bool,
        pub is_racy_content: bool,
    }
}

pub mod mastodon {
    #[derive(Debug, serde::Deserialize)]
    pub struct MediaAttachment {
        pub id: String,
    }

    #[derive(Debug, serde::Serialize)]
    pub struct StatusPayload<'a> {
        pub status: &'a str,
        pub media_ids: Vec<&'a str>,
        pub sensitive: bool,
        pub visibility: &'a str,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct Status {
        pub id: String,
    }
}

pub mod tumblr {
    #[derive(Debug, serde::Deserialize)]
    pub struct Envelope {
        pub response: CreatedPost,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct CreatedPost {
        pub id: u64,
    }
}

pub mod twitter {
    #[derive(Debug, serde::Deserialize)]
    pub struct Data<T> {
        pub data: T,
    }

    #[derive(Debug, serde::Deserialize)]
    pub struct Created {
        pub id: String,
    }

    #[derive(Debug, serde::Serialize)]
    pub struct TweetPayload<'a> {
        pub text: &'a str,
        pub media: TweetMedia<'a>,
    }

    #[derive(Debug, serde::Serialize)]
    pub struct TweetMedia<'a> {
        pub media_ids: Vec<&'a str>,
    }
}

#[cfg(test)]
mod tests {
    use super::mediawiki::{MediaType, QueryResponse};
    use super::vision::Analysis;

    #[test]
    fn first_page_of_random_query() {
        let body = r#"{
            "batchcomplete": "",
            "continue": {"grncontinue": "0.1|0.2|0|0", "continue": "grncontinue||"},
            "query": {"pages": {"4242": {
                "pageid": 4242, "ns": 6, "title": "File:Dog.jpg",
                "imageinfo": [{
                    "size": 1200, "width": 640, "height": 480,
                    "thumburl": "https://upload.example/thumb/Dog.jpg",
                    "url": "https://upload.example/Dog.jpg",
                    "descriptionurl": "https://commons.example/wiki/File:Dog.jpg",
                    "descriptionshorturl": "https://commons.example/w/index.php?curid=4242",
                    "extmetadata": {
                        "ObjectName": {"value": "Dog", "source": "commons-desc-page"},
                        "Categories": {"value": "Dogs|Animals", "source": "commons-categories", "hidden": ""}
                    },
                    "mediatype": "BITMAP"
                }],
                "categories": [{"ns": 14, "title": "Category:Dogs"}],
                "globalusage": [{"title": "Dog", "wiki": "en.wikipedia.org", "url": "https://en.wikipedia.org/wiki/Dog"}]
            }}}
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        let page = response.into_first_page().unwrap();
        assert_eq!(page.title, "File:Dog.jpg");
        let info = &page.imageinfo[0];
        assert_eq!(info.mediatype, MediaType::Bitmap);
        assert!(info.extmetadata.restrictions.is_none());
        assert_eq!(page.globalusage[0].title, "Dog");
    }

    #[test]
    fn unknown_media_type() {
        let mediatype: MediaType = serde_json::from_str("\"3D\"").unwrap();
        assert_eq!(mediatype, MediaType::Unknown);
    }

    #[test]
    fn missing_file_has_no_imageinfo() {
        let body = r#"{"query": {"pages": {"-1": {"ns": 6, "title": "File:Nope.png", "missing": ""}}}}"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_first_page().unwrap().imageinfo.is_empty());
    }

    #[test]
    fn vision_analysis() {
        let body = r#"{
            "description": {"tags": ["dog", "grass"], "captions": [{"text": "a dog lying in the grass", "confidence": 0.93}]},
            "adult": {"isAdultContent": false, "isRacyContent": true, "adultScore": 0.01, "racyScore": 0.6},
            "requestId": "abc"
        }"#;
        let analysis: Analysis = serde_json::from_str(body).unwrap();
        assert_eq!(analysis.description.captions[0].text, "a dog lying in the grass");
        assert!(analysis.adult.is_racy_content);
        assert!(!analysis.adult.is_adult_content);
    }
}
