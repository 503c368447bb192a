//! Fixtures and a scripted transport shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use picdescbot_api_structs::mediawiki::MediaType;
use serde_json::json as json_value;

use crate::config::FilterConfig;
use crate::filter::Policy;
use crate::http::{Request, Response, Transport, TransportError};
use crate::models::Candidate;

#[derive(Clone, Debug)]
pub enum Step {
    Respond(Response),
    Fail,
}

pub fn ok(body: Vec<u8>) -> Step {
    Step::Respond(Response { status: 200, body })
}

pub fn json(value: serde_json::Value) -> Step {
    ok(serde_json::to_vec(&value).unwrap())
}

pub fn status(status: u16) -> Step {
    Step::Respond(Response {
        status,
        body: b"{\"error\": \"nope\"}".to_vec(),
    })
}

pub fn transport_error() -> Step {
    Step::Fail
}

/// Answers requests from a script, recording every request it sees.
pub struct ScriptedTransport {
    script: RefCell<VecDeque<Step>>,
    fallback: Option<Step>,
    requests: RefCell<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Step>) -> Self {
        ScriptedTransport {
            script: RefCell::new(script.into()),
            fallback: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Gives the same answer forever.
    pub fn repeating(step: Step) -> Self {
        ScriptedTransport {
            script: RefCell::new(VecDeque::new()),
            fallback: Some(step),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.requests.borrow_mut().push(request);
        let step = self
            .script
            .borrow_mut()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .expect("transport script exhausted");
        match step {
            Step::Respond(response) => Ok(response),
            Step::Fail => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
        }
    }
}

pub fn policy() -> Policy {
    Policy::from_config(&FilterConfig::default()).unwrap()
}

/// A candidate every default filter accepts.
pub fn candidate() -> Candidate {
    Candidate {
        title: "File:Dog in grass.jpg".to_string(),
        url: "https://upload.example/a/ab/Dog_in_grass.jpg".to_string(),
        thumb_url: "https://upload.example/thumb/a/ab/Dog_in_grass.jpg/1080px-Dog_in_grass.jpg"
            .to_string(),
        short_url: "https://commons.example/w/index.php?curid=4242".to_string(),
        size: 250_000,
        width: 1024,
        height: 768,
        media_type: MediaType::Bitmap,
        object_name: "Dog in grass".to_string(),
        restrictions: String::new(),
        image_description: "<p>A dog resting in the <b>grass</b>.</p>".to_string(),
        categories: vec!["Category:Dogs".to_string()],
        extra_categories: "Dogs|Grass".to_string(),
        usage_pages: vec!["Dog".to_string()],
    }
}

pub fn commons_page_json(filename: &str, width: u32, height: u32) -> serde_json::Value {
    json_value!({
        "batchcomplete": "",
        "query": {"pages": {"4242": {
            "pageid": 4242,
            "ns": 6,
            "title": format!("File:{}", filename),
            "imageinfo": [{
                "size": 250000,
                "width": width,
                "height": height,
                "thumburl": format!("https://upload.example/thumb/{}", filename),
                "url": format!("https://upload.example/{}", filename),
                "descriptionurl": format!("https://commons.example/wiki/File:{}", filename),
                "descriptionshorturl": "https://commons.example/w/index.php?curid=4242",
                "extmetadata": {
                    "ObjectName": {"value": "A dog", "source": "commons-desc-page"},
                    "ImageDescription": {"value": "<p>A dog.</p>", "source": "commons-desc-page"},
                    "Categories": {"value": "Dogs", "source": "commons-categories"}
                },
                "mediatype": "BITMAP"
            }],
            "categories": [{"ns": 14, "title": "Category:Dogs"}],
            "globalusage": []
        }}}
    })
}

pub fn analysis_json(caption: &str, tags: &[&str], adult: bool, racy: bool) -> serde_json::Value {
    let captions: Vec<serde_json::Value> = if caption.is_empty() {
        Vec::new()
    } else {
        vec![json_value!({"text": caption, "confidence": 0.9})]
    };
    json_value!({
        "description": {"tags": tags, "captions": captions},
        "adult": {"isAdultContent": adult, "isRacyContent": racy, "adultScore": 0.0, "racyScore": 0.0},
        "requestId": "00000000-0000-0000-0000-000000000000"
    })
}
