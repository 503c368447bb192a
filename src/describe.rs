use picdescbot_api_structs::vision::{AnalyzeRequest, Analysis};
use thiserror::Error;
use url::Url;

use crate::http::{Request, Transport};
use crate::models::Description;
use crate::timing::Timing;

pub const MAX_ATTEMPTS: u32 = 15;
const RATE_LIMIT_BACKOFF: u32 = 2;
const ERROR_BACKOFF_BASE: u32 = 20;
const ERROR_BACKOFF_STEP: u32 = 4;

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("vision service still rate limiting after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("unexpected vision service response for {url}: {body}")]
    Malformed {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

/// `Ok(None)` means the service never produced a usable answer in time.
pub trait Describer {
    fn describe(&self, url: &str) -> Result<Option<Description>, DescribeError>;
}

impl<D: Describer + ?Sized> Describer for &D {
    fn describe(&self, url: &str) -> Result<Option<Description>, DescribeError> {
        (**self).describe(url)
    }
}

/// Azure Computer Vision "analyze" client. Transport and retries only; it
/// doesn't look at what the description says.
pub struct VisionClient<T> {
    transport: T,
    endpoint: Url,
    api_key: String,
    timing: Timing,
}

impl<T: Transport> VisionClient<T> {
    pub fn new(transport: T, endpoint: Url, api_key: String, timing: Timing) -> Self {
        VisionClient {
            transport,
            endpoint,
            api_key,
            timing,
        }
    }

    fn request(&self, picture_url: &str) -> Request {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("visualFeatures", "Description,Adult");
        // Serializing a struct holding one &str can't fail.
        let body = serde_json::to_vec(&AnalyzeRequest { url: picture_url }).unwrap_or_default();

        Request::post(url.as_str(), body)
            .header("Content-Type", "application/json")
            .header("Ocp-Apim-Subscription-Key", self.api_key.as_str())
    }
}

impl<T: Transport> Describer for VisionClient<T> {
    #[tracing::instrument(skip(self))]
    fn describe(&self, url: &str) -> Result<Option<Description>, DescribeError> {
        let mut errors = 0;

        for attempt in 1..=MAX_ATTEMPTS {
            let last = attempt == MAX_ATTEMPTS;
            let response = match self.transport.send(self.request(url)) {
                Ok(response) => response,
                Err(err) => {
                    errors += 1;
                    tracing::warn!(attempt, error = %err, "vision request failed");
                    if !last {
                        self.timing
                            .sleep(ERROR_BACKOFF_BASE + errors * ERROR_BACKOFF_STEP);
                    }
                    continue;
                },
            };

            match response.status {
                429 => {
                    tracing::warn!(attempt, message = %response.text(), "rate limited");
                    if last {
                        tracing::error!("failed after retrying");
                        return Err(DescribeError::RateLimited { attempts: attempt });
                    }
                    self.timing.sleep(RATE_LIMIT_BACKOFF);
                },
                200 | 201 if response.body.is_empty() => {
                    tracing::info!(attempt, "empty vision response");
                },
                200 | 201 => {
                    let analysis: Analysis = serde_json::from_slice(&response.body).map_err(
                        |source| DescribeError::Malformed {
                            url: url.to_string(),
                            body: response.text(),
                            source,
                        },
                    )?;
                    return Ok(Some(Description::from(analysis)));
                },
                status => {
                    errors += 1;
                    let sleep = ERROR_BACKOFF_BASE + errors * ERROR_BACKOFF_STEP;
                    tracing::warn!(attempt, status, body = %response.text(), sleep, "vision service error");
                    if !last {
                        self.timing.sleep(sleep);
                    }
                },
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::test_helpers::{
        analysis_json, json, ok, status, transport_error, ScriptedTransport,
    };

    fn client(transport: &ScriptedTransport) -> VisionClient<&ScriptedTransport> {
        VisionClient::new(
            transport,
            Url::parse("https://vision.example/vision/v3.2/analyze").unwrap(),
            "key".to_string(),
            Timing::instant(),
        )
    }

    #[test]
    fn request_shape() {
        let transport = ScriptedTransport::new(vec![json(analysis_json(
            "a dog lying in the grass",
            &["dog"],
            false,
            false,
        ))]);
        client(&transport).describe("https://u.example/Dog.jpg").unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.url,
            "https://vision.example/vision/v3.2/analyze?visualFeatures=Description%2CAdult"
        );
        assert!(request
            .headers
            .contains(&("Ocp-Apim-Subscription-Key".to_string(), "key".to_string())));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({"url": "https://u.example/Dog.jpg"}));
    }

    #[test]
    fn parses_description() {
        let transport = ScriptedTransport::new(vec![json(analysis_json(
            "a dog lying in the grass",
            &["dog", "grass"],
            false,
            true,
        ))]);
        let description = client(&transport).describe("u").unwrap().unwrap();
        assert_eq!(description.first_caption(), Some("a dog lying in the grass"));
        assert_eq!(description.tags, vec!["dog", "grass"]);
        assert!(description.is_racy);
        assert!(!description.is_adult);
    }

    #[test]
    fn rate_limit_then_success() {
        let transport = ScriptedTransport::new(vec![
            status(429),
            status(429),
            json(analysis_json("a cat", &[], false, false)),
        ]);
        let description = client(&transport).describe("u").unwrap();
        assert!(description.is_some());
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn rate_limited_until_cap_is_fatal() {
        let transport = ScriptedTransport::repeating(status(429));
        let err = client(&transport).describe("u").unwrap_err();
        assert!(matches!(err, DescribeError::RateLimited { attempts: MAX_ATTEMPTS }));
        assert_eq!(transport.requests().len(), MAX_ATTEMPTS as usize);
    }

    #[test]
    fn server_errors_exhaust_to_none() {
        let transport = ScriptedTransport::repeating(status(500));
        assert!(client(&transport).describe("u").unwrap().is_none());
        assert_eq!(transport.requests().len(), MAX_ATTEMPTS as usize);
    }

    #[test]
    fn transport_error_is_retried() {
        let transport = ScriptedTransport::new(vec![
            transport_error(),
            status(502),
            json(analysis_json("a cat", &[], false, false)),
        ]);
        assert!(client(&transport).describe("u").unwrap().is_some());
    }

    #[test]
    fn empty_body_retries() {
        let transport = ScriptedTransport::new(vec![
            ok(Vec::new()),
            json(analysis_json("a cat", &[], false, false)),
        ]);
        assert!(client(&transport).describe("u").unwrap().is_some());
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn empty_body_forever_is_none() {
        let transport = ScriptedTransport::repeating(ok(Vec::new()));
        assert!(client(&transport).describe("u").unwrap().is_none());
        assert_eq!(transport.requests().len(), MAX_ATTEMPTS as usize);
    }

    #[test]
    fn malformed_body_is_fatal() {
        let transport = ScriptedTransport::new(vec![ok(b"{\"requestId\": \"x\"}".to_vec())]);
        match client(&transport).describe("https://u.example/Dog.jpg") {
            Err(DescribeError::Malformed { url, body, .. }) => {
                assert_eq!(url, "https://u.example/Dog.jpg");
                assert!(body.contains("requestId"));
            },
            other => panic!("unexpected result {:?}", other),
        }
    }
}
