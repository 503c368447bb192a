use picdescbot_api_structs::vision::Analysis;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

/// What the vision service said about one picture.
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
pub struct Description {
    pub captions: Vec<Caption>,
    pub tags: Vec<String>,
    pub is_adult: bool,
    pub is_racy: bool,
}

impl Description {
    pub fn first_caption(&self) -> Option<&str> {
        self.captions.first().map(|c| c.text.as_str())
    }
}

impl From<Analysis> for Description {
    fn from(analysis: Analysis) -> Self {
        Description {
            captions: analysis
                .description
                .captions
                .into_iter()
                .map(|c| Caption {
                    text: c.text,
                    confidence: c.confidence,
                })
                .collect(),
            tags: analysis.description.tags,
            is_adult: analysis.adult.is_adult_content,
            is_racy: analysis.adult.is_racy_content,
        }
    }
}
