//! Plain-text reports for the inspection tools.

use std::fmt::Write;

use picdescbot::models::{Candidate, Description};
use picdescbot::pipeline::Discard;
use picdescbot::source::Verdict;

pub fn candidate(candidate: &Candidate) -> String {
    let mut out = String::new();
    // Writing into a String can't fail.
    let _ = writeln!(out, "title:        {}", candidate.title);
    let _ = writeln!(out, "url:          {}", candidate.url);
    let _ = writeln!(out, "thumbnail:    {}", candidate.thumb_url);
    let _ = writeln!(out, "source:       {}", candidate.short_url);
    let _ = writeln!(
        out,
        "size:         {} bytes, {}x{}, {:?}",
        candidate.size, candidate.width, candidate.height, candidate.media_type
    );
    let _ = writeln!(out, "object name:  {}", candidate.object_name);
    if !candidate.restrictions.is_empty() {
        let _ = writeln!(out, "restrictions: {}", candidate.restrictions);
    }
    let _ = writeln!(out, "categories:   {}", candidate.categories.join(", "));
    if !candidate.extra_categories.is_empty() {
        let _ = writeln!(out, "metadata categories: {}", candidate.extra_categories);
    }
    if !candidate.usage_pages.is_empty() {
        let _ = writeln!(out, "used on:      {}", candidate.usage_pages.join(", "));
    }
    out
}

pub fn verdict(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Missing => "no usable image under that name\n".to_string(),
        Verdict::Rejected(c, rejection) => {
            format!("{}\nREJECTED: {}\n", candidate(c), rejection)
        },
        Verdict::Accepted(c) => format!(
            "{}\nACCEPTED, would be described from {}\n",
            candidate(c),
            c.preferred_url()
        ),
    }
}

pub fn description(description: &Description, outcome: &Result<String, Discard>) -> String {
    let mut out = String::new();
    if description.captions.is_empty() {
        let _ = writeln!(out, "captions:     (none)");
    }
    for caption in &description.captions {
        let _ = writeln!(out, "caption:      {} ({:.3})", caption.text, caption.confidence);
    }
    let _ = writeln!(out, "tags:         {}", description.tags.join(", "));
    let _ = writeln!(
        out,
        "adult: {}, racy: {}",
        description.is_adult, description.is_racy
    );
    match outcome {
        Ok(caption) => {
            let _ = writeln!(out, "\nACCEPTED: {}", caption);
        },
        Err(discard) => {
            let _ = writeln!(out, "\nDISCARDED: {}", discard);
        },
    }
    out
}

#[cfg(test)]
mod tests {
    use picdescbot::filter::Rejection;
    use picdescbot::models::Caption;
    use picdescbot_api_structs::mediawiki::MediaType;

    use super::*;

    fn dog() -> Candidate {
        Candidate {
            title: "File:Dog.jpg".to_string(),
            url: "https://upload.example/Dog.jpg".to_string(),
            thumb_url: "https://upload.example/thumb/Dog.jpg".to_string(),
            short_url: "https://commons.example/?curid=1".to_string(),
            size: 1_000,
            width: 640,
            height: 480,
            media_type: MediaType::Bitmap,
            object_name: "Dog".to_string(),
            restrictions: String::new(),
            image_description: String::new(),
            categories: vec!["Category:Dogs".to_string()],
            extra_categories: String::new(),
            usage_pages: vec![],
        }
    }

    #[test]
    fn accepted_shows_vision_url() {
        let report = verdict(&Verdict::Accepted(Box::new(dog())));
        assert!(report.contains("title:        File:Dog.jpg"));
        assert!(report.contains("640x480, Bitmap"));
        assert!(report.contains("ACCEPTED, would be described from https://upload.example/Dog.jpg"));
        assert!(!report.contains("restrictions"));
    }

    #[test]
    fn rejected_shows_reason() {
        let report = verdict(&Verdict::Rejected(
            Box::new(dog()),
            Rejection::TooSmall {
                width: 40,
                height: 480,
            },
        ));
        assert!(report.contains("REJECTED: too small (40x480)"));
    }

    #[test]
    fn discarded_description() {
        let description = Description {
            captions: vec![Caption {
                text: "a screenshot of a cell phone".to_string(),
                confidence: 0.5,
            }],
            tags: vec!["text".to_string()],
            is_adult: false,
            is_racy: false,
        };
        let report = super::description(
            &description,
            &Err(Discard::Tag {
                tag: "text".to_string(),
            }),
        );
        assert!(report.contains("caption:      a screenshot of a cell phone (0.500)"));
        assert!(report.contains("DISCARDED: tag blacklist: text"));
    }
}
