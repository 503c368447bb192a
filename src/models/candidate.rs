use picdescbot_api_structs::mediawiki::{meta_text, MediaType, Page};

/// Pictures above this many bytes are described through their thumbnail.
pub const MAX_DESCRIBE_BYTES: u64 = 3_000_000;
/// Pictures wider or taller than this are described through their thumbnail.
pub const MAX_DESCRIBE_DIMENSION: u32 = 8192;

/// One file fetched from the media repository, not yet validated.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub thumb_url: String,
    pub short_url: String,
    pub size: u64,
    pub width: u32,
    pub height: u32,
    pub media_type: MediaType,
    pub object_name: String,
    pub restrictions: String,
    pub image_description: String,
    pub categories: Vec<String>,
    pub extra_categories: String,
    pub usage_pages: Vec<String>,
}

impl Candidate {
    /// `None` when the page carries no image info, e.g. a missing file.
    pub fn from_page(page: Page) -> Option<Self> {
        let info = page.imageinfo.into_iter().next()?;
        let meta = &info.extmetadata;

        let short_url = info
            .descriptionshorturl
            .clone()
            .or_else(|| info.descriptionurl.clone())
            .unwrap_or_else(|| info.url.clone());

        Some(Candidate {
            title: page.title,
            thumb_url: info.thumburl.clone().unwrap_or_else(|| info.url.clone()),
            short_url,
            size: info.size,
            width: info.width,
            height: info.height,
            media_type: info.mediatype,
            object_name: meta_text(&meta.object_name),
            restrictions: meta_text(&meta.restrictions),
            image_description: meta_text(&meta.image_description),
            extra_categories: meta_text(&meta.categories),
            categories: page.categories.into_iter().map(|c| c.title).collect(),
            usage_pages: page.globalusage.into_iter().map(|u| u.title).collect(),
            url: info.url,
        })
    }

    /// The vision service chokes on very large files, so those go through the
    /// repository's scaled-down rendition instead.
    pub fn preferred_url(&self) -> &str {
        if self.size > MAX_DESCRIBE_BYTES
            || self.width > MAX_DESCRIBE_DIMENSION
            || self.height > MAX_DESCRIBE_DIMENSION
        {
            &self.thumb_url
        } else {
            &self.url
        }
    }
}
