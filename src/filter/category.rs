/// Category fragments matched as plain substrings, case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct CategoryFilter {
    fragments: Vec<String>,
}

pub fn default_category_blacklist() -> Vec<String> {
    [
        "september 11",
        "hitler",
        "nazi",
        "antisemit",
        "libel",
        "apartheid",
        "racism",
        "lynching",
        "cartoons",
        "holocaust",
        "stereotypes",
        "flags",
        "porn",
        "homophobia",
        "transphobia",
        "logos",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl CategoryFilter {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CategoryFilter {
            fragments: fragments
                .into_iter()
                .map(|fragment| fragment.as_ref().to_lowercase())
                .filter(|fragment| !fragment.is_empty())
                .collect(),
        }
    }

    /// First blacklisted fragment contained in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.fragments
            .iter()
            .find(|fragment| text.contains(fragment.as_str()))
            .map(String::as_str)
    }
}

/// Drops markup from a repository description and decodes the handful of
/// entities it commonly contains.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            },
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {},
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_is_substring() {
        let filter = CategoryFilter::new(["flags", "september 11"]);
        assert_eq!(filter.find("Category:Flags of Europe"), Some("flags"));
        assert_eq!(
            filter.find("Category:September 11 attacks"),
            Some("september 11")
        );
        assert_eq!(filter.find("Category:Dogs"), None);
    }

    #[test]
    fn strip_html_removes_tags() {
        assert_eq!(
            strip_html("<div class=\"description\"><p>A <b>red</b> barn</p></div>"),
            "A red barn"
        );
    }

    #[test]
    fn strip_html_keeps_words_apart() {
        assert_eq!(strip_html("one<br/>two"), "one two");
    }

    #[test]
    fn strip_html_decodes_entities() {
        assert_eq!(
            strip_html("Tom &amp; Jerry&nbsp;&quot;cartoon&quot; &lt;1940&gt;"),
            "Tom & Jerry \"cartoon\" <1940>"
        );
    }

    #[test]
    fn strip_html_plain_and_empty() {
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html(""), "");
    }
}
