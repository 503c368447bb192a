use std::collections::BTreeMap;

/// Lowercased maximal runs of alphanumeric characters.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Clone, Debug)]
struct Entry {
    root: String,
    variants: Vec<Vec<String>>,
}

impl Entry {
    fn new(root: &str, variants: &[String]) -> Option<Self> {
        let root = root.trim().to_lowercase();
        let mut tokenized: Vec<Vec<String>> = std::iter::once(root.as_str())
            .chain(variants.iter().map(String::as_str))
            .map(tokenize)
            .filter(|tokens| !tokens.is_empty())
            .collect();
        tokenized.dedup();

        if tokenized.is_empty() {
            return None;
        }
        Some(Entry {
            root,
            variants: tokenized,
        })
    }

    fn matches(&self, tokens: &[String]) -> bool {
        self.variants.iter().any(|variant| {
            tokens
                .windows(variant.len())
                .any(|window| window == variant.as_slice())
        })
    }
}

/// Whole-token blacklist.
///
/// A variant matches when its tokens appear as a contiguous run of the text's
/// tokens, so `ham` matches "Ham!" and "ham sandwich" but not "shame".
#[derive(Clone, Debug, Default)]
pub struct WordFilter {
    entries: Vec<Entry>,
}

impl WordFilter {
    pub fn new(words: &BTreeMap<String, Vec<String>>) -> Self {
        WordFilter {
            entries: words
                .iter()
                .filter_map(|(root, variants)| Entry::new(root, variants))
                .collect(),
        }
    }

    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries
            .extend(words.into_iter().filter_map(|word| Entry::new(word.as_ref(), &[])));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Root word of the first entry found in `text`.
    pub fn find(&self, text: &str) -> Option<&str> {
        let tokens = tokenize(text);
        self.entries
            .iter()
            .find(|entry| entry.matches(&tokens))
            .map(|entry| entry.root.as_str())
    }

    pub fn blacklisted(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

/// Case-insensitive substring blacklist for multi-word phrases.
#[derive(Clone, Debug, Default)]
pub struct PhraseFilter {
    phrases: Vec<String>,
}

impl PhraseFilter {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PhraseFilter {
            phrases: phrases
                .into_iter()
                .map(|phrase| phrase.as_ref().to_lowercase())
                .filter(|phrase| !phrase.trim().is_empty())
                .collect(),
        }
    }

    pub fn find(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| text.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn blacklisted(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(words: &[(&str, &[&str])]) -> WordFilter {
        let words = words
            .iter()
            .map(|(root, variants)| {
                (
                    root.to_string(),
                    variants.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();
        WordFilter::new(&words)
    }

    #[test]
    fn whole_token_matches() {
        let filter = filter(&[("ham", &[])]);
        assert!(filter.blacklisted("a ham sandwich"));
        assert!(filter.blacklisted("Ham!"));
        assert!(filter.blacklisted("green-ham"));
    }

    #[test]
    fn substring_of_other_word_does_not_match() {
        let filter = filter(&[("ham", &[])]);
        assert!(!filter.blacklisted("what a shame"));
        assert!(!filter.blacklisted("hamburger"));
        assert!(!filter.blacklisted("Birmingham"));
    }

    #[test]
    fn case_insensitive() {
        let filter = filter(&[("Nazi", &[])]);
        assert!(filter.blacklisted("NAZI rally"));
        assert_eq!(filter.find("a nazi flag"), Some("nazi"));
    }

    #[test]
    fn variants_report_root() {
        let filter = filter(&[("nazi", &["nazis", "nazism"])]);
        assert_eq!(filter.find("history of Nazism"), Some("nazi"));
        assert!(!filter.blacklisted("nazirite vow"));
    }

    #[test]
    fn multi_token_variant() {
        let filter = filter(&[("swastika", &["hooked cross"])]);
        assert!(filter.blacklisted("a Hooked-Cross emblem"));
        assert!(!filter.blacklisted("a cross hooked on the wall"));
    }

    #[test]
    fn add_words_extends() {
        let mut filter = WordFilter::default();
        assert!(!filter.blacklisted("hitler"));
        filter.add_words(["hitler", "  ", "nazi"]);
        assert_eq!(filter.len(), 2);
        assert!(filter.blacklisted("Portrait of Hitler"));
    }

    #[test]
    fn phrases_match_as_substrings() {
        let phrases = PhraseFilter::new(["a suit and tie", "white power"]);
        assert_eq!(
            phrases.find("A man in A Suit And Tie"),
            Some("a suit and tie")
        );
        assert!(phrases.blacklisted("whitepower? no, white powered"));
        assert!(!phrases.blacklisted("a suit and a tie"));
    }

    #[test]
    fn empty_phrases_ignored() {
        let phrases = PhraseFilter::new(["", "   "]);
        assert!(!phrases.blacklisted("anything"));
    }
}
