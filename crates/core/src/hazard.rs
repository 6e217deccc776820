//! Dangerous-goods detection from free-text commodity descriptions.
//!
//! Waybills often describe hazardous cargo only in prose ("DGX CHEMICALS")
//! while leaving the container's class and UN fields blank. The flattener asks
//! a [`HazardClassifier`] for a verdict and, on detection, writes a class label
//! that cannot be confused with a declared IMDG class.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens that mark a commodity text as dangerous cargo.
pub const DEFAULT_HAZARD_KEYWORDS: [&str; 5] = ["DGX", "DANGEROUS", "HAZ", "IMO", "HAZMAT"];

/// Class label written for heuristically detected dangerous goods.
pub const DETECTED_CLASS_LABEL: &str = "DETECTED (DGX)";

static STANDARD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    keyword_pattern(DEFAULT_HAZARD_KEYWORDS.iter().copied())
        .expect("invalid hazard keyword regex")
        .expect("hazard keyword list is empty")
});

/// Outcome of classifying one commodity text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HazardVerdict {
    /// Nothing in the text suggests dangerous goods.
    Clear,
    /// The text contains `keyword` as a whole word.
    Detected {
        /// Matched token, as it appeared in the text.
        keyword: String,
    },
}

impl HazardVerdict {
    /// Returns `true` for [`HazardVerdict::Detected`].
    pub fn is_detected(&self) -> bool {
        matches!(self, HazardVerdict::Detected { .. })
    }
}

/// Pure policy deciding whether a commodity description implies dangerous goods.
pub trait HazardClassifier: Send + Sync {
    /// Inspect `commodity` and return a verdict.
    fn classify(&self, commodity: &str) -> HazardVerdict;

    /// Class label to synthesise when [`classify`](Self::classify) detects something.
    fn detected_label(&self) -> &str {
        DETECTED_CLASS_LABEL
    }
}

/// Case-insensitive whole-word keyword matcher.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    pattern: Option<Regex>,
    label: String,
}

impl KeywordClassifier {
    /// Build a classifier from an arbitrary keyword list. Blank keywords are ignored;
    /// an empty list yields a classifier that never detects anything.
    pub fn new<I, S>(keywords: I, label: impl Into<String>) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<S> = keywords.into_iter().collect();
        let pattern = keyword_pattern(keywords.iter().map(|k| k.as_ref()))?;
        Ok(Self {
            pattern,
            label: label.into(),
        })
    }

    /// The built-in keyword set with the default label.
    pub fn standard() -> Self {
        Self {
            pattern: Some(STANDARD_PATTERN.clone()),
            label: DETECTED_CLASS_LABEL.to_string(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl HazardClassifier for KeywordClassifier {
    fn classify(&self, commodity: &str) -> HazardVerdict {
        match self.pattern.as_ref().and_then(|re| re.find(commodity)) {
            Some(found) => HazardVerdict::Detected {
                keyword: found.as_str().to_string(),
            },
            None => HazardVerdict::Clear,
        }
    }

    fn detected_label(&self) -> &str {
        &self.label
    }
}

fn keyword_pattern<'a>(
    keywords: impl Iterator<Item = &'a str>,
) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = keywords
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map(Some)
}
