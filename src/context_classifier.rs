use crate::category::{add_score, Category, ScoreMap};
use crate::templates::{placeholder_indices, placeholder_spans};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_WINDOW: usize = 20;

static RE_DOTTED_QUAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\.\d+\.\d+\.\d+").unwrap()
});

/// Keywords that, when any one occurs in the lower-cased window, add
/// `weight` to `category`.
pub struct KeywordGroup {
    pub keywords: &'static [&'static str],
    pub category: Category,
    pub weight: u32,
    /// Only fires when the window also holds a dotted quad.
    pub needs_dotted_quad: bool,
}

const fn group(keywords: &'static [&'static str], category: Category, weight: u32) -> KeywordGroup {
    KeywordGroup { keywords, category, weight, needs_dotted_quad: false }
}

/// Every group is tested against every window; matches accumulate.
pub static KEYWORD_GROUPS: &[KeywordGroup] = &[
    group(&["ip", "address", "rhost", "from", "remoteaddr"], Category::Ip, 2),
    KeywordGroup { keywords: &["port", ":"], category: Category::Port, weight: 2, needs_dotted_quad: true },
    group(&["user", "username", "logname", "uid", "account"], Category::Username, 2),
    group(&["host", "hostname", "server", "node"], Category::Hostname, 2),
    group(&["time", "date", "timestamp", "ts"], Category::Timestamp, 2),
    group(&["month", "day", "year"], Category::Date, 1),
    group(&["hour", "minute", "second", "ms"], Category::Time, 1),
    group(&["pid", "process"], Category::Pid, 2),
    group(&["method"], Category::HttpMethod, 2),
    group(&["status", "code"], Category::HttpStatus, 2),
    group(&["uri", "url", "path"], Category::Path, 2),
];

/// Guess applied when nothing else scored a placeholder. Heuristics are
/// tried in order and the first that fires is the only one applied.
pub trait FallbackHeuristic: Send + Sync {
    /// `ordinal` is the placeholder's position among the template's marker
    /// occurrences. Returns whether the heuristic fired.
    fn apply(&self, content: &str, ordinal: usize, scores: &mut ScoreMap) -> bool;
}

/// Early placeholders in a line are usually its timestamp.
#[derive(Debug, Clone)]
pub struct LeadingOrdinal {
    pub below: usize,
    pub weight: u32,
}

impl FallbackHeuristic for LeadingOrdinal {
    fn apply(&self, _content: &str, ordinal: usize, scores: &mut ScoreMap) -> bool {
        if ordinal >= self.below {
            return false;
        }
        add_score(scores, Category::Time, self.weight);
        true
    }
}

/// Corpus-specific: templates containing `needle` carry their time spread
/// over the first `below` placeholders.
#[derive(Debug, Clone)]
pub struct LiteralMarker {
    pub needle: String,
    pub below: usize,
    pub weight: u32,
}

impl FallbackHeuristic for LiteralMarker {
    fn apply(&self, content: &str, ordinal: usize, scores: &mut ScoreMap) -> bool {
        if ordinal >= self.below || !content.contains(self.needle.as_str()) {
            return false;
        }
        add_score(scores, Category::Time, self.weight);
        true
    }
}

/// Serializable description of a fallback heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackSpec {
    Ordinal { below: usize, weight: u32 },
    Literal { needle: String, below: usize, weight: u32 },
}

impl FallbackSpec {
    pub fn build(&self) -> Box<dyn FallbackHeuristic> {
        match self {
            FallbackSpec::Ordinal { below, weight } => Box::new(LeadingOrdinal { below: *below, weight: *weight }),
            FallbackSpec::Literal { needle, below, weight } => Box::new(LiteralMarker {
                needle: needle.clone(),
                below: *below,
                weight: *weight,
            }),
        }
    }
}

pub fn default_fallbacks() -> Vec<FallbackSpec> {
    vec![
        FallbackSpec::Ordinal { below: 2, weight: 1 },
        FallbackSpec::Literal { needle: "LabSZ".to_string(), below: 3, weight: 1 },
    ]
}

/// Scores a placeholder from the text surrounding its markers.
pub struct ContextClassifier {
    window: usize,
    fallbacks: Vec<Box<dyn FallbackHeuristic>>,
}

impl Default for ContextClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WINDOW, &default_fallbacks())
    }
}

impl ContextClassifier {
    pub fn new(window: usize, fallbacks: &[FallbackSpec]) -> Self {
        Self { window, fallbacks: fallbacks.iter().map(FallbackSpec::build).collect() }
    }

    /// Keyword cues, or the fallback guess when no cue matched.
    pub fn score(&self, content: &str, index: u64) -> ScoreMap {
        let scores = self.score_keywords(content, index);
        if !scores.is_empty() {
            return scores;
        }
        self.score_fallback(content, index)
    }

    /// Keyword cues only, summed over every occurrence of the marker.
    pub fn score_keywords(&self, content: &str, index: u64) -> ScoreMap {
        let mut scores = ScoreMap::new();
        for (span, _) in placeholder_spans(content).into_iter().filter(|(_, i)| *i == index) {
            let window = window_around(content, span.start, span.end, self.window);
            score_window(window, &mut scores);
        }
        scores
    }

    pub fn score_fallback(&self, content: &str, index: u64) -> ScoreMap {
        let mut scores = ScoreMap::new();
        let Some(ordinal) = placeholder_indices(content).iter().position(|&i| i == index) else {
            return scores;
        };
        for heuristic in &self.fallbacks {
            if heuristic.apply(content, ordinal, &mut scores) {
                break;
            }
        }
        scores
    }
}

fn score_window(window: &str, scores: &mut ScoreMap) {
    let lower = window.to_lowercase();
    for g in KEYWORD_GROUPS {
        if !g.keywords.iter().any(|k| lower.contains(k)) {
            continue;
        }
        if g.needs_dotted_quad && !RE_DOTTED_QUAD.is_match(window) {
            continue;
        }
        add_score(scores, g.category, g.weight);
    }
}

/// Up to `width` characters either side of `[start, end)`, clamped to the content.
fn window_around(content: &str, start: usize, end: usize, width: usize) -> &str {
    let from = if width == 0 {
        start
    } else {
        content[..start].char_indices().rev().nth(width - 1).map_or(0, |(i, _)| i)
    };
    let to = content[end..].char_indices().nth(width).map_or(content.len(), |(i, _)| end + i);
    &content[from..to]
}
