use std::collections::BTreeMap;
use std::fmt;

/// Semantic role a placeholder can be inferred to hold.
///
/// `Timestamp` and `Ipv6` are spellings produced by the classifiers that
/// normalize onto `Time` and `Ip` before labels are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Date,
    Email,
    Hash,
    Hostname,
    HttpMethod,
    HttpStatus,
    Ip,
    Ipv6,
    Mac,
    Path,
    Pid,
    Port,
    Time,
    Timestamp,
    Url,
    Username,
    Uuid,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Date => "date",
            Category::Email => "email",
            Category::Hash => "hash",
            Category::Hostname => "hostname",
            Category::HttpMethod => "http_method",
            Category::HttpStatus => "http_status",
            Category::Ip => "ip",
            Category::Ipv6 => "ipv6",
            Category::Mac => "mac",
            Category::Path => "path",
            Category::Pid => "pid",
            Category::Port => "port",
            Category::Time => "time",
            Category::Timestamp => "timestamp",
            Category::Url => "url",
            Category::Username => "username",
            Category::Uuid => "uuid",
        }
    }

    /// Canonical spelling used for alias names.
    pub fn canonical(self) -> Category {
        match self {
            Category::Timestamp => Category::Time,
            Category::Ipv6 => Category::Ip,
            other => other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category -> accumulated weight. Variant order matches name order, so
/// iteration is alphabetical by label.
pub type ScoreMap = BTreeMap<Category, u32>;

pub fn add_score(scores: &mut ScoreMap, category: Category, weight: u32) {
    *scores.entry(category).or_insert(0) += weight;
}

/// Sum two score maps key-wise.
pub fn sum_scores(a: &ScoreMap, b: &ScoreMap) -> ScoreMap {
    let mut out = a.clone();
    for (cat, w) in b {
        add_score(&mut out, *cat, *w);
    }
    out
}

/// Fold synonym categories into their canonical key, summing weights.
pub fn normalize(scores: &ScoreMap) -> ScoreMap {
    let mut out = ScoreMap::new();
    for (cat, w) in scores {
        add_score(&mut out, cat.canonical(), *w);
    }
    out
}
