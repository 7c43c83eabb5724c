use crate::category::{add_score, Category, ScoreMap};
use crate::shapes;

pub const DEFAULT_VALUE_SAMPLE_CAP: usize = 100;

/// One entry of the value rule chain.
pub struct ValueRule {
    pub category: Category,
    pub weight: u32,
    pub matches: fn(&str) -> bool,
}

/// Evaluated top to bottom; the first matching rule claims the sample.
pub static VALUE_RULES: &[ValueRule] = &[
    ValueRule { category: Category::Ip, weight: 3, matches: shapes::is_ipv4 },
    ValueRule { category: Category::Ipv6, weight: 3, matches: shapes::is_ipv6 },
    ValueRule { category: Category::Mac, weight: 3, matches: shapes::is_mac },
    ValueRule { category: Category::Email, weight: 3, matches: shapes::is_email },
    ValueRule { category: Category::Url, weight: 3, matches: shapes::is_url },
    ValueRule { category: Category::Uuid, weight: 3, matches: shapes::is_uuid },
    ValueRule { category: Category::Hash, weight: 2, matches: shapes::is_long_hex },
    ValueRule { category: Category::HttpMethod, weight: 2, matches: shapes::is_http_method },
    ValueRule { category: Category::HttpStatus, weight: 2, matches: http_status_slot },
    ValueRule { category: Category::Path, weight: 1, matches: shapes::is_path },
    ValueRule { category: Category::Port, weight: 2, matches: port_slot },
    ValueRule { category: Category::Time, weight: 2, matches: shapes::is_time },
    ValueRule { category: Category::Username, weight: 1, matches: shapes::is_username },
    ValueRule { category: Category::Hostname, weight: 1, matches: shapes::is_hostname },
];

// Three-digit strings and digit runs are claimed by their slot even when out
// of range; they then score nothing rather than falling through.
fn http_status_slot(s: &str) -> bool {
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit())
}

fn port_slot(s: &str) -> bool {
    shapes::is_port_shaped(s)
}

fn in_range(rule: &ValueRule, s: &str) -> bool {
    match rule.category {
        Category::HttpStatus => shapes::is_http_status(s),
        Category::Port => shapes::is_port(s),
        _ => true,
    }
}

/// Scores a variable from its observed samples. First match wins per sample.
#[derive(Debug, Clone, Copy)]
pub struct ValueClassifier {
    sample_cap: usize,
}

impl Default for ValueClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_SAMPLE_CAP)
    }
}

impl ValueClassifier {
    pub fn new(sample_cap: usize) -> Self {
        Self { sample_cap }
    }

    pub fn score<S: AsRef<str>>(&self, samples: &[S]) -> ScoreMap {
        let mut scores = ScoreMap::new();
        for sample in samples.iter().take(self.sample_cap) {
            let s = sample.as_ref().trim();
            if s.is_empty() {
                continue;
            }
            if let Some((category, weight)) = classify(s) {
                add_score(&mut scores, category, weight);
            }
        }
        scores
    }
}

/// Category and weight of a single trimmed value, if any rule claims it.
pub fn classify(s: &str) -> Option<(Category, u32)> {
    let rule = VALUE_RULES.iter().find(|r| (r.matches)(s))?;
    in_range(rule, s).then_some((rule.category, rule.weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_samples_score_three_each() {
        let s = ValueClassifier::default().score(&["192.168.1.1", "10.0.0.5", "8.8.8.8"]);
        assert_eq!(s.len(), 1);
        assert_eq!(s[&Category::Ip], 9);
    }

    #[test]
    fn empty_and_blank_samples_yield_nothing() {
        let empty: [&str; 0] = [];
        assert!(ValueClassifier::default().score(&empty).is_empty());
        assert!(ValueClassifier::default().score(&["  ", ""]).is_empty());
    }

    #[test]
    fn first_rule_wins() {
        // 16+ hex digits that are also all-numeric stay `hash`
        assert_eq!(classify("1234567890123456"), Some((Category::Hash, 2)));
        // three digits are http status before port
        assert_eq!(classify("200"), Some((Category::HttpStatus, 2)));
        assert_eq!(classify("8080"), Some((Category::Port, 2)));
        // HH:MM:SS is caught by the loose ipv6 shape first
        assert_eq!(classify("12:30:45"), Some((Category::Ipv6, 3)));
        assert_eq!(classify("12:30"), Some((Category::Time, 2)));
        assert_eq!(classify("/var/log"), Some((Category::Path, 1)));
        assert_eq!(classify("GET"), Some((Category::HttpMethod, 2)));
        assert_eq!(classify("root"), Some((Category::Username, 1)));
        assert_eq!(classify("db.internal"), Some((Category::Hostname, 1)));
        assert_eq!(classify("user@example.com"), Some((Category::Email, 3)));
        assert_eq!(classify("aa:bb:cc:dd:ee:ff"), Some((Category::Ipv6, 3)));
        assert_eq!(classify("aa-bb-cc-dd-ee-ff"), Some((Category::Mac, 3)));
    }

    #[test]
    fn out_of_range_numbers_score_nothing() {
        assert_eq!(classify("700"), None);
        assert_eq!(classify("70000"), None);
        assert_eq!(classify("0"), None);
    }

    #[test]
    fn cap_limits_scored_samples() {
        let samples: Vec<String> = (0..150).map(|_| "10.1.1.1".to_string()).collect();
        let s = ValueClassifier::new(100).score(&samples);
        assert_eq!(s[&Category::Ip], 300);
    }

    #[test]
    fn order_does_not_change_scores() {
        let a = ["root", "10.0.0.1", "GET", "/tmp/x", "22"];
        let mut b = a;
        b.reverse();
        let c = ValueClassifier::default();
        assert_eq!(c.score(&a), c.score(&b));
    }
}
