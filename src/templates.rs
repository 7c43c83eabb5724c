use crate::ingest::{self, IngestError, IngestStats};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, trace, warn};

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<V(\d+)>").unwrap()
});

/// Encoded variable identifier used to correlate samples with positions.
/// Wide enough that every `u64` template id and index encodes without loss.
pub type VarId = i128;

/// A placeholder slot: (template id, placeholder index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub template_id: u64,
    pub index: u64,
}

impl Position {
    pub fn new(template_id: u64, index: u64) -> Self {
        Self { template_id, index }
    }

    pub fn var_id(&self) -> VarId {
        encode_var_id(self.template_id, self.index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}_V{}", self.template_id, self.index)
    }
}

pub fn encode_var_id(template_id: u64, index: u64) -> VarId {
    (VarId::from(template_id) << 16) | (VarId::from(index) << 8)
}

/// Every marker occurrence in `content` as (byte span, index), in order.
/// Leading zeros are accepted, so `<V01>` is index 1.
pub fn placeholder_spans(content: &str) -> Vec<(Range<usize>, u64)> {
    RE_PLACEHOLDER
        .captures_iter(content)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let digits = c.get(1)?.as_str();
            match digits.parse::<u64>() {
                Ok(i) => Some((whole.range(), i)),
                Err(_) => {
                    warn!(marker = digits, "placeholder index out of range; ignored");
                    None
                }
            }
        })
        .collect()
}

/// Placeholder indices in `content`, one per marker occurrence, in order.
pub fn placeholder_indices(content: &str) -> Vec<u64> {
    placeholder_spans(content).into_iter().map(|(_, i)| i).collect()
}

/// What happens when a later file defines a template id already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Replace content; positions recorded from the old content are kept.
    #[default]
    LastWriteWins,
    /// Keep the first content; conflicting definitions are ignored entirely.
    FirstWriteWins,
}

/// Templates and placeholder positions aggregated over any number of files.
#[derive(Debug, Default)]
pub struct TemplateStore {
    policy: OverwritePolicy,
    templates: AHashMap<u64, String>,
    // insertion-ordered; `index` maps a position to its slot here
    positions: Vec<(Position, Vec<VarId>)>,
    index: AHashMap<Position, usize>,
    conflicts: usize,
}

impl TemplateStore {
    pub fn new(policy: OverwritePolicy) -> Self {
        Self { policy, ..Default::default() }
    }

    pub fn ingest(&mut self, path: impl AsRef<Path>) -> Result<IngestStats, IngestError> {
        let path = path.as_ref();
        let reader = ingest::open(path)?;
        let stats = self.ingest_reader(reader, path)?;
        debug!(file = %path.display(), lines = stats.lines, templates = stats.accepted, skipped = stats.skipped, "ingested templates");
        Ok(stats)
    }

    pub fn ingest_reader<R: BufRead>(&mut self, reader: R, origin: &Path) -> Result<IngestStats, IngestError> {
        let mut stats = IngestStats::default();
        ingest::for_each_line(reader, origin, |n, line| {
            stats.lines += 1;
            if line.is_empty() {
                return Ok(());
            }
            match parse_template_line(line) {
                Some((id, content)) => {
                    if self.insert(id, content) {
                        stats.accepted += 1;
                    }
                }
                None => {
                    trace!(line = n, "skipping malformed template line");
                    stats.skipped += 1;
                }
            }
            Ok(())
        })?;
        Ok(stats)
    }

    /// Returns false when the overwrite policy rejected the definition.
    pub fn insert(&mut self, template_id: u64, content: &str) -> bool {
        if self.templates.contains_key(&template_id) {
            self.conflicts += 1;
            if self.policy == OverwritePolicy::FirstWriteWins {
                return false;
            }
        }
        self.templates.insert(template_id, content.to_string());
        for idx in placeholder_indices(content) {
            self.record(Position::new(template_id, idx));
        }
        true
    }

    fn record(&mut self, pos: Position) {
        let slot = match self.index.get(&pos) {
            Some(&i) => i,
            None => {
                self.positions.push((pos, Vec::new()));
                self.index.insert(pos, self.positions.len() - 1);
                self.positions.len() - 1
            }
        };
        self.positions[slot].1.push(pos.var_id());
    }

    pub fn get(&self, template_id: u64) -> Option<&str> {
        self.templates.get(&template_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions in discovery order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().map(|(p, _)| *p)
    }

    /// All identifiers recorded for a position; only the first is used when scoring.
    pub fn var_ids(&self, pos: &Position) -> &[VarId] {
        self.index
            .get(pos)
            .map(|&i| self.positions[i].1.as_slice())
            .unwrap_or(&[])
    }

    /// Number of re-definitions of an already known template id.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    /// A position is stale when no marker in the current content of its
    /// template parses to its index.
    pub fn is_stale(&self, pos: &Position) -> bool {
        match self.templates.get(&pos.template_id) {
            Some(content) => !placeholder_indices(content).contains(&pos.index),
            None => true,
        }
    }

    pub fn stale_positions(&self) -> Vec<Position> {
        self.positions().filter(|p| self.is_stale(p)).collect()
    }
}

/// `<letter><digits> <count> <content...>`; content is the rest of the line verbatim.
fn parse_template_line(line: &str) -> Option<(u64, &str)> {
    let (id_tok, rest) = split_field(line)?;
    let (_count, content) = split_field(rest)?;
    if content.is_empty() {
        return None;
    }
    let mut chars = id_tok.chars();
    let prefix = chars.next()?;
    let digits = chars.as_str();
    if !prefix.is_ascii_alphabetic() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(id) => Some((id, content)),
        Err(_) => {
            warn!(id = id_tok, "template id out of range; line skipped");
            None
        }
    }
}

fn split_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace)?;
    Some((&s[..end], s[end..].trim_start()))
}
