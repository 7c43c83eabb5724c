use crate::ingest::{self, IngestError, IngestStats};
use crate::shapes;
use crate::templates::VarId;
use ahash::AHashMap;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, trace};

pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// Index of the first inline value on a `D` header:
/// `<id> D <type> <pattern> <count> <values...>`.
const DICT_VALUES_FROM: usize = 5;

/// Observed values per variable identifier, insertion-ordered and capped.
#[derive(Debug)]
pub struct SampleStore {
    limit: usize,
    samples: AHashMap<VarId, Vec<String>>,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LIMIT)
    }
}

/// Parser state carried between lines of one file.
#[derive(Debug, Default)]
struct SectionState {
    current: Option<VarId>,
}

impl SampleStore {
    pub fn new(limit: usize) -> Self {
        Self { limit, samples: AHashMap::new() }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn ingest(&mut self, path: impl AsRef<Path>) -> Result<IngestStats, IngestError> {
        let path = path.as_ref();
        let reader = ingest::open(path)?;
        let stats = self.ingest_reader(reader, path)?;
        debug!(file = %path.display(), lines = stats.lines, samples = stats.accepted, "ingested variable samples");
        Ok(stats)
    }

    /// Parses a variable file. On error, samples appended before the
    /// failing line stay in the store.
    pub fn ingest_reader<R: BufRead>(&mut self, reader: R, origin: &Path) -> Result<IngestStats, IngestError> {
        let mut stats = IngestStats::default();
        let mut state = SectionState::default();
        ingest::for_each_line(reader, origin, |n, line| {
            stats.lines += 1;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                return Ok(());
            }
            match parse_header_id(parts[0]) {
                HeaderId::Id(id) => self.header(id, &parts, &mut state, &mut stats),
                HeaderId::NotNumeric => match state.current {
                    Some(id) => stats.accepted += self.values(id, &parts),
                    None => {
                        trace!(line = n, "value line outside of a section");
                        stats.skipped += 1;
                    }
                },
                HeaderId::Overflow => {
                    return Err(IngestError::Parse {
                        path: origin.to_path_buf(),
                        line: n,
                        message: format!("variable id `{}` out of range", parts[0]),
                    });
                }
            }
            Ok(())
        })?;
        Ok(stats)
    }

    fn header(&mut self, id: VarId, parts: &[&str], state: &mut SectionState, stats: &mut IngestStats) {
        match parts[1] {
            "D" if parts.len() >= 3 => {
                state.current = Some(id);
                for value in parts.iter().skip(DICT_VALUES_FROM) {
                    if is_dictionary_value(value) && self.push(id, value) {
                        stats.accepted += 1;
                    }
                }
            }
            "V" => state.current = Some(id),
            _ => {
                state.current = None;
                stats.skipped += 1;
            }
        }
    }

    /// Continuation line: each token is credited to at most one shape,
    /// tested in priority order.
    fn values(&mut self, id: VarId, tokens: &[&str]) -> usize {
        let mut added = 0;
        for tok in tokens {
            if self.is_full(id) {
                break;
            }
            if continuation_shape(tok).is_some() && self.push(id, tok) {
                added += 1;
            }
        }
        added
    }

    fn is_full(&self, id: VarId) -> bool {
        self.samples.get(&id).map_or(false, |v| v.len() >= self.limit)
    }

    /// Append unless the variable is already at the limit.
    pub fn push(&mut self, id: VarId, value: &str) -> bool {
        let list = self.samples.entry(id).or_default();
        if list.len() >= self.limit {
            return false;
        }
        list.push(value.to_string());
        true
    }

    pub fn get(&self, id: VarId) -> &[String] {
        self.samples.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of variables with at least one stored sample.
    pub fn variable_count(&self) -> usize {
        self.samples.values().filter(|v| !v.is_empty()).count()
    }

    pub fn total_samples(&self) -> usize {
        self.samples.values().map(|v| v.len()).sum()
    }
}

enum HeaderId {
    Id(VarId),
    NotNumeric,
    Overflow,
}

fn parse_header_id(tok: &str) -> HeaderId {
    if let Ok(id) = tok.parse::<VarId>() {
        return HeaderId::Id(id);
    }
    let digits = tok.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(tok);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        HeaderId::Overflow
    } else {
        HeaderId::NotNumeric
    }
}

/// Loose filter for values inlined on a dictionary header.
fn is_dictionary_value(v: &str) -> bool {
    shapes::is_ipv4(v)
        || shapes::is_port_shaped(v)
        || shapes::is_time(v)
        || shapes::is_username_shaped(v)
        || (shapes::is_hostname_shaped(v) && v.contains('.'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Ip,
    Port,
    Time,
    Username,
    Hostname,
}

fn continuation_shape(tok: &str) -> Option<Shape> {
    if shapes::is_ipv4(tok) {
        Some(Shape::Ip)
    } else if shapes::is_port_shaped(tok) {
        // a digit run is never retried as another shape
        shapes::is_port(tok).then_some(Shape::Port)
    } else if shapes::is_time(tok) {
        Some(Shape::Time)
    } else if shapes::is_username(tok) {
        Some(Shape::Username)
    } else if shapes::is_hostname(tok) {
        Some(Shape::Hostname)
    } else {
        None
    }
}
