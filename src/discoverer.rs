use crate::category::{Category, ScoreMap};
use crate::config::{DiscoveryConfig, StalePolicy};
use crate::context_classifier::ContextClassifier;
use crate::ingest::{IngestError, IngestStats};
use crate::merger::{self, AliasSuggestions};
use crate::samples::SampleStore;
use crate::templates::{Position, TemplateStore, VarId};
use crate::value_classifier::ValueClassifier;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of one suggestion pass.
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub suggestions: AliasSuggestions,
    /// Positions whose marker is missing from the current template content.
    pub stale: Vec<Position>,
    pub template_count: usize,
    pub position_count: usize,
}

/// Owns the template and sample aggregates built from any number of files
/// and turns them into alias suggestions.
pub struct VariableDiscoverer {
    config: DiscoveryConfig,
    templates: TemplateStore,
    samples: SampleStore,
    values: ValueClassifier,
    context: ContextClassifier,
}

impl Default for VariableDiscoverer {
    fn default() -> Self {
        Self::new(DiscoveryConfig::default())
    }
}

impl VariableDiscoverer {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            templates: TemplateStore::new(config.overwrite_policy),
            samples: SampleStore::new(config.sample_limit),
            values: ValueClassifier::new(config.value_sample_cap),
            context: ContextClassifier::new(config.context_window, &config.fallback_heuristics),
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateStore {
        &mut self.templates
    }

    pub fn samples(&self) -> &SampleStore {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut SampleStore {
        &mut self.samples
    }

    pub fn ingest_templates(&mut self, path: impl AsRef<Path>) -> Result<IngestStats, IngestError> {
        let path = path.as_ref();
        self.templates.ingest(path).map_err(|e| {
            warn!(error = %e, "template ingestion failed");
            e
        })
    }

    pub fn ingest_samples(&mut self, path: impl AsRef<Path>) -> Result<IngestStats, IngestError> {
        let path = path.as_ref();
        self.samples.ingest(path).map_err(|e| {
            warn!(error = %e, "variable sample ingestion failed");
            e
        })
    }

    pub fn score_from_samples(&self, var_id: VarId) -> ScoreMap {
        self.values.score(self.samples.get(var_id))
    }

    pub fn score_from_context(&self, content: &str, index: u64) -> ScoreMap {
        self.context.score(content, index)
    }

    /// Labels chosen for one position; empty when nothing scored. The
    /// positional fallback only runs when neither samples nor keyword cues
    /// produced a score.
    pub fn infer(&self, pos: &Position) -> Vec<Category> {
        let content = self.templates.get(pos.template_id).unwrap_or("");
        let var_id = self.templates.var_ids(pos).first().copied().unwrap_or_else(|| pos.var_id());
        let value = self.score_from_samples(var_id);
        let mut context = self.context.score_keywords(content, pos.index);
        if value.is_empty() && context.is_empty() {
            context = self.context.score_fallback(content, pos.index);
        }
        merger::combine(&value, &context, self.config.selection())
    }

    pub fn generate(&self) -> DiscoveryReport {
        let mut suggestions = AliasSuggestions::new();
        let mut stale = Vec::new();
        for pos in self.templates.positions() {
            if self.templates.is_stale(&pos) {
                stale.push(pos);
                if self.config.stale_positions == StalePolicy::Drop {
                    warn!(position = %pos, "placeholder no longer present in template; not emitted");
                    continue;
                }
            }
            let labels = self.infer(&pos);
            debug!(position = %pos, labels = ?labels, "inferred");
            suggestions.add(pos, &labels);
        }
        DiscoveryReport {
            suggestions,
            stale,
            template_count: self.templates.len(),
            position_count: self.templates.position_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_drive_value_scores() {
        let mut d = VariableDiscoverer::default();
        d.templates_mut().insert(1, "connect <V0>");
        let pos = Position::new(1, 0);
        for ip in ["192.168.1.1", "10.0.0.5", "8.8.8.8"] {
            d.samples_mut().push(pos.var_id(), ip);
        }
        assert_eq!(d.score_from_samples(pos.var_id()).get(&Category::Ip), Some(&9));
        assert_eq!(d.infer(&pos), vec![Category::Ip]);
    }

    #[test]
    fn sample_evidence_suppresses_positional_fallback() {
        let mut d = VariableDiscoverer::default();
        d.templates_mut().insert(4, "<V0> LabSZ sshd done");
        let pos = Position::new(4, 0);
        for host in ["node1.example.com", "db.internal.net", "web-3.example.org"] {
            d.samples_mut().push(pos.var_id(), host);
        }
        assert_eq!(d.infer(&pos), vec![Category::Hostname]);
    }

    #[test]
    fn zero_padded_marker_is_emitted() {
        let mut d = VariableDiscoverer::default();
        d.templates_mut().insert(1, "session for user <V01> closed");
        let report = d.generate();
        assert!(report.stale.is_empty());
        assert_eq!(report.suggestions.get("username"), Some(&[Position::new(1, 1)][..]));
    }

    #[test]
    fn stale_positions_follow_policy() {
        let mut d = VariableDiscoverer::default();
        d.templates_mut().insert(3, "x=<V0> y=<V1>");
        d.templates_mut().insert(3, "x=<V0>");
        let report = d.generate();
        assert_eq!(report.stale, vec![Position::new(3, 1)]);
        assert!(!report.suggestions.contains_position(&Position::new(3, 1)));

        let cfg = DiscoveryConfig { stale_positions: StalePolicy::Keep, ..Default::default() };
        let mut keep = VariableDiscoverer::new(cfg);
        keep.templates_mut().insert(3, "x=<V0> y=<V1>");
        keep.templates_mut().insert(3, "x=<V0>");
        let report = keep.generate();
        assert_eq!(report.suggestions.get("var_3_1"), Some(&[Position::new(3, 1)][..]));
    }
}
