use crate::category::{normalize, sum_scores, Category, ScoreMap};
use crate::templates::Position;
use itertools::Itertools;
use std::collections::BTreeMap;

pub const DEFAULT_MAX_LABELS: usize = 2;
pub const DEFAULT_MIN_LABEL_SCORE: u32 = 2;

const CONFIG_HEADER: [&str; 3] = [
    "# Variable alias configuration (generated)",
    "# format: alias: E<template>_V<index>, E<template>_V<index>, ...",
    "# Generated by vardiscover; review and rename aliases as needed",
];

/// Label selection thresholds.
#[derive(Debug, Clone, Copy)]
pub struct Selection {
    pub max_labels: usize,
    pub min_score: u32,
}

impl Default for Selection {
    fn default() -> Self {
        Self { max_labels: DEFAULT_MAX_LABELS, min_score: DEFAULT_MIN_LABEL_SCORE }
    }
}

/// Value and context scores summed and normalized.
pub fn merge_scores(value: &ScoreMap, context: &ScoreMap) -> ScoreMap {
    normalize(&sum_scores(value, context))
}

/// Highest-scoring categories, ties broken by name. Empty when nothing scored.
pub fn combine(value: &ScoreMap, context: &ScoreMap, sel: Selection) -> Vec<Category> {
    select(&merge_scores(value, context), sel)
}

pub fn select(scores: &ScoreMap, sel: Selection) -> Vec<Category> {
    let ranked: Vec<(Category, u32)> = scores
        .iter()
        .map(|(c, w)| (*c, *w))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())))
        .collect();
    let top: Vec<Category> = ranked
        .iter()
        .take(sel.max_labels)
        .filter(|(_, w)| *w >= sel.min_score)
        .map(|(c, _)| *c)
        .collect();
    if top.is_empty() {
        ranked.first().map(|(c, _)| vec![*c]).unwrap_or_default()
    } else {
        top
    }
}

pub fn fallback_alias(pos: &Position) -> String {
    format!("var_{}_{}", pos.template_id, pos.index)
}

/// Alias name -> positions, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasSuggestions {
    groups: BTreeMap<String, Vec<Position>>,
}

impl AliasSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `pos` under every label, or under its synthesized name when
    /// there are none.
    pub fn add(&mut self, pos: Position, labels: &[Category]) {
        if labels.is_empty() {
            self.groups.entry(fallback_alias(&pos)).or_default().push(pos);
            return;
        }
        for label in labels {
            self.groups.entry(label.as_str().to_string()).or_default().push(pos);
        }
    }

    pub fn get(&self, alias: &str) -> Option<&[Position]> {
        self.groups.get(alias).map(|v| v.as_slice())
    }

    /// Aliases sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Position])> {
        self.groups.iter().map(|(a, p)| (a.as_str(), p.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains_position(&self, pos: &Position) -> bool {
        self.groups.values().any(|v| v.contains(pos))
    }

    /// Text consumed by the alias editing tool.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = CONFIG_HEADER.iter().map(|s| s.to_string()).collect();
        lines.push(String::new());
        for (alias, positions) in self.iter() {
            if positions.is_empty() {
                continue;
            }
            lines.push(format!("{alias}: {}", positions.iter().join(", ")));
        }
        lines.join("\n")
    }
}
