//! Relocation strategies
//!
//! Five strategies in default fallback order:
//! 1. Exact path - re-walk the captured absolute path
//! 2. Predicate path - AND-ed identifier/text/class equality
//! 3. Attribute scoring - exact and fuzzy attribute points
//! 4. Bounds proximity - closest rectangle within tolerance
//! 5. Fuzzy fingerprint - component agreement, ranked by similarity

use element_fingerprint::{
    text_similarity, weighted_similarity, AttributeProfile, FingerprintComponents,
    FingerprintGenerator,
};
use tracing::{debug, warn};
use ui_tree::{evaluate_absolute_path, keys, Bounds, NodeId, Predicate, PredicatePath, UiTree};

use crate::config::RelocatorConfig;
use crate::context::ElementContext;
use crate::types::{Candidate, RelocationStrategy};

/// What one strategy found.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutcome {
    /// Accepted candidates, best first
    pub candidates: Vec<Candidate>,

    /// Human-readable account of the attempt
    pub reasons: Vec<String>,
}

impl StrategyOutcome {
    fn miss(reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            reasons: vec![reason.into()],
        }
    }

    fn hit(candidates: Vec<Candidate>) -> Self {
        let reasons = candidates
            .first()
            .map(|best| best.reasons.clone())
            .unwrap_or_default();
        Self {
            candidates,
            reasons,
        }
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Strategy trait for relocation
pub trait Strategy: Send + Sync {
    /// Look for the saved node in `tree`
    fn attempt(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        config: &RelocatorConfig,
    ) -> StrategyOutcome;

    /// Get strategy type
    fn strategy_type(&self) -> RelocationStrategy;

    /// Get strategy name
    fn name(&self) -> &'static str {
        self.strategy_type().name()
    }
}

/// Absolute path strategy
#[derive(Debug, Default)]
pub struct ExactPathStrategy;

impl Strategy for ExactPathStrategy {
    fn attempt(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        _config: &RelocatorConfig,
    ) -> StrategyOutcome {
        let Some(path) = context.locator.absolute_path.as_deref() else {
            return StrategyOutcome::miss("no absolute path captured");
        };
        match evaluate_absolute_path(tree, path) {
            Some(node) => StrategyOutcome::hit(vec![Candidate::new(
                node,
                self.strategy_type(),
                0.95,
            )
            .with_reason(format!("found by absolute path {}", path))]),
            None => StrategyOutcome::miss(format!("absolute path {} did not resolve", path)),
        }
    }

    fn strategy_type(&self) -> RelocationStrategy {
        RelocationStrategy::ExactPath
    }
}

/// Predicate path strategy
#[derive(Debug, Default)]
pub struct PredicatePathStrategy;

impl PredicatePathStrategy {
    /// `//*[@resource-id=.. and @text=.. and @class=..]` from what was captured
    pub fn build_path(context: &ElementContext) -> Option<PredicatePath> {
        let attributes = &context.locator.attributes;
        let mut path = PredicatePath::any();
        for key in [keys::RESOURCE_ID, keys::TEXT, keys::CLASS] {
            if let Some(value) = attributes.get(key) {
                path = path.and(Predicate::attr_equals(key, value));
            }
        }
        (!path.predicates.is_empty()).then_some(path)
    }
}

impl Strategy for PredicatePathStrategy {
    fn attempt(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        config: &RelocatorConfig,
    ) -> StrategyOutcome {
        let Some(path) = Self::build_path(context) else {
            return StrategyOutcome::miss("no attributes for a predicate path");
        };
        let matches = path.evaluate_all(tree);
        match matches.len() {
            0 => StrategyOutcome::miss(format!("{} matched no node", path)),
            1 => StrategyOutcome::hit(vec![Candidate::new(
                matches[0],
                self.strategy_type(),
                0.9,
            )
            .with_reason(format!("found by predicate path {}", path))]),
            count => {
                warn!(count, path = %path, "predicate path is ambiguous");
                let saved = context.locator.profile();
                let scored: Vec<(NodeId, f64)> = matches
                    .iter()
                    .map(|id| (*id, similarity_to(&saved, tree, *id, config)))
                    .collect();
                let candidates = rank_descending(scored)
                    .into_iter()
                    .map(|(id, similarity)| {
                        Candidate::new(id, self.strategy_type(), 0.8).with_reason(format!(
                            "{} nodes matched {}; picked the closest ({:.1}% similar)",
                            count,
                            path,
                            similarity * 100.0
                        ))
                    })
                    .collect();
                StrategyOutcome::hit(candidates)
            }
        }
    }

    fn strategy_type(&self) -> RelocationStrategy {
        RelocationStrategy::PredicatePath
    }
}

/// Attribute scoring strategy
#[derive(Debug, Default)]
pub struct AttributeScoringStrategy;

impl AttributeScoringStrategy {
    /// Points for one node with the reasons behind them
    pub fn score(
        context: &ElementContext,
        tree: &UiTree,
        node: NodeId,
        config: &RelocatorConfig,
    ) -> (u32, Vec<String>) {
        let Some(candidate) = tree.node(node) else {
            return (0, Vec::new());
        };
        let attributes = &context.locator.attributes;
        let options = config.text_options();
        let mut score = 0;
        let mut reasons = Vec::new();

        for key in &config.exact_attributes {
            if let Some(saved) = attributes.get(key) {
                if candidate.attr(key) == Some(saved) {
                    score += 30;
                    reasons.push(format!("exact {}={}", key, saved));
                }
            }
        }

        for key in &config.fuzzy_attributes {
            let current = candidate.attr(key).filter(|v| !v.is_empty());
            let (Some(saved), Some(current)) = (attributes.get(key), current) else {
                continue;
            };
            let similarity = text_similarity(saved, current, &options);
            if similarity >= config.text_similarity {
                score += (similarity * 20.0).round() as u32;
                reasons.push(format!("fuzzy {} ({:.1}%)", key, similarity * 100.0));
            }
        }

        (score, reasons)
    }
}

impl Strategy for AttributeScoringStrategy {
    fn attempt(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        config: &RelocatorConfig,
    ) -> StrategyOutcome {
        if context.locator.attributes.is_empty() {
            return StrategyOutcome::miss("no attributes captured");
        }

        let mut scored: Vec<(NodeId, u32, Vec<String>)> = tree
            .node_ids()
            .filter_map(|id| {
                let (score, reasons) = Self::score(context, tree, id, config);
                (score > 0).then_some((id, score, reasons))
            })
            .collect();
        if scored.is_empty() {
            return StrategyOutcome::miss("no node matched the captured attributes");
        }

        // Stable: equal scores stay in document order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        let candidates = scored
            .into_iter()
            .map(|(id, score, reasons)| {
                let confidence = (score as f64 / 100.0).min(0.9);
                let mut candidate = Candidate::new(id, self.strategy_type(), confidence)
                    .with_reason(format!("attribute score {}", score));
                candidate.reasons.extend(reasons);
                candidate
            })
            .collect();
        StrategyOutcome::hit(candidates)
    }

    fn strategy_type(&self) -> RelocationStrategy {
        RelocationStrategy::AttributeScoring
    }
}

/// Bounds proximity strategy
#[derive(Debug, Default)]
pub struct BoundsProximityStrategy;

impl BoundsProximityStrategy {
    /// 1.0 at zero deviation down to 0.1 at the tolerance
    pub fn confidence(deviation: u32, tolerance: u32) -> f64 {
        if tolerance == 0 {
            return 1.0;
        }
        (1.0 - deviation as f64 / tolerance as f64).max(0.1)
    }
}

impl Strategy for BoundsProximityStrategy {
    fn attempt(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        config: &RelocatorConfig,
    ) -> StrategyOutcome {
        let Some(raw) = context.locator.bounds.as_deref() else {
            return StrategyOutcome::miss("no bounds captured");
        };
        let saved: Bounds = match raw.parse() {
            Ok(bounds) => bounds,
            Err(err) => return StrategyOutcome::miss(format!("captured bounds unusable: {}", err)),
        };
        let tolerance = config.bounds_tolerance;

        let mut within: Vec<(NodeId, u32)> = tree
            .node_ids()
            .filter_map(|id| {
                let bounds = tree.node(id)?.bounds()?;
                let deviation = saved.max_edge_deviation(&bounds);
                (deviation <= tolerance).then_some((id, deviation))
            })
            .collect();
        if within.is_empty() {
            return StrategyOutcome::miss(format!("no node within {}px of {}", tolerance, saved));
        }

        within.sort_by_key(|(_, deviation)| *deviation);
        let candidates = within
            .into_iter()
            .map(|(id, deviation)| {
                Candidate::new(
                    id,
                    self.strategy_type(),
                    Self::confidence(deviation, tolerance),
                )
                .with_reason(format!("bounds within {}px", deviation))
            })
            .collect();
        StrategyOutcome::hit(candidates)
    }

    fn strategy_type(&self) -> RelocationStrategy {
        RelocationStrategy::BoundsProximity
    }
}

/// Fingerprint similarity strategy
#[derive(Debug, Default)]
pub struct FuzzyFingerprintStrategy {
    generator: FingerprintGenerator,
}

impl FuzzyFingerprintStrategy {
    pub fn new(generator: FingerprintGenerator) -> Self {
        Self { generator }
    }
}

impl Strategy for FuzzyFingerprintStrategy {
    fn attempt(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        config: &RelocatorConfig,
    ) -> StrategyOutcome {
        let saved = context.saved_components();
        if saved.is_empty() {
            return StrategyOutcome::miss("nothing captured to compare against");
        }
        // Locator-only saves carry fewer components; compare on those alone.
        let restrict = context.components.is_none();
        let profile = context.locator.profile();

        let scored: Vec<(NodeId, f64)> = tree
            .node_ids()
            .filter_map(|id| {
                let mut current = self.generator.components(tree, id)?;
                if restrict {
                    current = restricted_to(current, &saved);
                }
                self.generator
                    .is_same_components(&saved, &current, config.fuzzy_threshold)
                    .then(|| (id, similarity_to(&profile, tree, id, config)))
            })
            .collect();
        if scored.is_empty() {
            return StrategyOutcome::miss("no similar node found");
        }
        debug!(count = scored.len(), "fingerprint look-alikes");

        let candidates = rank_descending(scored)
            .into_iter()
            .map(|(id, similarity)| {
                Candidate::new(id, self.strategy_type(), similarity)
                    .with_reason(format!("{:.1}% similar", similarity * 100.0))
            })
            .collect();
        StrategyOutcome::hit(candidates)
    }

    fn strategy_type(&self) -> RelocationStrategy {
        RelocationStrategy::FuzzyFingerprint
    }
}

fn similarity_to(
    saved: &AttributeProfile,
    tree: &UiTree,
    node: NodeId,
    config: &RelocatorConfig,
) -> f64 {
    tree.node(node)
        .map(|n| {
            weighted_similarity(
                saved,
                &AttributeProfile::from_node(n),
                &config.similarity_weights,
                &config.text_options(),
            )
        })
        .unwrap_or(0.0)
}

/// Highest score first; equal scores keep document order.
fn rank_descending(mut scored: Vec<(NodeId, f64)>) -> Vec<(NodeId, f64)> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
}

/// Keep only the components `saved` has.
fn restricted_to(
    current: FingerprintComponents,
    saved: &FingerprintComponents,
) -> FingerprintComponents {
    let keep = |value: Option<String>, wanted: &Option<String>| value.filter(|_| wanted.is_some());
    FingerprintComponents {
        resource_id: keep(current.resource_id, &saved.resource_id),
        text: keep(current.text, &saved.text),
        content_desc: keep(current.content_desc, &saved.content_desc),
        class_name: keep(current.class_name, &saved.class_name),
        path: keep(current.path, &saved.path),
        parent_context: keep(current.parent_context, &saved.parent_context),
        sibling_index: keep(current.sibling_index, &saved.sibling_index),
        bounds: keep(current.bounds, &saved.bounds),
        document: keep(current.document, &saved.document),
    }
}
