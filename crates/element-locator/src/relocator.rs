//! Relocation pipeline with fallback chain orchestration

use element_fingerprint::{FingerprintConfig, FingerprintGenerator};
use tracing::{debug, info};
use ui_tree::UiTree;

use crate::config::RelocatorConfig;
use crate::context::ElementContext;
use crate::errors::LocatorError;
use crate::strategies::*;
use crate::types::*;

/// Ordered fallback pipeline over the configured strategies
///
/// Holds no per-call state; one instance can serve any number of trees.
#[derive(Debug, Default)]
pub struct Relocator {
    config: RelocatorConfig,
    exact_path: ExactPathStrategy,
    predicate_path: PredicatePathStrategy,
    attribute_scoring: AttributeScoringStrategy,
    bounds_proximity: BoundsProximityStrategy,
    fuzzy_fingerprint: FuzzyFingerprintStrategy,
}

impl Relocator {
    pub fn new(config: RelocatorConfig) -> Result<Self, LocatorError> {
        Self::with_fingerprint(config, FingerprintConfig::default())
    }

    /// Fingerprint settings must match the ones used at capture.
    pub fn with_fingerprint(
        config: RelocatorConfig,
        fingerprint: FingerprintConfig,
    ) -> Result<Self, LocatorError> {
        config.validate()?;
        fingerprint
            .validate()
            .map_err(|err| LocatorError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            config,
            fuzzy_fingerprint: FuzzyFingerprintStrategy::new(FingerprintGenerator::new(
                fingerprint,
            )),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &RelocatorConfig {
        &self.config
    }

    /// Get strategy by type
    fn strategy(&self, strategy_type: RelocationStrategy) -> &dyn Strategy {
        match strategy_type {
            RelocationStrategy::ExactPath => &self.exact_path,
            RelocationStrategy::PredicatePath => &self.predicate_path,
            RelocationStrategy::AttributeScoring => &self.attribute_scoring,
            RelocationStrategy::BoundsProximity => &self.bounds_proximity,
            RelocationStrategy::FuzzyFingerprint => &self.fuzzy_fingerprint,
        }
    }

    /// Run the configured strategies in order; stop at the first hit.
    pub fn relocate(&self, context: &ElementContext, tree: &UiTree) -> RelocationResult {
        debug!(
            path = ?context.locator.absolute_path,
            strategies = self.config.strategies.len(),
            "relocating element"
        );

        let mut reasons = Vec::new();
        for strategy_type in &self.config.strategies {
            let outcome = self.strategy(*strategy_type).attempt(context, tree, &self.config);
            reasons.extend(prefixed(*strategy_type, &outcome.reasons));

            match outcome.best() {
                Some(best) => {
                    info!(
                        strategy = strategy_type.name(),
                        node = %best.node,
                        confidence = best.confidence,
                        "relocated element"
                    );
                    return RelocationResult::found(
                        best.node,
                        *strategy_type,
                        best.confidence,
                        reasons,
                    );
                }
                None => debug!("strategy {} found nothing", strategy_type.name()),
            }
        }

        info!("element not relocated; all strategies exhausted");
        reasons.push("none: all relocation strategies failed".to_string());
        RelocationResult::not_found(reasons)
    }

    /// Run a single strategy, ignoring the configured order.
    pub fn relocate_with_strategy(
        &self,
        context: &ElementContext,
        tree: &UiTree,
        strategy_type: RelocationStrategy,
    ) -> RelocationResult {
        let outcome = self.strategy(strategy_type).attempt(context, tree, &self.config);
        let reasons = prefixed(strategy_type, &outcome.reasons);
        match outcome.best() {
            Some(best) => {
                RelocationResult::found(best.node, strategy_type, best.confidence, reasons)
            }
            None => RelocationResult::not_found(reasons),
        }
    }

    /// Every candidate of every strategy, ranked by confidence.
    pub fn generate_fallback_plan(&self, context: &ElementContext, tree: &UiTree) -> FallbackPlan {
        let mut plan = FallbackPlan::new(context.locator.clone());
        for strategy_type in RelocationStrategy::fallback_chain() {
            let outcome = self.strategy(strategy_type).attempt(context, tree, &self.config);
            if outcome.candidates.is_empty() {
                debug!(
                    "strategy {} produced no candidates: {:?}",
                    strategy_type.name(),
                    outcome.reasons
                );
            }
            for candidate in outcome.candidates {
                plan.add_fallback(candidate);
            }
        }
        plan.rank();
        plan
    }
}

/// Relocate with the default configuration.
pub fn relocate(context: &ElementContext, tree: &UiTree) -> RelocationResult {
    Relocator::default().relocate(context, tree)
}

fn prefixed(strategy_type: RelocationStrategy, reasons: &[String]) -> Vec<String> {
    reasons
        .iter()
        .map(|reason| format!("{}: {}", strategy_type.name(), reason))
        .collect()
}
