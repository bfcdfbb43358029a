//! Persisted match criteria

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ui_tree::{keys, NodeId, UiTree};

use crate::errors::CriteriaError;
use crate::fields::build_values_from_node;
use crate::normalize::{
    normalize_excludes, normalize_fields_and_values, normalize_includes, normalize_match_modes,
    normalize_regex_map,
};
use crate::strategy::{infer_strategy_from_fields, to_deployable_strategy, MatchStrategy};

/// How a field value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Equals,
    #[default]
    Contains,
    Regex,
}

impl FromStr for MatchMode {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" => Ok(MatchMode::Equals),
            "contains" => Ok(MatchMode::Contains),
            "regex" => Ok(MatchMode::Regex),
            other => Err(CriteriaError::UnknownMatchMode(other.to_string())),
        }
    }
}

/// Criteria describing which nodes count as "the" element.
///
/// `values`, `includes`, `excludes` and the optional maps only carry keys
/// present in `fields` once normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchCriteria {
    pub strategy: MatchStrategy,
    pub fields: Vec<String>,
    pub values: BTreeMap<String, String>,
    pub includes: BTreeMap<String, Vec<String>>,
    pub excludes: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub match_mode: BTreeMap<String, MatchMode>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub regex_includes: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub regex_excludes: BTreeMap<String, Vec<String>>,
}

/// Non-fatal problem found by [`MatchCriteria::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaWarning {
    NoFields,
    AllValuesBlank,
    InvalidRegex { field: String, pattern: String },
}

impl fmt::Display for CriteriaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaWarning::NoFields => write!(f, "no fields selected; every node matches"),
            CriteriaWarning::AllValuesBlank => {
                write!(f, "all selected fields are blank; nothing constrains the match")
            }
            CriteriaWarning::InvalidRegex { field, pattern } => {
                write!(f, "invalid regex '{}' on field '{}' never matches", pattern, field)
            }
        }
    }
}

/// Fields tried, in order, when a preset leaves nothing to match on.
const FALLBACK_FIELDS: &[&str] = &[
    keys::RESOURCE_ID,
    keys::TEXT,
    keys::CONTENT_DESC,
    keys::CLASS,
    keys::BOUNDS,
];

impl MatchCriteria {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Criteria for `node` using the preset fields of `strategy`.
    ///
    /// For `Custom` the `Standard` field list is used and the strategy is
    /// re-inferred. When every preset field is blank on the node, the first
    /// non-blank of resource-id, text, content-desc, class, bounds is used
    /// instead; falling back to bounds upgrades the strategy to `Absolute`.
    pub fn from_node(
        tree: &UiTree,
        node: NodeId,
        strategy: MatchStrategy,
    ) -> Result<Self, CriteriaError> {
        let target = tree
            .node(node)
            .ok_or_else(|| CriteriaError::NodeNotFound(node.to_string()))?;

        let (mut strategy, preset) = match strategy {
            MatchStrategy::Custom => {
                let fields = MatchStrategy::Standard.preset_fields();
                (infer_strategy_from_fields(fields), fields)
            }
            preset => (preset, preset.preset_fields()),
        };

        let values = build_values_from_node(tree, node, preset);
        let (mut fields, mut values) = normalize_fields_and_values(preset, &values);

        if fields.is_empty() {
            let picked = FALLBACK_FIELDS
                .iter()
                .find_map(|key| target.non_blank(key).map(|value| (*key, value)));
            if let Some((key, value)) = picked {
                debug!(field = key, "criteria fell back to a single field");
                fields = vec![key.to_string()];
                values = BTreeMap::from([(key.to_string(), value.to_string())]);
                if key == keys::BOUNDS {
                    strategy = MatchStrategy::Absolute;
                }
            }
        }

        Ok(Self {
            strategy,
            fields,
            values,
            ..Default::default()
        })
    }

    /// Apply every normalization rule in place.
    pub fn normalize(&mut self) {
        let (fields, values) = normalize_fields_and_values(&self.fields, &self.values);
        self.includes = normalize_includes(&self.includes, &fields);
        self.excludes = normalize_excludes(&self.excludes, &fields);
        self.match_mode = normalize_match_modes(&self.match_mode, &fields);
        self.regex_includes = normalize_regex_map(&self.regex_includes, &fields);
        self.regex_excludes = normalize_regex_map(&self.regex_excludes, &fields);
        self.fields = fields;
        self.values = values;
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Strategy implied by the current field set.
    pub fn inferred_strategy(&self) -> MatchStrategy {
        infer_strategy_from_fields(&self.fields)
    }

    /// Strategy a preset-only consumer should receive.
    pub fn deployable_strategy(&self) -> MatchStrategy {
        to_deployable_strategy(self.strategy, &self.fields, &self.values)
    }

    pub fn mode_for(&self, field: &str) -> MatchMode {
        self.match_mode.get(field).copied().unwrap_or_default()
    }

    /// Whether includes or excludes of either kind are set.
    pub fn has_advanced_conditions(&self) -> bool {
        !self.includes.is_empty()
            || !self.excludes.is_empty()
            || !self.regex_includes.is_empty()
            || !self.regex_excludes.is_empty()
    }

    /// Warnings about criteria that will match everything or nothing.
    pub fn validate(&self) -> Vec<CriteriaWarning> {
        let mut warnings = Vec::new();
        if self.fields.is_empty() {
            warnings.push(CriteriaWarning::NoFields);
        } else if self.fields.iter().all(|field| {
            self.values
                .get(field)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        }) && !self.has_advanced_conditions()
        {
            warnings.push(CriteriaWarning::AllValuesBlank);
        }

        let regex_values = self
            .values
            .iter()
            .filter(|(field, _)| self.mode_for(field) == MatchMode::Regex);
        let regex_lists = self
            .regex_includes
            .iter()
            .chain(self.regex_excludes.iter())
            .flat_map(|(field, patterns)| patterns.iter().map(move |p| (field, p)));

        for (field, pattern) in regex_values.chain(regex_lists) {
            if Regex::new(pattern).is_err() {
                warnings.push(CriteriaWarning::InvalidRegex {
                    field: field.clone(),
                    pattern: pattern.clone(),
                });
            }
        }
        warnings
    }
}
