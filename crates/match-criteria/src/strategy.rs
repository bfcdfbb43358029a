//! Match strategies and their preset field lists

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CriteriaError;
use crate::fields::is_positional;

/// Named matching policy.
///
/// Every strategy except `Custom` is defined by a fixed, ordered field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// All identity fields plus bounds and sibling index
    Absolute,

    /// Identity fields plus sibling index
    Strict,

    /// Identifier, text, description and class only
    Relaxed,

    /// Strict fields without positional ones
    Positionless,

    /// Positionless fields plus first-child and parent context
    Standard,

    /// User-chosen field subset
    Custom,
}

const ABSOLUTE_FIELDS: &[&str] = &[
    "resource-id",
    "text",
    "content-desc",
    "class",
    "package",
    "bounds",
    "index",
];

const STRICT_FIELDS: &[&str] = &[
    "resource-id",
    "text",
    "content-desc",
    "class",
    "package",
    "index",
];

const RELAXED_FIELDS: &[&str] = &["resource-id", "text", "content-desc", "class"];

const POSITIONLESS_FIELDS: &[&str] = &["resource-id", "text", "content-desc", "class", "package"];

const STANDARD_FIELDS: &[&str] = &[
    "resource-id",
    "text",
    "content-desc",
    "class",
    "package",
    "first_child_text",
    "first_child_resource_id",
    "parent_class",
];

impl MatchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Absolute => "absolute",
            MatchStrategy::Strict => "strict",
            MatchStrategy::Relaxed => "relaxed",
            MatchStrategy::Positionless => "positionless",
            MatchStrategy::Standard => "standard",
            MatchStrategy::Custom => "custom",
        }
    }

    /// Presets in inference priority order
    pub fn presets() -> [MatchStrategy; 5] {
        [
            MatchStrategy::Absolute,
            MatchStrategy::Strict,
            MatchStrategy::Relaxed,
            MatchStrategy::Positionless,
            MatchStrategy::Standard,
        ]
    }

    /// Preset field list; empty for `Custom`
    pub fn preset_fields(&self) -> &'static [&'static str] {
        match self {
            MatchStrategy::Absolute => ABSOLUTE_FIELDS,
            MatchStrategy::Strict => STRICT_FIELDS,
            MatchStrategy::Relaxed => RELAXED_FIELDS,
            MatchStrategy::Positionless => POSITIONLESS_FIELDS,
            MatchStrategy::Standard => STANDARD_FIELDS,
            MatchStrategy::Custom => &[],
        }
    }

    /// Whether the `bounds` field takes part in matching
    pub fn uses_bounds(&self) -> bool {
        matches!(self, MatchStrategy::Absolute | MatchStrategy::Custom)
    }
}

impl Default for MatchStrategy {
    fn default() -> Self {
        MatchStrategy::Standard
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MatchStrategy {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(MatchStrategy::Absolute),
            "strict" => Ok(MatchStrategy::Strict),
            "relaxed" => Ok(MatchStrategy::Relaxed),
            "positionless" => Ok(MatchStrategy::Positionless),
            "standard" => Ok(MatchStrategy::Standard),
            "custom" => Ok(MatchStrategy::Custom),
            other => Err(CriteriaError::UnknownStrategy(other.to_string())),
        }
    }
}

/// First preset whose field set equals `fields`, else `Custom`.
///
/// Order and duplicates in `fields` do not matter. A custom selection that
/// happens to equal a preset is reported as that preset.
pub fn infer_strategy_from_fields<S: AsRef<str>>(fields: &[S]) -> MatchStrategy {
    let selected: HashSet<&str> = fields.iter().map(AsRef::as_ref).collect();
    MatchStrategy::presets()
        .into_iter()
        .find(|preset| {
            let preset_set: HashSet<&str> = preset.preset_fields().iter().copied().collect();
            preset_set == selected
        })
        .unwrap_or(MatchStrategy::Custom)
}

/// Map a strategy onto one a preset-only consumer understands.
///
/// Presets pass through unchanged. `Custom` becomes `Absolute` when any
/// positional field (bounds or sibling index) carries a non-blank value and
/// `Standard` otherwise. This is a policy choice and may be revisited.
pub fn to_deployable_strategy<S: AsRef<str>>(
    strategy: MatchStrategy,
    fields: &[S],
    values: &BTreeMap<String, String>,
) -> MatchStrategy {
    if strategy != MatchStrategy::Custom {
        return strategy;
    }
    let positional_value = fields.iter().map(AsRef::as_ref).any(|field| {
        is_positional(field)
            && values
                .get(field)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false)
    });
    if positional_value {
        MatchStrategy::Absolute
    } else {
        MatchStrategy::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_is_left_inverse_of_presets() {
        for preset in MatchStrategy::presets() {
            assert_eq!(infer_strategy_from_fields(preset.preset_fields()), preset);
        }
    }

    #[test]
    fn test_preset_sets_are_pairwise_distinct() {
        let presets = MatchStrategy::presets();
        for (i, a) in presets.iter().enumerate() {
            for b in presets.iter().skip(i + 1) {
                let sa: HashSet<_> = a.preset_fields().iter().collect();
                let sb: HashSet<_> = b.preset_fields().iter().collect();
                assert_ne!(sa, sb, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_custom_selection_collapses_into_preset() {
        let fields = ["class", "text", "content-desc", "resource-id"];
        assert_eq!(infer_strategy_from_fields(&fields), MatchStrategy::Relaxed);

        let fields = ["text", "class"];
        assert_eq!(infer_strategy_from_fields(&fields), MatchStrategy::Custom);

        let empty: [&str; 0] = [];
        assert_eq!(infer_strategy_from_fields(&empty), MatchStrategy::Custom);
    }

    #[test]
    fn test_to_deployable_strategy() {
        let mut values = BTreeMap::new();
        values.insert("text".to_string(), "Follow".to_string());
        values.insert("bounds".to_string(), "  ".to_string());
        let fields = ["text", "bounds"];
        assert_eq!(
            to_deployable_strategy(MatchStrategy::Custom, &fields, &values),
            MatchStrategy::Standard
        );

        values.insert("bounds".to_string(), "[0,0][10,10]".to_string());
        assert_eq!(
            to_deployable_strategy(MatchStrategy::Custom, &fields, &values),
            MatchStrategy::Absolute
        );

        values.insert("index".to_string(), "2".to_string());
        assert_eq!(
            to_deployable_strategy(MatchStrategy::Custom, &["text", "index"], &values),
            MatchStrategy::Absolute
        );

        assert_eq!(
            to_deployable_strategy(MatchStrategy::Relaxed, &fields, &values),
            MatchStrategy::Relaxed
        );
    }

    #[test]
    fn test_parse_and_serde_names() {
        assert_eq!("Strict".parse::<MatchStrategy>().unwrap(), MatchStrategy::Strict);
        assert!("smart".parse::<MatchStrategy>().is_err());
        assert_eq!(
            serde_json::to_string(&MatchStrategy::Positionless).unwrap(),
            "\"positionless\""
        );
    }
}
