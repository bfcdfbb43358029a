//! Evaluate criteria against a parsed tree

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use ui_tree::{keys, NodeId, UiTree};

use crate::criteria::{MatchCriteria, MatchMode};
use crate::fields::field_value;

/// Matches and the preferred one among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub matched: Vec<NodeId>,
    pub best: Option<NodeId>,
}

impl MatchReport {
    pub fn total(&self) -> usize {
        self.matched.len()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.matched.len() > 1
    }
}

/// Criteria with their patterns compiled once.
///
/// A pattern that fails to compile is kept as `None` and never matches.
pub struct CriteriaMatcher<'a> {
    criteria: &'a MatchCriteria,
    value_patterns: HashMap<&'a str, Option<Regex>>,
    regex_includes: HashMap<&'a str, Vec<Option<Regex>>>,
    regex_excludes: HashMap<&'a str, Vec<Option<Regex>>>,
}

impl<'a> CriteriaMatcher<'a> {
    pub fn new(criteria: &'a MatchCriteria) -> Self {
        let value_patterns = criteria
            .values
            .iter()
            .filter(|(field, _)| criteria.mode_for(field) == MatchMode::Regex)
            .map(|(field, pattern)| (field.as_str(), compile(field, pattern)))
            .collect();

        Self {
            criteria,
            value_patterns,
            regex_includes: compile_map(&criteria.regex_includes),
            regex_excludes: compile_map(&criteria.regex_excludes),
        }
    }

    /// Whether `node` satisfies every rule of the criteria.
    pub fn matches(&self, tree: &UiTree, node: NodeId) -> bool {
        let criteria = self.criteria;
        let uses_bounds = criteria.strategy.uses_bounds();

        for field in &criteria.fields {
            let field = field.as_str();
            if field == keys::BOUNDS && !uses_bounds {
                continue;
            }
            let actual = field_value(tree, node, field);

            if let Some(expected) = criteria.values.get(field) {
                if expected.trim().is_empty() {
                    continue;
                }
                let Some(actual) = actual.as_deref() else {
                    return false;
                };
                let hit = match criteria.mode_for(field) {
                    MatchMode::Equals => actual == expected.as_str(),
                    MatchMode::Contains => actual.contains(expected.as_str()),
                    MatchMode::Regex => self
                        .value_patterns
                        .get(field)
                        .and_then(Option::as_ref)
                        .map(|re| re.is_match(actual))
                        .unwrap_or(false),
                };
                if !hit {
                    return false;
                }
            }

            for word in words(&criteria.includes, field) {
                if !actual.as_deref().map(|v| v.contains(word)).unwrap_or(false) {
                    return false;
                }
            }
            for word in words(&criteria.excludes, field) {
                if actual.as_deref().map(|v| v.contains(word)).unwrap_or(false) {
                    return false;
                }
            }

            if let Some(patterns) = self.regex_includes.get(field) {
                let all_match = patterns.iter().all(|re| match (re, actual.as_deref()) {
                    (Some(re), Some(value)) => re.is_match(value),
                    _ => false,
                });
                if !all_match {
                    return false;
                }
            }
            if let Some(patterns) = self.regex_excludes.get(field) {
                let any_match = patterns.iter().any(|re| match (re, actual.as_deref()) {
                    (Some(re), Some(value)) => re.is_match(value),
                    _ => false,
                });
                if any_match {
                    return false;
                }
            }
        }
        true
    }

    /// Every matching node in document order.
    pub fn find_matches(&self, tree: &UiTree) -> Vec<NodeId> {
        tree.descendants(tree.root())
            .filter(|id| self.matches(tree, *id))
            .collect()
    }

    /// Preferred candidate: the first whose resource-id equals the criteria
    /// value, then text, content-desc, class and package; else the first.
    pub fn select_best(&self, tree: &UiTree, candidates: &[NodeId]) -> Option<NodeId> {
        let first = *candidates.first()?;
        if candidates.len() == 1 {
            return Some(first);
        }
        for key in [
            keys::RESOURCE_ID,
            keys::TEXT,
            keys::CONTENT_DESC,
            keys::CLASS,
            keys::PACKAGE,
        ] {
            let Some(expected) = self.criteria.values.get(key) else {
                continue;
            };
            let exact = candidates.iter().copied().find(|id| {
                tree.node(*id)
                    .and_then(|node| node.attr(key))
                    .map(|value| value == expected.as_str())
                    .unwrap_or(false)
            });
            if exact.is_some() {
                return exact;
            }
        }
        Some(first)
    }

    pub fn report(&self, tree: &UiTree) -> MatchReport {
        let matched = self.find_matches(tree);
        let best = self.select_best(tree, &matched);
        if matched.len() > 1 {
            warn!(
                total = matched.len(),
                strategy = %self.criteria.strategy,
                "criteria matched several nodes"
            );
        }
        debug!(total = matched.len(), "criteria evaluated");
        MatchReport { matched, best }
    }
}

/// Every node satisfying `criteria`, in document order.
pub fn find_matches(tree: &UiTree, criteria: &MatchCriteria) -> Vec<NodeId> {
    CriteriaMatcher::new(criteria).find_matches(tree)
}

/// The preferred node satisfying `criteria`.
pub fn best_match(tree: &UiTree, criteria: &MatchCriteria) -> Option<NodeId> {
    CriteriaMatcher::new(criteria).report(tree).best
}

fn compile(field: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!(field, pattern, error = %err, "regex never matches");
            None
        }
    }
}

fn words<'m>(map: &'m BTreeMap<String, Vec<String>>, field: &str) -> impl Iterator<Item = &'m str> {
    map.get(field)
        .into_iter()
        .flatten()
        .map(|word| word.trim())
        .filter(|word| !word.is_empty())
}

fn compile_map(map: &BTreeMap<String, Vec<String>>) -> HashMap<&str, Vec<Option<Regex>>> {
    map.iter()
        .map(|(field, patterns)| {
            let compiled = patterns
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(|p| compile(field, p))
                .collect();
            (field.as_str(), compiled)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::MatchStrategy;

    const DUMP: &str = r#"<hierarchy>
  <node class="android.widget.FrameLayout" package="com.app">
    <node class="android.widget.Button" text="Follow" resource-id="com.app:id/btn_follow" package="com.app" bounds="[0,0][100,40]"/>
    <node class="android.widget.Button" text="Follow back" resource-id="com.app:id/btn_follow_back" package="com.app" bounds="[0,40][100,80]"/>
    <node class="android.widget.Button" text="Unfollow" resource-id="com.app:id/btn_unfollow" package="com.app" bounds="[0,80][100,120]"/>
  </node>
</hierarchy>"#;

    fn criteria(strategy: MatchStrategy, pairs: &[(&str, &str)]) -> MatchCriteria {
        let mut criteria = MatchCriteria::new(strategy);
        for (field, value) in pairs {
            criteria.fields.push(field.to_string());
            criteria.values.insert(field.to_string(), value.to_string());
        }
        criteria
    }

    #[test]
    fn test_contains_is_default_mode() {
        let tree = UiTree::parse(DUMP).unwrap();
        let c = criteria(MatchStrategy::Custom, &[("text", "ollow")]);
        assert_eq!(find_matches(&tree, &c).len(), 3);
    }

    #[test]
    fn test_equals_and_best_match() {
        let tree = UiTree::parse(DUMP).unwrap();
        let mut c = criteria(MatchStrategy::Custom, &[("text", "Follow")]);
        let hits = find_matches(&tree, &c);
        assert_eq!(hits, vec![NodeId::from_index(2), NodeId::from_index(3)]);
        assert_eq!(best_match(&tree, &c), Some(NodeId::from_index(2)));

        c.match_mode.insert("text".into(), MatchMode::Equals);
        assert_eq!(find_matches(&tree, &c), vec![NodeId::from_index(2)]);
    }

    #[test]
    fn test_best_match_prefers_exact_resource_id() {
        let tree = UiTree::parse(DUMP).unwrap();
        let c = criteria(
            MatchStrategy::Custom,
            &[("resource-id", "com.app:id/btn_follow_back"), ("text", "Follow")],
        );
        assert_eq!(best_match(&tree, &c), Some(NodeId::from_index(3)));

        let c = criteria(MatchStrategy::Custom, &[("resource-id", "btn_"), ("text", "Follow back")]);
        assert_eq!(best_match(&tree, &c), Some(NodeId::from_index(3)));
    }

    #[test]
    fn test_includes_and_excludes() {
        let tree = UiTree::parse(DUMP).unwrap();
        let mut c = criteria(MatchStrategy::Custom, &[("class", "Button")]);
        c.excludes.insert("text".into(), vec!["Unfollow".into()]);
        c.fields.push("text".into());
        assert_eq!(find_matches(&tree, &c).len(), 2);

        c.includes.insert("text".into(), vec!["back".into()]);
        assert_eq!(find_matches(&tree, &c), vec![NodeId::from_index(3)]);
    }

    #[test]
    fn test_regex_rules() {
        let tree = UiTree::parse(DUMP).unwrap();
        let mut c = criteria(MatchStrategy::Custom, &[("text", "^Follow$")]);
        c.match_mode.insert("text".into(), MatchMode::Regex);
        assert_eq!(find_matches(&tree, &c), vec![NodeId::from_index(2)]);

        let mut c = criteria(MatchStrategy::Custom, &[("class", "Button")]);
        c.fields.push("resource-id".into());
        c.regex_includes
            .insert("resource-id".into(), vec!["btn_\\w+".into()]);
        c.regex_excludes
            .insert("resource-id".into(), vec!["unfollow$".into()]);
        assert_eq!(find_matches(&tree, &c).len(), 2);
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        let tree = UiTree::parse(DUMP).unwrap();
        let mut c = criteria(MatchStrategy::Custom, &[("text", "(Follow")]);
        c.match_mode.insert("text".into(), MatchMode::Regex);
        assert!(find_matches(&tree, &c).is_empty());

        let mut c = criteria(MatchStrategy::Custom, &[("class", "Button")]);
        c.regex_excludes.insert("class".into(), vec!["[".into()]);
        assert_eq!(find_matches(&tree, &c).len(), 3);
    }

    #[test]
    fn test_bounds_only_for_absolute_and_custom() {
        let tree = UiTree::parse(DUMP).unwrap();
        let fields = [("text", "Follow"), ("bounds", "[0,40][100,80]")];

        let c = criteria(MatchStrategy::Absolute, &fields);
        assert_eq!(find_matches(&tree, &c), vec![NodeId::from_index(3)]);

        let c = criteria(MatchStrategy::Strict, &fields);
        assert_eq!(find_matches(&tree, &c).len(), 2);
    }

    #[test]
    fn test_report_counts() {
        let tree = UiTree::parse(DUMP).unwrap();
        let c = criteria(MatchStrategy::Custom, &[("package", "com.app")]);
        let report = CriteriaMatcher::new(&c).report(&tree);
        assert_eq!(report.total(), 4);
        assert!(report.is_ambiguous());
        assert_eq!(report.best, Some(NodeId::from_index(1)));
    }
}
