//! Text and attribute similarity

use serde::{Deserialize, Serialize};
use ui_tree::{Bounds, UiNode};

use crate::config::SimilarityWeights;

/// Options for [`text_similarity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMatchOptions {
    pub ignore_case: bool,
    pub allow_partial_text: bool,
}

impl Default for TextMatchOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            allow_partial_text: true,
        }
    }
}

/// Edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Similarity in [0, 1].
///
/// Empty input scores 0. When partial text is allowed, containment in either
/// direction scores 0.9, identical text included. Otherwise equality scores 1
/// and anything else `1 - distance / max_len`.
pub fn text_similarity(a: &str, b: &str, options: &TextMatchOptions) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (a, b) = if options.ignore_case {
        (a.to_lowercase(), b.to_lowercase())
    } else {
        (a.to_string(), b.to_string())
    };

    if options.allow_partial_text && (a.contains(&b) || b.contains(&a)) {
        return 0.9;
    }
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// Attribute subset compared by the overall similarity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeProfile {
    pub resource_id: Option<String>,
    pub text: Option<String>,
    pub content_desc: Option<String>,
    pub class_name: Option<String>,
    pub bounds: Option<String>,
}

impl AttributeProfile {
    pub fn from_node(node: &UiNode) -> Self {
        let owned = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            resource_id: owned(node.resource_id()),
            text: owned(node.text()),
            content_desc: owned(node.content_desc()),
            class_name: owned(node.class_name()),
            bounds: owned(node.bounds_raw()),
        }
    }

    pub fn parsed_bounds(&self) -> Option<Bounds> {
        self.bounds.as_deref().and_then(|raw| raw.parse().ok())
    }
}

/// Weighted attribute similarity in [0, 1].
///
/// Each attribute present on both sides contributes its full weight when
/// equal; text and description contribute `weight * text_similarity`
/// otherwise. The sum is divided by the total weight.
pub fn weighted_similarity(
    a: &AttributeProfile,
    b: &AttributeProfile,
    weights: &SimilarityWeights,
    options: &TextMatchOptions,
) -> f64 {
    let total = weights.total();
    if total <= 0.0 {
        return 0.0;
    }

    let exact = |x: &Option<String>, y: &Option<String>, weight: f64| match (x, y) {
        (Some(x), Some(y)) if x == y => weight,
        _ => 0.0,
    };
    let fuzzy = |x: &Option<String>, y: &Option<String>, weight: f64| match (x, y) {
        (Some(x), Some(y)) if x == y => weight,
        (Some(x), Some(y)) => weight * text_similarity(x, y, options),
        _ => 0.0,
    };

    let matched = exact(&a.resource_id, &b.resource_id, weights.resource_id)
        + fuzzy(&a.text, &b.text, weights.text)
        + fuzzy(&a.content_desc, &b.content_desc, weights.content_desc)
        + exact(&a.class_name, &b.class_name, weights.class_name)
        + exact(&a.bounds, &b.bounds, weights.bounds);
    matched / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("关注", "已关注"), 1);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_text_similarity_order_of_checks() {
        let options = TextMatchOptions::default();
        assert_eq!(text_similarity("Follow", "follow", &options), 0.9);
        assert_eq!(text_similarity("Follow", "Follow back", &options), 0.9);
        assert_eq!(text_similarity("", "Follow", &options), 0.0);
        assert!(approx(text_similarity("kitten", "sitting", &options), 1.0 - 3.0 / 7.0));
    }

    #[test]
    fn test_text_similarity_strict_options() {
        let options = TextMatchOptions {
            ignore_case: false,
            allow_partial_text: false,
        };
        assert!(text_similarity("Follow", "follow", &options) < 1.0);
        assert!(text_similarity("Follow", "Follow back", &options) < 0.9);
        assert_eq!(text_similarity("Follow", "Follow", &options), 1.0);
    }

    #[test]
    fn test_identical_text_counts_as_containment() {
        let options = TextMatchOptions::default();
        assert!(approx(text_similarity("Follow", "Follow", &options), 0.9));
        assert!(approx(text_similarity("关注", "关注", &options), 0.9));
    }

    #[test]
    fn test_weighted_similarity() {
        let weights = SimilarityWeights::default();
        let options = TextMatchOptions::default();
        let a = AttributeProfile {
            resource_id: Some("com.app:id/follow".into()),
            text: Some("Follow".into()),
            content_desc: None,
            class_name: Some("Btn".into()),
            bounds: Some("[0,0][100,40]".into()),
        };
        assert!(approx(weighted_similarity(&a, &a, &weights, &options), 23.0 / 29.0));

        let mut b = a.clone();
        b.text = Some("Follow back".into());
        b.bounds = Some("[5,2][105,42]".into());
        let expected = (10.0 + 6.0 * 0.9 + 4.0) / 29.0;
        assert!(approx(weighted_similarity(&a, &b, &weights, &options), expected));

        let empty = AttributeProfile::default();
        assert_eq!(weighted_similarity(&a, &empty, &weights, &options), 0.0);
    }
}
