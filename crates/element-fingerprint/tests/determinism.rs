use element_fingerprint::{
    generate_fingerprint, is_same_element, weighted_similarity, AttributeProfile,
    FingerprintConfig, FingerprintGenerator, SimilarityWeights, TextMatchOptions,
};
use ui_tree::UiTree;

const PROFILE: &str = r#"<hierarchy rotation="0">
  <node class="android.widget.FrameLayout" package="com.app" bounds="[0,0][1080,2400]">
    <node class="android.widget.LinearLayout" resource-id="com.app:id/header" bounds="[0,0][1080,400]">
      <node class="android.widget.TextView" resource-id="com.app:id/nickname" text="Alice" bounds="[40,60][600,120]"/>
      <node class="android.widget.Button" resource-id="com.app:id/follow" text="Follow" content-desc="Follow Alice" clickable="true" bounds="[800,60][1040,140]"/>
    </node>
  </node>
</hierarchy>"#;

// Same document with every element's attributes in a different order.
const PROFILE_PERMUTED: &str = r#"<hierarchy rotation="0">
  <node bounds="[0,0][1080,2400]" package="com.app" class="android.widget.FrameLayout">
    <node bounds="[0,0][1080,400]" resource-id="com.app:id/header" class="android.widget.LinearLayout">
      <node text="Alice" bounds="[40,60][600,120]" resource-id="com.app:id/nickname" class="android.widget.TextView"/>
      <node clickable="true" content-desc="Follow Alice" text="Follow" bounds="[800,60][1040,140]" resource-id="com.app:id/follow" class="android.widget.Button"/>
    </node>
  </node>
</hierarchy>"#;

#[test]
fn fingerprints_are_stable_across_parses() {
    let first = UiTree::parse(PROFILE).unwrap();
    let second = UiTree::parse(PROFILE).unwrap();
    for id in first.node_ids() {
        assert_eq!(generate_fingerprint(&first, id), generate_fingerprint(&second, id));
    }
}

#[test]
fn attribute_order_does_not_matter() {
    let tree = UiTree::parse(PROFILE).unwrap();
    let permuted = UiTree::parse(PROFILE_PERMUTED).unwrap();
    let generator = FingerprintGenerator::new(FingerprintConfig {
        include_bounds: true,
        ..Default::default()
    });
    for id in tree.node_ids() {
        assert_eq!(generator.generate(&tree, id), generator.generate(&permuted, id));
        assert!(is_same_element(&tree, id, &permuted, id, 1.0));
    }
}

#[test]
fn renamed_button_still_ranks_close() {
    let tree = UiTree::parse(PROFILE).unwrap();
    let renamed = UiTree::parse(&PROFILE.replace("text=\"Follow\"", "text=\"Follow back\"")).unwrap();
    let follow = tree
        .node_ids()
        .find(|id| tree.node(*id).and_then(|n| n.resource_id()) == Some("com.app:id/follow"))
        .unwrap();

    let saved = AttributeProfile::from_node(tree.node(follow).unwrap());
    let current = AttributeProfile::from_node(renamed.node(follow).unwrap());
    let score = weighted_similarity(
        &saved,
        &current,
        &SimilarityWeights::default(),
        &TextMatchOptions::default(),
    );
    // rid 10 + text 6*0.9 + desc 6 + class 4 + bounds 3
    assert!((score - 28.4 / 29.0).abs() < 1e-9);
    assert_ne!(generate_fingerprint(&tree, follow), generate_fingerprint(&renamed, follow));
}
