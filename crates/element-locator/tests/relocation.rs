use element_locator::{ElementContext, RelocationStrategy, Relocator, RelocatorConfig};
use ui_tree::{NodeId, UiTree};

const BEFORE: &str = r#"<hierarchy><node class="Btn" text="Follow" bounds="[0,0][100,40]"/></hierarchy>"#;

// Same button, shifted and wrapped in a container the path does not expect.
const NESTED: &str = r#"<hierarchy><frame class="Frame"><node class="Btn" text="Follow" bounds="[5,2][105,42]"/></frame></hierarchy>"#;

fn button_context() -> ElementContext {
    let tree = UiTree::parse(BEFORE).unwrap();
    ElementContext::capture(&tree, NodeId::from_index(1)).unwrap()
}

fn find_by_text(tree: &UiTree, text: &str) -> NodeId {
    tree.node_ids()
        .find(|id| tree.node(*id).and_then(|n| n.text()) == Some(text))
        .unwrap()
}

#[test]
fn nested_button_falls_back_to_predicate_path() {
    let after = UiTree::parse(NESTED).unwrap();
    let result = Relocator::default().relocate(&button_context(), &after);

    assert_eq!(result.node, Some(find_by_text(&after, "Follow")));
    assert_eq!(result.strategy_name(), "predicate-path");
    assert!(result.confidence > 0.5 && result.confidence < 1.0);
    assert!(result.reasons[0].starts_with("exact-path: "));
}

#[test]
fn nested_button_by_bounds_alone() {
    let after = UiTree::parse(NESTED).unwrap();
    let relocator = Relocator::new(RelocatorConfig::default().with_strategies(vec![
        RelocationStrategy::ExactPath,
        RelocationStrategy::BoundsProximity,
    ]))
    .unwrap();

    let result = relocator.relocate(&button_context(), &after);
    assert_eq!(result.node, Some(find_by_text(&after, "Follow")));
    assert_eq!(result.strategy_used, Some(RelocationStrategy::BoundsProximity));
    // deviation 5 of 10
    assert!((result.confidence - 0.5).abs() < 1e-9);

    let closer = UiTree::parse(&NESTED.replace("[5,2][105,42]", "[2,1][102,41]")).unwrap();
    let result = relocator.relocate(&button_context(), &closer);
    assert_eq!(result.strategy_name(), "bounds-proximity");
    assert!((result.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn bounds_tolerance_boundary() {
    let relocator = Relocator::new(
        RelocatorConfig::default().with_strategies(vec![RelocationStrategy::BoundsProximity]),
    )
    .unwrap();

    let at_tolerance = UiTree::parse(&BEFORE.replace("[0,0][100,40]", "[10,0][110,40]")).unwrap();
    let result = relocator.relocate(&button_context(), &at_tolerance);
    assert_eq!(result.node, Some(NodeId::from_index(1)));
    assert!((result.confidence - 0.1).abs() < 1e-9);

    let beyond = UiTree::parse(&BEFORE.replace("[0,0][100,40]", "[11,0][111,40]")).unwrap();
    let result = relocator.relocate(&button_context(), &beyond);
    assert_eq!(result.node, None);
    assert_eq!(result.strategy_name(), "none");
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn moved_subtree_is_found_by_a_fallback() {
    let before = r#"<hierarchy>
  <node class="android.widget.FrameLayout" bounds="[0,0][1080,1920]">
    <node class="android.widget.LinearLayout" resource-id="com.app:id/header" bounds="[0,0][1080,300]">
      <node class="android.widget.Button" resource-id="com.app:id/btn_follow" text="Follow" bounds="[800,100][1040,200]"/>
    </node>
    <node class="android.widget.ListView" resource-id="com.app:id/list" bounds="[0,300][1080,1920]"/>
  </node>
</hierarchy>"#;
    // The header row moved under a new toolbar; the button kept its bounds.
    let after = r#"<hierarchy>
  <node class="android.widget.FrameLayout" bounds="[0,0][1080,1920]">
    <toolbar class="android.widget.Toolbar" bounds="[0,0][1080,300]">
      <node class="android.widget.LinearLayout" resource-id="com.app:id/header" bounds="[0,0][1080,300]">
        <node class="android.widget.Button" resource-id="com.app:id/btn_follow" text="Follow" bounds="[800,100][1040,200]"/>
      </node>
    </toolbar>
  </node>
</hierarchy>"#;

    let before = UiTree::parse(before).unwrap();
    let after = UiTree::parse(after).unwrap();
    let button = find_by_text(&before, "Follow");
    let context = ElementContext::capture(&before, button).unwrap();

    let result = Relocator::default().relocate(&context, &after);
    assert_eq!(result.node, Some(find_by_text(&after, "Follow")));
    assert_ne!(result.strategy_used, Some(RelocationStrategy::ExactPath));
    assert!(result.confidence > 0.0 && result.confidence < 1.0);
}

#[test]
fn renamed_button_found_by_attribute_scoring() {
    let before = r#"<hierarchy><node class="android.widget.Button" resource-id="com.app:id/btn_follow" text="Follow"/></hierarchy>"#;
    let after = r#"<hierarchy><frame><node class="android.widget.ImageButton" resource-id="com.app:id/btn_follow" text="Follow back"/></frame></hierarchy>"#;

    let before = UiTree::parse(before).unwrap();
    let after = UiTree::parse(after).unwrap();
    let context = ElementContext::capture(&before, NodeId::from_index(1)).unwrap();

    let result = Relocator::default().relocate(&context, &after);
    assert_eq!(result.strategy_name(), "attribute-scoring");
    assert_eq!(result.node, Some(NodeId::from_index(2)));
    // 30 exact resource-id + 18 for contained text
    assert!((result.confidence - 0.48).abs() < 1e-9);
}

#[test]
fn context_survives_json() {
    let context = button_context();
    let json = context.to_json_pretty().unwrap();
    let restored = ElementContext::from_json(&json).unwrap();

    let after = UiTree::parse(NESTED).unwrap();
    let relocator = Relocator::default();
    assert_eq!(
        relocator.relocate(&context, &after),
        relocator.relocate(&restored, &after)
    );
}
