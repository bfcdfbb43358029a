use ui_tree::{
    build_absolute_path, evaluate_absolute_path, evaluate_predicate_path,
    evaluate_predicate_path_all, NodeId, UiTree,
};

const FEED: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<hierarchy rotation="0">
  <node index="0" text="" resource-id="" class="android.widget.FrameLayout" package="com.app" clickable="false" enabled="true" bounds="[0,0][1080,2400]">
    <node index="0" text="" resource-id="com.app:id/toolbar" class="android.view.ViewGroup" package="com.app" bounds="[0,63][1080,210]">
      <node index="0" text="Discover" resource-id="com.app:id/title" class="android.widget.TextView" package="com.app" bounds="[42,100][400,170]"/>
      <node index="1" text="" resource-id="com.app:id/search" class="android.widget.ImageButton" package="com.app" content-desc="Search" clickable="true" bounds="[900,80][1060,200]"/>
    </node>
    <node index="1" text="" resource-id="com.app:id/list" class="androidx.recyclerview.widget.RecyclerView" package="com.app" scrollable="true" bounds="[0,210][1080,2200]">
      <node index="0" text="" class="android.widget.LinearLayout" package="com.app" clickable="true" bounds="[0,210][1080,500]">
        <node index="0" text="Alice" resource-id="com.app:id/name" class="android.widget.TextView" package="com.app" bounds="[200,250][700,320]"/>
        <node index="1" text="Follow" resource-id="com.app:id/btn_follow" class="android.widget.Button" package="com.app" clickable="true" bounds="[800,250][1040,350]"/>
      </node>
      <node index="1" text="" class="android.widget.LinearLayout" package="com.app" clickable="true" bounds="[0,500][1080,790]">
        <node index="0" text="Bob" resource-id="com.app:id/name" class="android.widget.TextView" package="com.app" bounds="[200,540][700,610]"/>
        <node index="1" text="Following" resource-id="com.app:id/btn_following" class="android.widget.Button" package="com.app" clickable="true" bounds="[800,540][1040,640]"/>
      </node>
    </node>
  </node>
</hierarchy>"#;

#[test]
fn absolute_path_round_trips_for_every_node() {
    let tree = UiTree::parse(FEED).unwrap();
    for id in tree.node_ids() {
        let path = build_absolute_path(&tree, id).unwrap();
        assert_eq!(evaluate_absolute_path(&tree, &path), Some(id), "path {}", path);
    }
}

#[test]
fn reparsing_gives_identical_paths() {
    let first = UiTree::parse(FEED).unwrap();
    let second = UiTree::parse(FEED).unwrap();
    for id in first.node_ids() {
        assert_eq!(
            build_absolute_path(&first, id),
            build_absolute_path(&second, id)
        );
    }
}

#[test]
fn predicate_path_by_resource_id() {
    let tree = UiTree::parse(FEED).unwrap();
    let hit = evaluate_predicate_path(&tree, "//*[@resource-id='com.app:id/btn_follow']").unwrap();
    assert_eq!(tree.node(hit).unwrap().text(), Some("Follow"));

    let other = UiTree::parse(r#"<hierarchy><node resource-id="com.app:id/other"/></hierarchy>"#)
        .unwrap();
    assert_eq!(
        evaluate_predicate_path(&other, "//*[@resource-id='com.app:id/btn_follow']"),
        None
    );
    assert!(
        evaluate_predicate_path_all(&other, "//*[@resource-id='com.app:id/btn_follow']").is_empty()
    );
}

#[test]
fn predicate_path_all_keeps_document_order() {
    let tree = UiTree::parse(FEED).unwrap();
    let names = evaluate_predicate_path_all(&tree, "//node[@resource-id='com.app:id/name']");
    let texts: Vec<&str> = names
        .iter()
        .map(|id| tree.node(*id).unwrap().text().unwrap())
        .collect();
    assert_eq!(texts, vec!["Alice", "Bob"]);
    assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn deep_documents_do_not_overflow() {
    let depth = 20_000;
    let mut text = String::from("<hierarchy>");
    for _ in 0..depth {
        text.push_str("<node>");
    }
    for _ in 0..depth {
        text.push_str("</node>");
    }
    text.push_str("</hierarchy>");

    let tree = UiTree::parse(&text).unwrap();
    assert_eq!(tree.len(), depth + 1);
    let deepest = NodeId::from_index(depth);
    assert_eq!(tree.depth(deepest), depth);
    assert_eq!(tree.descendants(tree.root()).count(), depth + 1);

    let path = build_absolute_path(&tree, deepest).unwrap();
    assert_eq!(evaluate_absolute_path(&tree, &path), Some(deepest));
}
