// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use safe_stringify::domain::models::value_graph::Node;
    use safe_stringify::domain::services::stringify_service::{safe_stringify, CycleSafeSerializer};
    use serde_json::{json, Value};

    /// 构造一个带有父子双向引用的房源图
    fn listing_graph() -> (Node, Node) {
        let agent = Node::object();
        agent.set("name", "Ada").unwrap();

        let listing = Node::object();
        listing.set("id", 7).unwrap();
        listing.set("agent", agent.clone()).unwrap();
        agent.set("listing", listing.clone()).unwrap();

        (listing, agent)
    }

    #[test]
    fn test_transitive_cycle_terminates() {
        let (listing, agent) = listing_graph();

        let out = safe_stringify(&listing);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"id": 7, "agent": {"name": "Ada"}}));

        // 从另一端进入时，被省略的是另一侧的回边
        let out = safe_stringify(&agent);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"name": "Ada", "listing": {"id": 7}}));

        agent.clear();
    }

    #[test]
    fn test_self_containing_array() {
        let arr = Node::array();
        arr.push(1).unwrap();
        arr.push(arr.clone()).unwrap();

        let out = CycleSafeSerializer::with_indent(0).serialize(&arr);
        assert_eq!(out, "[1,null]");
        arr.clear();
    }

    #[test]
    fn test_shared_reference_in_nested_branches() {
        let shared = Node::from(json!({"x": 1}));
        let left = Node::object();
        left.set("deep", shared.clone()).unwrap();
        let root = Node::object();
        root.set("left", left).unwrap();
        root.set("right", shared).unwrap();

        let (out, report) = CycleSafeSerializer::with_indent(0).serialize_with_report(&root);
        assert_eq!(out, r#"{"left":{"deep":{"x":1}}}"#);
        assert_eq!(report.containers_visited, 3);
        assert_eq!(report.references_omitted, 1);
    }

    #[test]
    fn test_equal_but_distinct_instances_both_render() {
        let root = Node::object();
        root.set("p", Node::from(json!({"x": 1}))).unwrap();
        root.set("q", Node::from(json!({"x": 1}))).unwrap();

        let out = CycleSafeSerializer::with_indent(0).serialize(&root);
        assert_eq!(out, r#"{"p":{"x":1},"q":{"x":1}}"#);
    }

    #[test]
    fn test_deep_cycle_ring() {
        let head = Node::object();
        let mut tail = head.clone();
        for i in 0..100 {
            let next = Node::object();
            next.set("n", i).unwrap();
            tail.set("next", next.clone()).unwrap();
            tail = next;
        }
        tail.set("next", head.clone()).unwrap();

        let (out, report) = CycleSafeSerializer::new().serialize_with_report(&head);
        assert!(!out.is_empty());
        assert_eq!(report.containers_visited, 101);
        assert_eq!(report.references_omitted, 1);
        assert!(serde_json::from_str::<Value>(&out).is_ok());

        head.clear();
    }

    #[test]
    fn test_input_graph_is_not_mutated() {
        let (listing, agent) = listing_graph();
        let before = listing.len();
        let _ = safe_stringify(&listing);
        assert_eq!(listing.len(), before);
        assert!(agent.get("listing").is_some());
        agent.clear();
    }

    #[test]
    fn test_output_is_plain_text() {
        let root = Node::from(json!({"a": 1, "b": [1, 2, 3]}));
        let out = safe_stringify(&root);
        let again = safe_stringify(&Node::from(out.as_str()));
        assert_eq!(again, serde_json::to_string(&out).unwrap());
    }
}
