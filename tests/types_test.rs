use collation::types::*;

#[test]
fn pointer_parse_target_splits_url_and_locator() {
    let cases = [
        ("docA.xml#idX", "docA.xml", "idX"),
        (
            "https://example.org/chunks/f1818_C07.xml#//div[@n='1']",
            "https://example.org/chunks/f1818_C07.xml",
            "//div[@n='1']",
        ),
        ("a#b", "a", "b"),
    ];

    for (target, url, locator) in cases {
        let pointer = Pointer::parse_target(target)
            .unwrap_or_else(|| panic!("failed to parse target '{}'", target));
        assert_eq!(pointer.url, url);
        assert_eq!(pointer.locator, locator);
        assert_eq!(pointer.target(), target);
    }
}

#[test]
fn pointer_parse_target_rejects_wrong_separator_count() {
    assert!(Pointer::parse_target("docA.xml").is_none());
    assert!(Pointer::parse_target("docA.xml#a#b").is_none());
    assert!(Pointer::parse_target("##").is_none());
}

#[test]
fn pointer_parse_target_rejects_empty_parts() {
    assert!(Pointer::parse_target("#idX").is_none());
    assert!(Pointer::parse_target("docA.xml#").is_none());
    assert!(Pointer::parse_target("").is_none());
}

#[test]
fn resolution_accessors() {
    let node = MatchedNode {
        kind: MatchKind::Element,
        name: Some("p".to_string()),
        xml_id: Some("p1".to_string()),
        text: "text".to_string(),
    };
    let resolved = Resolution::Resolved {
        tier: ResolutionTier::Identifier,
        nodes: vec![node.clone()],
    };
    assert!(resolved.is_resolved());
    assert_eq!(resolved.tier(), Some(ResolutionTier::Identifier));
    assert_eq!(resolved.nodes(), &[node]);

    assert!(!Resolution::Unresolved.is_resolved());
    assert!(Resolution::Unresolved.nodes().is_empty());
    assert_eq!(Resolution::Unresolved.tier(), None);
}

#[test]
fn summary_counts_outcomes_and_documents() {
    let pointer = |url: &str, locator: &str| Pointer {
        url: url.to_string(),
        locator: locator.to_string(),
    };
    let results = vec![
        PointerResolution {
            pointer: pointer("a.xml", "x"),
            resolution: Resolution::Resolved {
                tier: ResolutionTier::Expression,
                nodes: vec![],
            },
        },
        PointerResolution {
            pointer: pointer("a.xml", "y"),
            resolution: Resolution::Unresolved,
        },
        PointerResolution {
            pointer: pointer("b.xml", "z"),
            resolution: Resolution::Unresolved,
        },
    ];

    let summary = DereferenceSummary::from_results(&results);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.resolved_count, 1);
    assert_eq!(summary.unresolved_count, 2);
    assert_eq!(summary.documents_loaded, 2);
}

#[test]
fn resolution_serializes_with_status_tag() {
    let json = serde_json::to_value(&Resolution::Unresolved).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "unresolved" }));

    let json = serde_json::to_value(&Resolution::Resolved {
        tier: ResolutionTier::Identifier,
        nodes: vec![],
    })
    .unwrap();
    assert_eq!(json["status"], "resolved");
    assert_eq!(json["tier"], "identifier");
}
