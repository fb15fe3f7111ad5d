use super::*;
use abovefold_protocols::StyleSnapshot;

fn snapshot(tag: &str, y: f64, height: f64) -> ElementSnapshot {
    ElementSnapshot {
        tag: tag.to_string(),
        id: None,
        classes: Vec::new(),
        rect: BoundingRect { x: 0.0, y, width: 100.0, height },
        style: StyleSnapshot {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
            font_size: "16px".to_string(),
            font_family: "Inter, sans-serif".to_string(),
        },
        has_text: false,
        selector: String::new(),
        above_fold: false,
    }
}

#[test]
fn buffer_controls_inclusion() {
    // rect.top = viewportHeight + 50; included with buffer 100, excluded
    // with buffer 30.
    let rect = BoundingRect { x: 0.0, y: 640.0 + 50.0, width: 10.0, height: 10.0 };
    assert!(is_above_fold(&rect, 640.0, 100.0));
    assert!(!is_above_fold(&rect, 640.0, 30.0));
}

#[test]
fn zero_sized_elements_are_never_above_fold() {
    let rect = BoundingRect { x: 0.0, y: 10.0, width: 0.0, height: 10.0 };
    assert!(!is_above_fold(&rect, 640.0, 50.0));
}

#[test]
fn elements_above_the_top_buffer_are_excluded() {
    let rect = BoundingRect { x: 0.0, y: -500.0, width: 10.0, height: 10.0 };
    assert!(!is_above_fold(&rect, 640.0, 50.0));
    // Partially scrolled-off elements within the buffer still count.
    let rect = BoundingRect { x: 0.0, y: -40.0, width: 10.0, height: 10.0 };
    assert!(is_above_fold(&rect, 640.0, 50.0));
}

#[test]
fn selector_priority_id_then_classes_then_tag() {
    let mut snap = snapshot("div", 0.0, 10.0);
    snap.id = Some("hero".to_string());
    snap.classes = vec!["banner".to_string()];
    assert_eq!(derive_selector(&snap), "#hero");

    snap.id = None;
    assert_eq!(derive_selector(&snap), "div.banner");

    snap.classes.clear();
    assert_eq!(derive_selector(&snap), "div");
}

#[test]
fn multiple_classes_join_in_order() {
    let mut snap = snapshot("button", 0.0, 10.0);
    snap.classes = vec!["btn".to_string(), "btn-primary".to_string()];
    assert_eq!(derive_selector(&snap), "button.btn.btn-primary");
}

#[test]
fn pseudo_variant_classes_are_skipped() {
    let mut snap = snapshot("a", 0.0, 10.0);
    snap.classes = vec!["hover:underline".to_string(), "link".to_string()];
    assert_eq!(derive_selector(&snap), "a.link");

    snap.classes = vec!["hover:underline".to_string()];
    assert_eq!(derive_selector(&snap), "a");
}

#[test]
fn annotate_drops_non_visual_tags_and_fills_fields() {
    let snapshots = vec![
        snapshot("div", 0.0, 100.0),
        snapshot("script", 0.0, 100.0),
        snapshot("footer", 3000.0, 100.0),
    ];
    let annotated = annotate(snapshots, 640.0, 50.0);
    assert_eq!(annotated.len(), 2);
    assert!(annotated[0].above_fold);
    assert_eq!(annotated[0].selector, "div");
    assert!(!annotated[1].above_fold);
}

#[test]
fn selector_set_only_includes_above_fold() {
    let snapshots = vec![snapshot("div", 0.0, 100.0), snapshot("footer", 3000.0, 100.0)];
    let annotated = annotate(snapshots, 640.0, 50.0);
    let selectors = above_fold_selectors(&annotated);
    assert!(selectors.contains("div"));
    assert!(!selectors.contains("footer"));
}

#[test]
fn hidden_elements_are_not_visible_text() {
    let mut visible = snapshot("p", 0.0, 20.0);
    visible.has_text = true;
    let annotated = annotate(vec![visible], 640.0, 50.0);
    assert_eq!(visible_text_elements(&annotated).len(), 1);

    for (field, value) in [
        ("display", "none"),
        ("visibility", "hidden"),
        ("opacity", "0"),
        ("font-size", "0px"),
    ] {
        let mut hidden = snapshot("p", 0.0, 20.0);
        hidden.has_text = true;
        match field {
            "display" => hidden.style.display = value.to_string(),
            "visibility" => hidden.style.visibility = value.to_string(),
            "opacity" => hidden.style.opacity = value.to_string(),
            _ => hidden.style.font_size = value.to_string(),
        }
        let annotated = annotate(vec![hidden], 640.0, 50.0);
        assert!(visible_text_elements(&annotated).is_empty(), "{} should hide", field);
    }
}

#[test]
fn textless_elements_are_not_visible_text() {
    let annotated = annotate(vec![snapshot("div", 0.0, 20.0)], 640.0, 50.0);
    assert!(visible_text_elements(&annotated).is_empty());
}

#[test]
fn font_families_are_trimmed_and_unquoted() {
    let mut a = snapshot("h1", 0.0, 30.0);
    a.has_text = true;
    a.style.font_family = "\"Inter\", 'Helvetica Neue' , sans-serif".to_string();
    let mut b = snapshot("p", 40.0, 20.0);
    b.has_text = true;
    b.style.font_family = "Inter, serif".to_string();

    let annotated = annotate(vec![a, b], 640.0, 50.0);
    let families = used_font_families(&annotated);
    assert!(families.contains("Inter"));
    assert!(families.contains("Helvetica Neue"));
    assert!(families.contains("sans-serif"));
    assert!(families.contains("serif"));
    assert_eq!(families.len(), 4);
}

#[test]
fn below_fold_text_contributes_no_fonts() {
    let mut below = snapshot("p", 3000.0, 20.0);
    below.has_text = true;
    below.style.font_family = "Papyrus".to_string();
    let annotated = annotate(vec![below], 640.0, 50.0);
    assert!(used_font_families(&annotated).is_empty());
}
