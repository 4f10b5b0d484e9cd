//! Hook variant: mount styling, hover toggling, unmount semantics.

use quizstyle::hook::{HOVER_STYLE, style_record};
use quizstyle::{ActionButtonHook, EventKind, Priority, Runtime, parse_html};

const BASE_GRADIENT: &str = "linear-gradient(135deg, #06b6d4 0%, #0891b2 100%)";
const HOVER_GRADIENT: &str = "linear-gradient(135deg, #0891b2 0%, #0e7490 100%)";

#[test]
fn hover_toggles_between_gradients() {
    let mut doc = parse_html(r#"<button class="quiz-action-button">Go</button>"#);
    let mut rt = Runtime::new();
    let button = doc.find_by_tag("button").unwrap();

    let hook = ActionButtonHook::mount(&mut doc, &mut rt, button);
    assert_eq!(doc.inline_style(button).get("background").unwrap().value, BASE_GRADIENT);

    rt.dispatch(&mut doc, button, EventKind::PointerEnter);
    let style = doc.inline_style(button);
    assert_eq!(style.get("background").unwrap().value, HOVER_GRADIENT);
    assert_eq!(style.get("background").unwrap().priority, Priority::Important);
    // Properties outside the hover record keep their mounted values.
    assert_eq!(style.get("border").unwrap().value, "2px solid #0e7490");

    rt.dispatch(&mut doc, button, EventKind::PointerLeave);
    assert_eq!(doc.inline_style(button).get("background").unwrap().value, BASE_GRADIENT);

    hook.unmount(&mut rt);
}

#[test]
fn unmount_removes_listeners_but_not_styles() {
    let mut doc = parse_html("<button>Go</button>");
    let mut rt = Runtime::new();
    let button = doc.find_by_tag("button").unwrap();

    let hook = ActionButtonHook::mount(&mut doc, &mut rt, button);
    hook.unmount(&mut rt);

    // Styling applied at mount time persists.
    assert_eq!(doc.inline_style(button).get("background").unwrap().value, BASE_GRADIENT);

    // But hover no longer toggles anything.
    rt.dispatch(&mut doc, button, EventKind::PointerEnter);
    assert_eq!(doc.inline_style(button).get("background").unwrap().value, BASE_GRADIENT);
}

#[test]
fn hover_record_is_narrower_than_the_base_record() {
    let base: Vec<&str> = style_record().iter().map(|p| p.name).collect();
    for prop in HOVER_STYLE {
        assert!(base.contains(&prop.name), "hover only overrides base properties");
    }
    assert!(HOVER_STYLE.len() < style_record().len());
}

#[test]
fn hover_only_affects_the_bound_element() {
    let mut doc = parse_html("<button>A</button><button>B</button>");
    let mut rt = Runtime::new();
    let buttons: Vec<_> = doc
        .query_selector_all("button")
        .unwrap();
    let (first, second) = (buttons[0], buttons[1]);

    let _hook = ActionButtonHook::mount(&mut doc, &mut rt, first);

    rt.dispatch(&mut doc, second, EventKind::PointerEnter);
    assert_eq!(doc.attribute(second, "style"), None);
    assert_eq!(doc.inline_style(first).get("background").unwrap().value, BASE_GRADIENT);
}
