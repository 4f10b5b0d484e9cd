use quizstyle::{ActionButtonHook, EventKind, Runtime, parse_html};

fn main() {
    let mut doc = parse_html(r#"<button class="quiz-action-button">Go</button>"#);
    let mut rt = Runtime::new();
    let button = doc.find_by_tag("button").unwrap();

    let hook = ActionButtonHook::mount(&mut doc, &mut rt, button);
    println!("Mounted:");
    println!("  background = {}", background(&doc, button));

    rt.dispatch(&mut doc, button, EventKind::PointerEnter);
    println!("Pointer enter:");
    println!("  background = {}", background(&doc, button));

    rt.dispatch(&mut doc, button, EventKind::PointerLeave);
    println!("Pointer leave:");
    println!("  background = {}", background(&doc, button));

    hook.unmount(&mut rt);
    rt.dispatch(&mut doc, button, EventKind::PointerEnter);
    println!("After unmount, pointer enter changes nothing:");
    println!("  background = {}", background(&doc, button));
}

fn background(doc: &quizstyle::Document, id: quizstyle::NodeId) -> String {
    doc.inline_style(id)
        .get("background")
        .map(|d| d.value.clone())
        .unwrap_or_else(|| "(unset)".to_string())
}
