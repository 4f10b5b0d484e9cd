use quizstyle::{Runtime, StyleEnforcer, parse_html};

fn main() {
    let mut doc = parse_html(
        r#"<div id="quiz">
            <button class="quiz-action-button">Next question</button>
            <input type="submit" class="quiz-action-button" value="Finish">
            <div class="quiz-action-button">decoy div</div>
        </div>"#,
    );
    let mut rt = Runtime::new();

    let enforcer = StyleEnforcer::new().expect("selectors are constants");
    let handle = enforcer.install(&mut doc, &mut rt);

    let button = doc.find_by_tag("button").unwrap();
    println!("After install:");
    println!("  {}", doc.serialize_subtree(button));

    // A competing script rewrites the style attribute wholesale.
    doc.set_attribute(button, "style", "background: red; color: black");
    println!("\nAfter a competing write:");
    println!("  {}", doc.serialize_subtree(button));

    // One second later the timer backstop has corrected it.
    rt.advance(&mut doc, 1000);
    println!("\nOne second later:");
    println!("  {}", doc.serialize_subtree(button));

    handle.dispose(&mut rt);
    println!("\nDisposed. Styles stay, reassertion stops.");
}
