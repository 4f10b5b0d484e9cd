//! Style enforcement for quiz action buttons.
//!
//! The enforcer fights other style sources for control of button
//! appearance: every enforcement pass re-selects the marked elements and
//! rewrites the declared properties at `!important` priority,
//! unconditionally. Two independent triggers keep passes running after
//! installation: a mutation observer (structural changes and class
//! rewrites) and a 1000 ms interval timer (inline-style writes the
//! observer is filtered against, and races where a competing script
//! re-applies its style after the observer's pass).

use selectors::parser::Selector;

use crate::dom::{Document, NodeId, QuizSelectors, ReadyState, parse_selector_list};
use crate::error::Result;
use crate::runtime::{ObserveOptions, ObserverId, Runtime, TimerId};
use crate::style::{Priority, StyleProperty};

/// Class marking an element as in scope for forced styling.
pub const MARKER_CLASS: &str = "quiz-action-button";

/// Selector for candidate elements. Matching is kind-blind on purpose;
/// candidates still have to pass [`is_action_button`].
pub const MARKER_SELECTOR: &str = ".quiz-action-button";

/// Text-bearing descendants that get the forced text color.
pub const TEXT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, span, strong, em";

/// `type` attribute values that qualify an `input` element.
pub const INPUT_TYPES: [&str; 2] = ["button", "submit"];

/// Period of the timer backstop.
pub const REASSERT_INTERVAL_MS: u64 = 1000;

/// Forced text color, also written onto text-bearing descendants.
pub const TEXT_COLOR: &str = "#ffffff";

/// The declared style, applied in order at maximum priority.
pub const BUTTON_STYLE: &[StyleProperty] = &[
    StyleProperty {
        name: "background",
        value: "linear-gradient(135deg, #06b6d4 0%, #0891b2 100%)",
        priority: Priority::Important,
    },
    StyleProperty {
        name: "color",
        value: TEXT_COLOR,
        priority: Priority::Important,
    },
    StyleProperty {
        name: "border",
        value: "2px solid #0e7490",
        priority: Priority::Important,
    },
    StyleProperty {
        name: "border-radius",
        value: "8px",
        priority: Priority::Important,
    },
    StyleProperty {
        name: "box-shadow",
        value: "0 4px 12px rgba(6, 182, 212, 0.3)",
        priority: Priority::Important,
    },
    StyleProperty {
        name: "font-weight",
        value: "600",
        priority: Priority::Important,
    },
    StyleProperty {
        name: "transition",
        value: "all 0.2s ease",
        priority: Priority::Important,
    },
];

/// Whether an element is truly a quiz action button.
///
/// The marker selector is class-only, so a `div` carrying the class
/// still matches it; this second discriminator keeps the enforcer off
/// anything that is not a button-like element.
pub fn is_action_button(doc: &Document, id: NodeId) -> bool {
    match doc.tag_name(id) {
        Some("button") => true,
        Some("input") => doc
            .attribute(id, "type")
            .is_some_and(|t| INPUT_TYPES.iter().any(|allowed| t.eq_ignore_ascii_case(allowed))),
        _ => false,
    }
}

/// Document-wide style enforcement.
///
/// One instance owns its parsed selectors and nothing else; installing
/// it arms an observer and a timer on the given runtime, so multiple
/// independent installations (even of the same instance) coexist
/// without interference.
#[derive(Clone)]
pub struct StyleEnforcer {
    targets: Vec<Selector<QuizSelectors>>,
    text_targets: Vec<Selector<QuizSelectors>>,
}

impl StyleEnforcer {
    /// Parse the target selectors.
    pub fn new() -> Result<Self> {
        Ok(Self {
            targets: parse_selector_list(MARKER_SELECTOR)?,
            text_targets: parse_selector_list(TEXT_SELECTOR)?,
        })
    }

    /// Run one enforcement pass.
    ///
    /// Selects candidates fresh from the live tree, drops those failing
    /// the element-kind re-check, rewrites every declared property at
    /// `!important`, then forces the text color onto text-bearing
    /// descendants. Zero matches is the steady state between renders,
    /// not an error.
    pub fn apply_pass(&self, doc: &mut Document) {
        let candidates = doc.select(&self.targets);
        for id in candidates {
            if !is_action_button(doc, id) {
                continue;
            }
            doc.apply_style_properties(id, BUTTON_STYLE);

            for text in doc.select_in(id, &self.text_targets) {
                let mut style = doc.inline_style(text);
                style.set("color", TEXT_COLOR, Priority::Important);
                doc.set_inline_style(text, &style);
            }
        }
    }

    /// Run an immediate pass, then arm continuous reassertion.
    ///
    /// The observer watches child-list changes, the subtree, and `class`
    /// attribute writes under the body (or the document root when no
    /// body exists). The timer re-runs the pass every
    /// [`REASSERT_INTERVAL_MS`] regardless of mutation activity.
    /// Repeated installs stack redundant observers and timers; they are
    /// not deduplicated.
    pub fn install(&self, doc: &mut Document, rt: &mut Runtime) -> TeardownHandle {
        self.apply_pass(doc);

        let root = doc.body().unwrap_or(doc.document());

        let by_mutation = self.clone();
        let observer = rt.observe(
            root,
            ObserveOptions {
                child_list: true,
                subtree: true,
                attributes: true,
                attribute_filter: vec!["class".to_string()],
            },
            Box::new(move |doc, _records| by_mutation.apply_pass(doc)),
        );

        let by_timer = self.clone();
        let timer = rt.set_interval(
            REASSERT_INTERVAL_MS,
            Box::new(move |doc| by_timer.apply_pass(doc)),
        );

        TeardownHandle { observer, timer }
    }
}

/// Stops the continuous reassertion armed by [`StyleEnforcer::install`].
#[derive(Debug)]
pub struct TeardownHandle {
    observer: ObserverId,
    timer: TimerId,
}

impl TeardownHandle {
    /// Disconnect the observer and clear the interval.
    ///
    /// Only future enforcement stops; inline styles already written to
    /// matched elements stay on them.
    pub fn dispose(self, rt: &mut Runtime) {
        rt.disconnect(self.observer);
        rt.clear_interval(self.timer);
    }
}

/// Self-activation for the standalone enforcer.
///
/// Installs immediately when the document is past loading and returns
/// the teardown handle. On a still-loading document the installation is
/// deferred until [`Runtime::complete_load`] fires, and `None` is
/// returned; a deferred installation is never disposed.
pub fn activate(doc: &mut Document, rt: &mut Runtime) -> Result<Option<TeardownHandle>> {
    let enforcer = StyleEnforcer::new()?;
    if doc.ready_state() == ReadyState::Complete {
        return Ok(Some(enforcer.install(doc, rt)));
    }
    rt.schedule_on_load(Box::new(move |doc, rt| {
        enforcer.install(doc, rt);
    }));
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_defensive_recheck() {
        let doc = parse_html(
            r#"<button class="quiz-action-button">A</button>
               <input type="button" class="quiz-action-button">
               <input type="submit" class="quiz-action-button">
               <input type="text" class="quiz-action-button">
               <div class="quiz-action-button">B</div>"#,
        );

        let kinds: Vec<bool> = doc
            .query_selector_all(MARKER_SELECTOR)
            .unwrap()
            .into_iter()
            .map(|id| is_action_button(&doc, id))
            .collect();
        assert_eq!(kinds, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_input_type_is_case_insensitive() {
        let doc = parse_html(r#"<input type="BUTTON" class="quiz-action-button">"#);
        let input = doc.find_by_tag("input").unwrap();
        assert!(is_action_button(&doc, input));
    }

    #[test]
    fn test_pass_preserves_unrelated_properties() {
        let mut doc = parse_html(r#"<button class="quiz-action-button" style="width: 42px">Go</button>"#);
        let enforcer = StyleEnforcer::new().unwrap();
        enforcer.apply_pass(&mut doc);

        let button = doc.find_by_tag("button").unwrap();
        let style = doc.inline_style(button);
        assert_eq!(style.get("width").unwrap().value, "42px");
        assert_eq!(style.get("width").unwrap().priority, Priority::Normal);
        assert_eq!(
            style.get("background").unwrap().priority,
            Priority::Important
        );
    }

    #[test]
    fn test_install_without_body_is_a_noop_pass() {
        let mut doc = Document::new();
        let mut rt = Runtime::new();
        let enforcer = StyleEnforcer::new().unwrap();
        // Zero matches, no body: install still arms both triggers.
        let handle = enforcer.install(&mut doc, &mut rt);
        assert_eq!(rt.observer_count(), 1);
        assert_eq!(rt.interval_count(), 1);
        handle.dispose(&mut rt);
        assert_eq!(rt.observer_count(), 0);
        assert_eq!(rt.interval_count(), 0);
    }
}
