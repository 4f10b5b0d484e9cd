//! Single-element styling hook.
//!
//! The hook variant of the enforcer: binds one element, applies the
//! same forced style, and swaps gradients on pointer enter/leave.
//! Unmounting removes the listeners but leaves applied styles in place.

use crate::dom::{Document, NodeId};
use crate::enforce::BUTTON_STYLE;
use crate::runtime::{EventKind, ListenerId, Runtime};
use crate::style::{Priority, StyleProperty};

/// Properties swapped in while the pointer rests on the element.
pub const HOVER_STYLE: &[StyleProperty] = &[
    StyleProperty {
        name: "background",
        value: "linear-gradient(135deg, #0891b2 0%, #0e7490 100%)",
        priority: Priority::Important,
    },
    StyleProperty {
        name: "box-shadow",
        value: "0 6px 16px rgba(6, 182, 212, 0.4)",
        priority: Priority::Important,
    },
];

/// The reusable style-value record, for consumers that prefer to apply
/// the declaration themselves instead of mounting the hook.
pub fn style_record() -> &'static [StyleProperty] {
    BUTTON_STYLE
}

/// Forced styling bound to a single element.
pub struct ActionButtonHook {
    node: NodeId,
    enter: ListenerId,
    leave: ListenerId,
}

impl ActionButtonHook {
    /// Apply the forced style to `node` and arm hover toggling.
    pub fn mount(doc: &mut Document, rt: &mut Runtime, node: NodeId) -> Self {
        doc.apply_style_properties(node, BUTTON_STYLE);

        let enter = rt.add_event_listener(
            node,
            EventKind::PointerEnter,
            Box::new(|doc, target| {
                doc.apply_style_properties(target, HOVER_STYLE);
            }),
        );
        let leave = rt.add_event_listener(
            node,
            EventKind::PointerLeave,
            Box::new(|doc, target| {
                doc.apply_style_properties(target, BUTTON_STYLE);
            }),
        );

        Self { node, enter, leave }
    }

    /// The element this hook is bound to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Remove the hover listeners. Styles already applied stay put.
    pub fn unmount(self, rt: &mut Runtime) {
        rt.remove_event_listener(self.enter);
        rt.remove_event_listener(self.leave);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_style_record_matches_enforcer_declaration() {
        let record = style_record();
        assert!(record.iter().any(|p| p.name == "background"));
        assert!(record.iter().all(|p| p.priority == Priority::Important));
    }

    #[test]
    fn test_mount_applies_base_style() {
        let mut doc = parse_html("<button>Go</button>");
        let mut rt = Runtime::new();
        let button = doc.find_by_tag("button").unwrap();

        let hook = ActionButtonHook::mount(&mut doc, &mut rt, button);
        assert_eq!(hook.node(), button);

        let style = doc.inline_style(button);
        assert_eq!(
            style.get("background").unwrap().value,
            "linear-gradient(135deg, #06b6d4 0%, #0891b2 100%)"
        );
        assert_eq!(style.get("font-weight").unwrap().value, "600");
    }
}
