//! Arena-based HTML document.
//!
//! The document is an arena-allocated tree that html5ever parses into.
//! Unlike a static parse tree, this document is live: attribute and
//! child-list mutations are first-class operations, and every mutation
//! appends a [`MutationRecord`] to a pending queue that the runtime
//! delivers to registered observers.

mod element_ref;
mod serialize;
mod tree_sink;

use std::collections::VecDeque;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, QualName, namespace_url, ns};

use crate::style::{InlineStyle, StyleProperty};

pub use element_ref::{ElementRef, QuizSelectors, parse_selector_list};
pub use tree_sink::{DocumentSink, NodeHandle};

/// Unique identifier for a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the document arena.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast matching.
        id: Option<String>,
        /// Pre-extracted classes for fast matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment (ignored but needed for parsing).
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the document arena.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// What kind of change a mutation record describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from the target.
    ChildList,
    /// An attribute on the target was set or removed.
    Attributes { name: String },
}

/// One recorded DOM change, queued until the runtime delivers it.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

/// Document load phase.
///
/// Parsed documents start out `Complete`; documents built node by node
/// start `Loading` until [`Runtime::complete_load`](crate::Runtime::complete_load)
/// flips them over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    Loading,
    #[default]
    Complete,
}

/// Live HTML document backed by an arena.
///
/// All nodes are stored in a contiguous vector for cache-friendly
/// traversal. Parent/child/sibling links use indices into this vector.
pub struct Document {
    nodes: Vec<Node>,
    document: NodeId,
    ready_state: ReadyState,
    hovered: Option<NodeId>,
    pending: VecDeque<MutationRecord>,
}

/// Parse an HTML document from text.
///
/// Parsing is lenient in the manner of browsers; the result is always a
/// document, possibly with an html/head/body skeleton synthesized around
/// fragment input. The returned document is `Complete`.
pub fn parse_html(html: &str) -> Document {
    let sink = DocumentSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    result.into_document()
}

impl Document {
    /// Create a new empty document with only a document root.
    ///
    /// The document starts in the `Loading` state.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
            ready_state: ReadyState::Loading,
            hovered: None,
            pending: VecDeque::new(),
        };
        doc.document = doc.alloc(Node::new(NodeData::Document));
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Get the current load phase.
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub(crate) fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document is empty (only has the document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    /// Create a new element node (not yet attached to the tree).
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        // Pre-extract id and class for fast CSS matching
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            if attr.name.local.as_ref() == "id" {
                id = Some(attr.value.clone());
            } else if attr.name.local.as_ref() == "class" {
                classes = attr
                    .value
                    .split_whitespace()
                    .map(|s| s.to_string())
                    .collect();
            }
        }

        self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Create an element by tag name with no attributes.
    pub fn create_named_element(&mut self, tag: &str) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        self.create_element(name, Vec::new())
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype { name }))
    }

    // ========================================================================
    // Tree mutation
    // ========================================================================

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some() {
            if let Some(last_node) = self.get_mut(last_child) {
                last_node.next_sibling = child;
            }
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }

        self.record(parent, MutationKind::ChildList);
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(NodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }

        self.record(parent, MutationKind::ChildList);
    }

    /// Detach a node from its parent, leaving it allocated but unlinked.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if parent.is_some() {
            if let Some(p) = self.get_mut(parent) {
                p.first_child = next;
            }
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if parent.is_some() {
            if let Some(p) = self.get_mut(parent) {
                p.last_child = prev;
            }
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }

        if parent.is_some() {
            self.record(parent, MutationKind::ChildList);
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child) {
            if let NodeData::Text(ref mut existing) = last.data {
                existing.push_str(text);
                return;
            }
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Set an attribute, keeping the id/class caches coherent.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.get_mut(id) else { return };
        let NodeData::Element {
            attrs,
            id: elem_id,
            classes,
            ..
        } = &mut node.data
        else {
            return;
        };

        match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: value.to_string(),
            }),
        }

        if name == "class" {
            *classes = value.split_whitespace().map(|s| s.to_string()).collect();
        } else if name == "id" {
            *elem_id = Some(value.to_string());
        }

        self.record(
            id,
            MutationKind::Attributes {
                name: name.to_string(),
            },
        );
    }

    /// Remove an attribute, keeping the id/class caches coherent.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(node) = self.get_mut(id) else { return };
        let NodeData::Element {
            attrs,
            id: elem_id,
            classes,
            ..
        } = &mut node.data
        else {
            return;
        };

        let before = attrs.len();
        attrs.retain(|a| a.name.local.as_ref() != name);
        if attrs.len() == before {
            return;
        }

        if name == "class" {
            classes.clear();
        } else if name == "id" {
            *elem_id = None;
        }

        self.record(
            id,
            MutationKind::Attributes {
                name: name.to_string(),
            },
        );
    }

    fn record(&mut self, target: NodeId, kind: MutationKind) {
        self.pending.push_back(MutationRecord { target, kind });
    }

    /// Drain the pending mutation queue.
    pub(crate) fn take_mutation_records(&mut self) -> Vec<MutationRecord> {
        self.pending.drain(..).collect()
    }

    /// Number of mutation records awaiting delivery.
    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    // ========================================================================
    // Inline styles
    // ========================================================================

    /// Parse the element's current `style` attribute.
    ///
    /// Returns an empty style for non-elements and elements with no
    /// `style` attribute.
    pub fn inline_style(&self, id: NodeId) -> InlineStyle {
        self.attribute(id, "style")
            .map(InlineStyle::parse)
            .unwrap_or_default()
    }

    /// Serialize a style back onto the element's `style` attribute.
    ///
    /// This is an attribute write like any other and emits an
    /// `Attributes { name: "style" }` mutation record.
    pub fn set_inline_style(&mut self, id: NodeId, style: &InlineStyle) {
        self.set_attribute(id, "style", &style.to_css());
    }

    /// Merge a fixed property record into the element's inline style,
    /// unconditionally overwriting prior values for those properties.
    /// Unrelated inline properties are preserved.
    pub fn apply_style_properties(&mut self, id: NodeId, props: &[StyleProperty]) {
        if !self.is_element(id) {
            return;
        }
        let mut style = self.inline_style(id);
        for prop in props {
            style.set(prop.name, prop.value, prop.priority);
        }
        self.set_inline_style(id, &style);
    }

    // ========================================================================
    // Hover state
    // ========================================================================

    /// The element the pointer currently rests on, if any.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub(crate) fn set_hovered(&mut self, id: Option<NodeId>) {
        self.hovered = id;
    }

    /// Whether `id` is the hovered element or one of its ancestors.
    pub fn hover_contains(&self, id: NodeId) -> bool {
        let mut current = match self.hovered {
            Some(h) => h,
            None => return false,
        };
        loop {
            if current == id {
                return true;
            }
            current = match self.get(current) {
                Some(n) if n.parent.is_some() => n.parent,
                _ => return false,
            };
        }
    }

    // ========================================================================
    // Traversal and queries
    // ========================================================================

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildrenIter {
            doc: self,
            current: first,
        }
    }

    /// Whether `node` is a descendant of `ancestor` (or the node itself).
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = match self.get(current) {
                Some(n) => n.parent,
                None => return false,
            };
        }
        false
    }

    /// All element nodes strictly below `root`, in document order.
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = {
            let mut children: Vec<_> = self.children(root).collect();
            children.reverse();
            children
        };
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Find the first node matching a predicate (DFS).
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| {
            if let NodeData::Element { name, .. } = &node.data {
                name.local.as_ref() == tag
            } else {
                false
            }
        })
    }

    /// The document's `body` element, if one exists.
    pub fn body(&self) -> Option<NodeId> {
        self.find_by_tag("body")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl<'a> Iterator for ChildrenIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .doc
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Convenience methods for element nodes.
impl Document {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's tag name as a plain string.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element_name(id).map(|n| n.as_ref())
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn attribute(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: NodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Priority;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    #[test]
    fn test_create_elements() {
        let mut doc = Document::new();

        let button = doc.create_element(
            make_qname("button"),
            vec![Attribute {
                name: make_qname("class"),
                value: "quiz-action-button".to_string(),
            }],
        );

        doc.append(doc.document(), button);

        assert_eq!(doc.tag_name(button), Some("button"));
        assert_eq!(
            doc.element_classes(button),
            &["quiz-action-button".to_string()]
        );
    }

    #[test]
    fn test_append_children() {
        let mut doc = Document::new();

        let parent = doc.create_named_element("div");
        let child1 = doc.create_named_element("p");
        let child2 = doc.create_named_element("p");

        doc.append(doc.document(), parent);
        doc.append(parent, child1);
        doc.append(parent, child2);

        let children: Vec<_> = doc.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
    }

    #[test]
    fn test_set_attribute_updates_class_cache() {
        let mut doc = Document::new();
        let div = doc.create_named_element("div");
        doc.append(doc.document(), div);

        doc.set_attribute(div, "class", "a b");
        assert_eq!(doc.element_classes(div), &["a".to_string(), "b".to_string()]);

        doc.remove_attribute(div, "class");
        assert!(doc.element_classes(div).is_empty());
    }

    #[test]
    fn test_mutations_are_recorded() {
        let mut doc = Document::new();
        let div = doc.create_named_element("div");
        doc.append(doc.document(), div);
        doc.set_attribute(div, "class", "x");
        doc.detach(div);

        let records = doc.take_mutation_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, MutationKind::ChildList);
        assert_eq!(
            records[1].kind,
            MutationKind::Attributes {
                name: "class".to_string()
            }
        );
        assert_eq!(records[2].kind, MutationKind::ChildList);
        assert!(doc.take_mutation_records().is_empty());
    }

    #[test]
    fn test_inline_style_round_trip() {
        let mut doc = Document::new();
        let button = doc.create_named_element("button");
        doc.append(doc.document(), button);

        let mut style = doc.inline_style(button);
        assert!(style.is_empty());
        style.set("color", "#ffffff", Priority::Important);
        doc.set_inline_style(button, &style);

        let read_back = doc.inline_style(button);
        let decl = read_back.get("color").unwrap();
        assert_eq!(decl.value, "#ffffff");
        assert_eq!(decl.priority, Priority::Important);
    }

    #[test]
    fn test_parse_html_builds_skeleton() {
        let doc = parse_html(r#"<button class="quiz-action-button">Go</button>"#);
        assert_eq!(doc.ready_state(), ReadyState::Complete);
        assert!(doc.body().is_some());
        // Parsing must not leave mutation records behind.
        assert_eq!(doc.pending_mutations(), 0);

        let button = doc.find_by_tag("button").unwrap();
        let text = doc.children(button).next().unwrap();
        assert_eq!(doc.text_content(text), Some("Go"));
    }

    #[test]
    fn test_hover_chain() {
        let mut doc = Document::new();
        let div = doc.create_named_element("div");
        let button = doc.create_named_element("button");
        doc.append(doc.document(), div);
        doc.append(div, button);

        doc.set_hovered(Some(button));
        assert!(doc.hover_contains(button));
        assert!(doc.hover_contains(div));

        doc.set_hovered(None);
        assert!(!doc.hover_contains(button));
    }
}
