//! Single-threaded cooperative runtime.
//!
//! Stands in for the browser event loop: interval timers, mutation
//! observers, and event listeners all live here, and their callbacks run
//! strictly sequentially on a virtual clock. Nothing in this module
//! blocks; [`Runtime::advance`] runs every callback due within the given
//! window to completion, delivering pending mutation records between
//! callbacks, then settles the clock.

use crate::dom::{Document, MutationKind, MutationRecord, NodeId, ReadyState};

/// Handle to a registered interval timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

/// Handle to a registered mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

/// Handle to a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Events the runtime can dispatch to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PointerEnter,
    PointerLeave,
}

/// What a mutation observer is interested in.
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    /// Deliver child-list records for the root (and subtree, if set).
    pub child_list: bool,
    /// Extend observation to all descendants of the root.
    pub subtree: bool,
    /// Deliver attribute records.
    pub attributes: bool,
    /// When non-empty, only attribute records whose name is in this list
    /// are delivered.
    pub attribute_filter: Vec<String>,
}

impl ObserveOptions {
    fn accepts(&self, doc: &Document, root: NodeId, record: &MutationRecord) -> bool {
        let in_scope =
            record.target == root || (self.subtree && doc.contains(root, record.target));
        if !in_scope {
            return false;
        }
        match &record.kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attributes { name } => {
                self.attributes
                    && (self.attribute_filter.is_empty()
                        || self
                            .attribute_filter
                            .iter()
                            .any(|f| f.eq_ignore_ascii_case(name)))
            }
        }
    }
}

type TimerCallback = Box<dyn FnMut(&mut Document)>;
type ObserverCallback = Box<dyn FnMut(&mut Document, &[MutationRecord])>;
type EventCallback = Box<dyn FnMut(&mut Document, NodeId)>;
type LoadCallback = Box<dyn FnOnce(&mut Document, &mut Runtime)>;

struct Timer {
    id: TimerId,
    period_ms: u64,
    next_fire: u64,
    callback: Option<TimerCallback>,
}

struct Observer {
    id: ObserverId,
    root: NodeId,
    options: ObserveOptions,
    callback: Option<ObserverCallback>,
}

struct Listener {
    id: ListenerId,
    target: NodeId,
    kind: EventKind,
    callback: Option<EventCallback>,
}

/// Observer callbacks that mutate their own observed set could otherwise
/// spin the delivery loop forever; delivery stops after this many rounds
/// per drain point and leftover records wait for the next one.
const MAX_DELIVERY_ROUNDS: usize = 8;

/// The cooperative scheduler driving a [`Document`].
pub struct Runtime {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer>,
    observers: Vec<Observer>,
    listeners: Vec<Listener>,
    on_load: Vec<LoadCallback>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: Vec::new(),
            observers: Vec::new(),
            listeners: Vec::new(),
            on_load: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    fn bump_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // ========================================================================
    // Interval timers
    // ========================================================================

    /// Register a callback to fire every `period_ms` milliseconds.
    pub fn set_interval(&mut self, period_ms: u64, callback: TimerCallback) -> TimerId {
        let period_ms = period_ms.max(1);
        let id = TimerId(self.bump_id());
        self.timers.push(Timer {
            id,
            period_ms,
            next_fire: self.now_ms + period_ms,
            callback: Some(callback),
        });
        id
    }

    /// Stop an interval timer; returns whether it existed.
    pub fn clear_interval(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Number of live interval timers.
    pub fn interval_count(&self) -> usize {
        self.timers.len()
    }

    // ========================================================================
    // Mutation observers
    // ========================================================================

    /// Observe mutations under `root`, delivering matching record batches
    /// to `callback`.
    pub fn observe(
        &mut self,
        root: NodeId,
        options: ObserveOptions,
        callback: ObserverCallback,
    ) -> ObserverId {
        let id = ObserverId(self.bump_id());
        self.observers.push(Observer {
            id,
            root,
            options,
            callback: Some(callback),
        });
        id
    }

    /// Disconnect an observer; returns whether it existed.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ========================================================================
    // Event listeners
    // ========================================================================

    /// Listen for `kind` events dispatched to `target`.
    pub fn add_event_listener(
        &mut self,
        target: NodeId,
        kind: EventKind,
        callback: EventCallback,
    ) -> ListenerId {
        let id = ListenerId(self.bump_id());
        self.listeners.push(Listener {
            id,
            target,
            kind,
            callback: Some(callback),
        });
        id
    }

    /// Remove a listener; returns whether it existed.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Dispatch an event to every listener registered for it, then
    /// deliver any mutations the listeners produced.
    ///
    /// Pointer events maintain the document's hover state before
    /// listeners run.
    pub fn dispatch(&mut self, doc: &mut Document, target: NodeId, kind: EventKind) {
        match kind {
            EventKind::PointerEnter => doc.set_hovered(Some(target)),
            EventKind::PointerLeave => {
                if doc.hovered() == Some(target) {
                    doc.set_hovered(None);
                }
            }
        }

        let due: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .map(|l| l.id)
            .collect();

        for id in due {
            let Some(pos) = self.listeners.iter().position(|l| l.id == id) else {
                continue;
            };
            let mut callback = self.listeners[pos].callback.take();
            if let Some(f) = callback.as_mut() {
                f(doc, target);
            }
            if let Some(slot) = self.listeners.iter_mut().find(|l| l.id == id) {
                slot.callback = callback;
            }
        }

        self.deliver_mutations(doc);
    }

    // ========================================================================
    // Load hooks
    // ========================================================================

    /// Run `hook` when the document finishes loading.
    pub fn schedule_on_load(&mut self, hook: LoadCallback) {
        self.on_load.push(hook);
    }

    /// Mark the document loaded and run any deferred load hooks.
    pub fn complete_load(&mut self, doc: &mut Document) {
        doc.set_ready_state(ReadyState::Complete);
        let hooks = std::mem::take(&mut self.on_load);
        for hook in hooks {
            hook(doc, self);
        }
        self.deliver_mutations(doc);
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Deliver pending mutation records without advancing time.
    pub fn drain(&mut self, doc: &mut Document) {
        self.deliver_mutations(doc);
    }

    /// Advance the virtual clock by `ms`, firing every due timer in
    /// fire-time order (registration order on ties) and delivering
    /// mutation batches between callbacks.
    pub fn advance(&mut self, doc: &mut Document, ms: u64) {
        let deadline = self.now_ms.saturating_add(ms);
        self.deliver_mutations(doc);

        loop {
            let due = self
                .timers
                .iter()
                .filter(|t| t.next_fire <= deadline)
                .min_by_key(|t| (t.next_fire, t.id.0))
                .map(|t| t.id);
            let Some(id) = due else { break };

            let Some(pos) = self.timers.iter().position(|t| t.id == id) else {
                break;
            };
            let fire_at = self.timers[pos].next_fire;
            self.now_ms = self.now_ms.max(fire_at);
            self.timers[pos].next_fire = fire_at + self.timers[pos].period_ms;

            let mut callback = self.timers[pos].callback.take();
            if let Some(f) = callback.as_mut() {
                f(doc);
            }
            if let Some(slot) = self.timers.iter_mut().find(|t| t.id == id) {
                slot.callback = callback;
            }

            self.deliver_mutations(doc);
        }

        self.now_ms = deadline;
        self.deliver_mutations(doc);
    }

    fn deliver_mutations(&mut self, doc: &mut Document) {
        for _ in 0..MAX_DELIVERY_ROUNDS {
            let records = doc.take_mutation_records();
            if records.is_empty() {
                return;
            }

            let ids: Vec<ObserverId> = self.observers.iter().map(|o| o.id).collect();
            for id in ids {
                let Some(pos) = self.observers.iter().position(|o| o.id == id) else {
                    continue;
                };
                let matched: Vec<MutationRecord> = {
                    let obs = &self.observers[pos];
                    records
                        .iter()
                        .filter(|r| obs.options.accepts(doc, obs.root, r))
                        .cloned()
                        .collect()
                };
                if matched.is_empty() {
                    continue;
                }

                let mut callback = self.observers[pos].callback.take();
                if let Some(f) = callback.as_mut() {
                    f(doc, &matched);
                }
                if let Some(slot) = self.observers.iter_mut().find(|o| o.id == id) {
                    slot.callback = callback;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_interval_fires_on_schedule() {
        let mut doc = parse_html("<p>x</p>");
        let mut rt = Runtime::new();

        let p = doc.find_by_tag("p").unwrap();
        rt.set_interval(
            1000,
            Box::new(move |d| {
                let count: u64 = d
                    .attribute(p, "data-ticks")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                d.set_attribute(p, "data-ticks", &(count + 1).to_string());
            }),
        );

        rt.advance(&mut doc, 999);
        assert_eq!(doc.attribute(p, "data-ticks"), None);

        rt.advance(&mut doc, 1);
        assert_eq!(doc.attribute(p, "data-ticks"), Some("1"));

        rt.advance(&mut doc, 3000);
        assert_eq!(doc.attribute(p, "data-ticks"), Some("4"));
    }

    #[test]
    fn test_clear_interval_stops_firing() {
        let mut doc = parse_html("<p>x</p>");
        let mut rt = Runtime::new();
        let p = doc.find_by_tag("p").unwrap();

        let timer = rt.set_interval(
            100,
            Box::new(move |d| d.set_attribute(p, "data-fired", "yes")),
        );
        assert!(rt.clear_interval(timer));
        assert!(!rt.clear_interval(timer));

        rt.advance(&mut doc, 1000);
        assert_eq!(doc.attribute(p, "data-fired"), None);
    }

    #[test]
    fn test_observer_respects_attribute_filter() {
        let mut doc = parse_html("<div><button>Go</button></div>");
        let mut rt = Runtime::new();
        let body = doc.body().unwrap();
        let button = doc.find_by_tag("button").unwrap();

        rt.observe(
            body,
            ObserveOptions {
                child_list: true,
                subtree: true,
                attributes: true,
                attribute_filter: vec!["class".to_string()],
            },
            Box::new(move |d, records| {
                let count: u64 = d
                    .attribute(button, "data-batches")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                assert!(!records.is_empty());
                d.set_attribute(button, "data-batches", &(count + 1).to_string());
            }),
        );

        // A style write does not pass the class filter.
        doc.set_attribute(button, "style", "background: red");
        rt.drain(&mut doc);
        assert_eq!(doc.attribute(button, "data-batches"), None);

        // A class write does.
        doc.set_attribute(button, "class", "quiz-action-button");
        rt.drain(&mut doc);
        assert_eq!(doc.attribute(button, "data-batches"), Some("1"));

        // The observer's own data-batches write was filtered out, so the
        // queue is settled after one round.
        assert_eq!(doc.pending_mutations(), 0);
    }

    #[test]
    fn test_observer_child_list_subtree() {
        let mut doc = parse_html("<div id=\"wrap\"></div>");
        let mut rt = Runtime::new();
        let body = doc.body().unwrap();
        let wrap = doc.find_by_tag("div").unwrap();

        rt.observe(
            body,
            ObserveOptions {
                child_list: true,
                subtree: true,
                ..Default::default()
            },
            Box::new(move |d, _| d.set_attribute(wrap, "data-seen", "yes")),
        );

        let button = doc.create_named_element("button");
        doc.append(wrap, button);
        rt.drain(&mut doc);
        assert_eq!(doc.attribute(wrap, "data-seen"), Some("yes"));
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let mut doc = parse_html("<button>Go</button>");
        let mut rt = Runtime::new();
        let body = doc.body().unwrap();
        let button = doc.find_by_tag("button").unwrap();

        let observer = rt.observe(
            body,
            ObserveOptions {
                child_list: true,
                subtree: true,
                attributes: true,
                attribute_filter: Vec::new(),
            },
            Box::new(move |d, _| d.set_attribute(button, "data-seen", "yes")),
        );
        assert!(rt.disconnect(observer));
        assert!(!rt.disconnect(observer));

        doc.set_attribute(button, "class", "x");
        rt.drain(&mut doc);
        assert_eq!(doc.attribute(button, "data-seen"), None);
    }

    #[test]
    fn test_dispatch_updates_hover_and_runs_listeners() {
        let mut doc = parse_html("<button>Go</button>");
        let mut rt = Runtime::new();
        let button = doc.find_by_tag("button").unwrap();

        let listener = rt.add_event_listener(
            button,
            EventKind::PointerEnter,
            Box::new(|d, target| d.set_attribute(target, "data-entered", "yes")),
        );

        rt.dispatch(&mut doc, button, EventKind::PointerEnter);
        assert_eq!(doc.hovered(), Some(button));
        assert_eq!(doc.attribute(button, "data-entered"), Some("yes"));

        rt.dispatch(&mut doc, button, EventKind::PointerLeave);
        assert_eq!(doc.hovered(), None);

        assert!(rt.remove_event_listener(listener));
        doc.remove_attribute(button, "data-entered");
        rt.dispatch(&mut doc, button, EventKind::PointerEnter);
        assert_eq!(doc.attribute(button, "data-entered"), None);
    }

    #[test]
    fn test_complete_load_runs_deferred_hooks() {
        let mut doc = crate::dom::Document::new();
        let mut rt = Runtime::new();
        assert_eq!(doc.ready_state(), crate::dom::ReadyState::Loading);

        rt.schedule_on_load(Box::new(|d, rt| {
            let note = d.create_named_element("p");
            d.append(d.document(), note);
            rt.set_interval(1000, Box::new(|_| {}));
        }));
        assert_eq!(rt.interval_count(), 0);

        rt.complete_load(&mut doc);
        assert_eq!(doc.ready_state(), crate::dom::ReadyState::Complete);
        assert!(doc.find_by_tag("p").is_some());
        assert_eq!(rt.interval_count(), 1);
    }
}
