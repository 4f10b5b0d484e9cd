//! # quizstyle
//!
//! A small library that forces a fixed visual style onto "quiz action"
//! buttons in an HTML document and keeps re-asserting it against
//! competing style writers.
//!
//! ## Features
//!
//! - Arena-allocated DOM parsed with html5ever, with attribute and
//!   child-list mutations that emit mutation records
//! - CSS selector matching via the `selectors` crate (including `:hover`)
//! - Inline-style model with per-property `!important` priority
//! - [`StyleEnforcer`]: document-wide enforcement re-applied on DOM
//!   mutations and on a 1000 ms timer backstop
//! - [`ActionButtonHook`]: single-element variant with hover toggling
//!
//! ## Quick Start
//!
//! ```
//! use quizstyle::{parse_html, Runtime, StyleEnforcer};
//!
//! let mut doc = parse_html(r#"<button class="quiz-action-button">Go</button>"#);
//! let mut rt = Runtime::new();
//!
//! let enforcer = StyleEnforcer::new().unwrap();
//! let handle = enforcer.install(&mut doc, &mut rt);
//!
//! let button = doc.find_by_tag("button").unwrap();
//! assert!(doc.inline_style(button).get("background").is_some());
//!
//! // Another script overwrites the background; the timer restores it.
//! doc.set_attribute(button, "style", "background: red");
//! rt.advance(&mut doc, 1000);
//! assert_ne!(doc.inline_style(button).get("background").unwrap().value, "red");
//!
//! handle.dispose(&mut rt);
//! ```

pub mod dom;
pub mod enforce;
pub mod error;
pub mod hook;
pub mod runtime;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::{Document, MutationKind, MutationRecord, NodeId, ReadyState, parse_html};
pub use enforce::{StyleEnforcer, TeardownHandle, activate};
pub use error::{Error, Result};
pub use hook::ActionButtonHook;
pub use runtime::{EventKind, ObserveOptions, Runtime};
pub use style::{InlineStyle, Priority, StyleProperty};
