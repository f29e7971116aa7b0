//! # Snapshot Testing Support
//!
//! Utilities for looking at a parsed [`Document`](crate::parsing::tree::Document)
//! from tests and from the CLI.
//!
//! ## Modules
//!
//! - **`normalize`**: flattens the tree into a stable, serializable `Snap`,
//!   and renders it as an indented text outline
//! - **`invariants`**: structural checks (spans in bounds, child spans
//!   contained in their parents, content states matching tags)
//!
//! ## Testing Strategy
//!
//! Parsing behavior is pinned down by outline snapshots rather than a
//! separate formal grammar. Outlines show block and inline kinds, payloads
//! and, when position tracking is on, source spans.

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{BlockSnap, InlineSnap, Snap, block_label, inline_label, normalize, outline};
