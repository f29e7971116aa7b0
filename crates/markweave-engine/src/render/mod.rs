//! # Rendering
//!
//! Read-only consumers of a parsed [`Document`](crate::parsing::tree::Document).
//! Renderers never change the tree; they only walk it.
//!
//! - **`html`**: CommonMark-style HTML, used to check parser behavior
//!   against expected output

pub mod html;

pub use html::render;
