//! # Inline Kinds
//!
//! Inline constructs that own their syntax: code spans (handled by the
//! parser directly) and the core `*`/`_` emphasis delimiters, which are
//! registered like any extension delimiter.

pub mod code_span;
pub mod emphasis;

pub use code_span::CodeSpan;
pub use emphasis::Emphasis;
