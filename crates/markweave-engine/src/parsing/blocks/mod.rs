//! # Block Parsing
//!
//! The first of the two parsing phases. Lines are pushed one at a time into
//! a [`BlockBuilder`], which keeps the chain of open blocks from the document
//! down to the current tip.
//!
//! For each line the builder:
//!
//! 1. walks down the open blocks, letting each consume its continuation
//!    marker (`>` for quotes, indentation for list items and code);
//! 2. closes what did not match, unless the line is a lazy paragraph
//!    continuation;
//! 3. tries the registered openers for the first non-space character until
//!    a leaf opens or nothing matches;
//! 4. appends the rest of the line to the tip.
//!
//! ## Modules
//!
//! - **`builder`**: the line state machine and the cursor API openers use
//! - **`kinds`**: one type per block kind with its open/continue/finalize hooks
//! - **`open`**: the core opener table
//! - **`ledger`**: content-to-source offset mapping for leaf blocks

pub mod builder;
pub mod kinds;
pub mod ledger;
pub mod open;

pub use builder::{BlockBuilder, CODE_INDENT, Continuation};
pub use ledger::PositionLedger;
