pub mod block_quote;
pub mod code_fence;
pub mod heading;
pub mod html_block;
pub mod indented_code;
pub mod list;
pub mod paragraph;
pub mod thematic_break;

pub use block_quote::BlockQuote;
pub use code_fence::CodeFence;
pub use heading::Heading;
pub use html_block::HtmlBlock;
pub use indented_code::IndentedCode;
pub use list::{List, ListMarker, MarkerScanner};
pub use paragraph::Paragraph;
pub use thematic_break::ThematicBreak;
