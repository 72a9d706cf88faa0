//! A line-oriented text buffer addressed by index expressions.
//!
//! - [`text::TextBuffer`] owns the lines, named marks and undo history.
//! - [`index`] parses expressions such as `"2.end"`, `"insert -3c"` or
//!   `"1.4 wordstart"` into [`position::Position`]s.
//! - [`history::EditLog`] batches adjacent edits so that a run of typing or
//!   backspacing is undone in one step.

pub mod config;
pub mod enums;
pub mod errors;
pub mod history;
pub mod index;
pub mod lines;
pub mod marks;
pub mod position;
pub mod text;

pub use config::BufferConfig;
pub use enums::{EditOp, Gravity};
pub use errors::{TextBufferError, TextBufferResult};
pub use position::Position;
pub use text::TextBuffer;
