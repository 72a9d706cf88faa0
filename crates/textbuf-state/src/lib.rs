//! Thread-safe handle around [`textbuf_core::text::TextBuffer`].

pub mod shared;

pub use shared::SharedTextBuffer;
