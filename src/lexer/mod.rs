//! Tokenizer for D-Bus introspection XML

pub mod simple;
pub mod tokens;

pub use simple::SimpleLexer;
pub use tokens::{Tag, Token};
