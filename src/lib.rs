//! D-Bus binding generator for libchrome/libchromeos
//!
//! Reads a D-Bus introspection document and emits C++ headers: a server-side
//! adaptor, a client-side proxy and a header of member-name constants.

pub mod codegen;
pub mod error;
pub mod interface;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod signature;

use std::fs;
use std::path::Path;

use tracing::debug;

// Re-export main types
pub use codegen::{AdaptorGenerator, HeaderGenerator, MethodNameGenerator, ProxyGenerator};
pub use error::*;
pub use interface::{Argument, Interface, Method, Property, PropertyAccess, Signal};
pub use lexer::SimpleLexer;
pub use parser::Parser;
pub use signature::{parse_signature, translate, CppType, TypeNode};

/// Parse introspection document text into an interface
pub fn parse_interface(input: &str) -> Result<Interface, BindingsError> {
    let tokens = SimpleLexer::new(input.to_string()).tokenize()?;
    debug!(tokens = tokens.len(), "tokenized introspection document");
    let interface = Parser::new(tokens).parse()?;
    Ok(interface)
}

/// Read and parse the introspection document at `path`
pub fn parse_interface_file(path: &Path) -> Result<Interface, BindingsError> {
    let input = fs::read_to_string(path).map_err(|e| BindingsError::io(path, e))?;
    parse_interface(&input)
}
