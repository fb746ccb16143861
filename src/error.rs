//! Unified error types for the bindings generator using thiserror

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for generator operations
#[derive(Error, Debug)]
pub enum BindingsError {
    #[error("lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("code generation error: {0}")]
    Codegen(#[from] CodegenError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from tokenizing an introspection document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{found}' at line {line}")]
    UnexpectedChar { found: char, line: usize },

    #[error("unterminated {construct} starting at line {line}")]
    Unterminated { construct: &'static str, line: usize },

    #[error("unknown entity '&{entity};' at line {line}")]
    UnknownEntity { entity: String, line: usize },

    #[error("duplicate attribute '{name}' at line {line}")]
    DuplicateAttribute { name: String, line: usize },
}

/// Errors from building an interface out of the token stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of document")]
    UnexpectedEof,

    #[error("line {line}: expected closing tag </{expected}>, found </{found}>")]
    MismatchedTag {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("line {line}: closing tag </{name}> has no matching opening tag")]
    UnmatchedClosingTag { name: String, line: usize },

    #[error("line {line}: <{element}> is nested more than 64 elements deep")]
    TooDeep { element: String, line: usize },

    #[error("line {line}: <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
        line: usize,
    },

    #[error("line {line}: invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
        line: usize,
    },

    #[error("line {line}: unexpected <{element}> inside <{parent}>")]
    UnexpectedElement {
        element: String,
        parent: String,
        line: usize,
    },

    #[error("document does not declare an interface")]
    NoInterface,

    #[error("line {line}: more than one interface declared ({first} and {second})")]
    MultipleInterfaces {
        first: String,
        second: String,
        line: usize,
    },
}

/// Interface model errors, detected before any generation begins
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("interface name is empty")]
    EmptyInterfaceName,

    #[error("interface name '{name}' has an invalid segment '{segment}'")]
    InvalidInterfaceSegment { name: String, segment: String },

    #[error("{kind} name is empty")]
    EmptyMemberName { kind: &'static str },

    #[error("{kind} name '{name}' is not a valid identifier")]
    InvalidMemberName { kind: &'static str, name: String },

    #[error("duplicate {kind} '{name}'")]
    DuplicateMember { kind: &'static str, name: String },
}

/// Malformed type signature
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid signature \"{signature}\" at offset {offset}: {reason}")]
pub struct SignatureError {
    pub signature: String,
    pub offset: usize,
    pub reason: SignatureErrorKind,
}

/// What went wrong inside a signature
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureErrorKind {
    #[error("signature is empty")]
    Empty,

    #[error("unexpected end of signature")]
    UnexpectedEnd,

    #[error("unknown type code '{0}'")]
    UnknownCode(char),

    #[error("unexpected '{0}'")]
    UnexpectedChar(char),

    #[error("trailing characters after a complete type")]
    TrailingCharacters,

    #[error("struct has no members")]
    EmptyStruct,

    #[error("dictionary entry is only valid directly inside an array")]
    DictEntryOutsideArray,

    #[error("dictionary key must be a basic type")]
    NonBasicDictKey,

    #[error("dictionary entry must hold exactly a key and a value")]
    DictEntryArity,

    #[error("signature is longer than 255 characters")]
    TooLong,

    #[error("more than 32 nested arrays or 32 nested structs")]
    TooDeep,
}

/// Identifier derivation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("{owner}: synthetic name '{name}' for argument {position} collides with an explicit argument name")]
    SyntheticCollision {
        owner: String,
        name: String,
        position: usize,
    },

    #[error("{owner}: argument name '{name}' is used more than once")]
    DuplicateArgument { owner: String, name: String },

    #[error("{scope}: generated symbol '{symbol}' for {owner} collides with {existing}")]
    SymbolCollision {
        scope: String,
        symbol: String,
        owner: String,
        existing: String,
    },

    #[error("{kind} '{name}' is a C++ keyword")]
    ReservedWord { kind: &'static str, name: String },
}

/// Code generation errors
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("{owner}: {source}")]
    Signature {
        owner: String,
        #[source]
        source: SignatureError,
    },

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error("unbalanced scopes: {open} left open")]
    UnbalancedScopes { open: usize },

    #[error("closing a scope that was never opened")]
    ScopeUnderflow,
}

impl BindingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BindingsError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<NamingError> for BindingsError {
    fn from(err: NamingError) -> Self {
        BindingsError::Codegen(CodegenError::Naming(err))
    }
}
