//! Typed trees for D-Bus signatures and the scalar code table

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Basic (non-container) D-Bus types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Boolean,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    UnixFd,
}

/// Table entry for a scalar type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarInfo {
    pub code: char,
    pub kind: ScalarKind,
}

const SCALARS: [ScalarInfo; 13] = [
    ScalarInfo { code: 'b', kind: ScalarKind::Boolean },
    ScalarInfo { code: 'y', kind: ScalarKind::Byte },
    ScalarInfo { code: 'n', kind: ScalarKind::Int16 },
    ScalarInfo { code: 'q', kind: ScalarKind::UInt16 },
    ScalarInfo { code: 'i', kind: ScalarKind::Int32 },
    ScalarInfo { code: 'u', kind: ScalarKind::UInt32 },
    ScalarInfo { code: 'x', kind: ScalarKind::Int64 },
    ScalarInfo { code: 't', kind: ScalarKind::UInt64 },
    ScalarInfo { code: 'd', kind: ScalarKind::Double },
    ScalarInfo { code: 's', kind: ScalarKind::String },
    ScalarInfo { code: 'o', kind: ScalarKind::ObjectPath },
    ScalarInfo { code: 'g', kind: ScalarKind::Signature },
    ScalarInfo { code: 'h', kind: ScalarKind::UnixFd },
];

static SCALAR_TABLE: LazyLock<HashMap<char, ScalarInfo>> =
    LazyLock::new(|| SCALARS.iter().map(|info| (info.code, *info)).collect());

/// Type code markers for containers and the variant type
pub const ARRAY: char = 'a';
pub const STRUCT_OPEN: char = '(';
pub const STRUCT_CLOSE: char = ')';
pub const DICT_ENTRY_OPEN: char = '{';
pub const DICT_ENTRY_CLOSE: char = '}';
pub const VARIANT: char = 'v';

/// Look up a scalar by its type code
pub fn lookup_scalar(code: char) -> Option<&'static ScalarInfo> {
    SCALAR_TABLE.get(&code)
}

impl ScalarKind {
    pub fn code(&self) -> char {
        match self {
            ScalarKind::Boolean => 'b',
            ScalarKind::Byte => 'y',
            ScalarKind::Int16 => 'n',
            ScalarKind::UInt16 => 'q',
            ScalarKind::Int32 => 'i',
            ScalarKind::UInt32 => 'u',
            ScalarKind::Int64 => 'x',
            ScalarKind::UInt64 => 't',
            ScalarKind::Double => 'd',
            ScalarKind::String => 's',
            ScalarKind::ObjectPath => 'o',
            ScalarKind::Signature => 'g',
            ScalarKind::UnixFd => 'h',
        }
    }
}

/// A translated D-Bus type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Scalar(ScalarKind),
    /// `a<element>`
    Sequence(Box<TypeNode>),
    /// `(<fields>)`, never empty
    Aggregate(Vec<TypeNode>),
    /// `a{<key><value>}`
    Association {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    /// `v`
    Dynamic,
}

impl TypeNode {
    /// Canonical signature text for this tree
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Scalar(kind) => write!(f, "{}", kind.code()),
            TypeNode::Sequence(element) => write!(f, "{}{}", ARRAY, element),
            TypeNode::Aggregate(fields) => {
                write!(f, "{}", STRUCT_OPEN)?;
                for field in fields {
                    write!(f, "{}", field)?;
                }
                write!(f, "{}", STRUCT_CLOSE)
            }
            TypeNode::Association { key, value } => write!(
                f,
                "{}{}{}{}{}",
                ARRAY, DICT_ENTRY_OPEN, key, value, DICT_ENTRY_CLOSE
            ),
            TypeNode::Dynamic => write!(f, "{}", VARIANT),
        }
    }
}
