//! Mapping of translated signatures onto libchrome/libchromeos C++ types

use super::types::{ScalarKind, TypeNode};

/// How a value of a type is passed as an input parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPolicy {
    ByValue,
    ConstRef,
}

/// A C++ type expression plus its pass policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CppType {
    pub expr: String,
    pub pass: PassPolicy,
}

impl CppType {
    fn by_value(expr: &str) -> Self {
        Self {
            expr: expr.to_string(),
            pass: PassPolicy::ByValue,
        }
    }

    fn by_ref(expr: String) -> Self {
        Self {
            expr,
            pass: PassPolicy::ConstRef,
        }
    }

    /// Spelling as an input parameter
    pub fn in_param(&self) -> String {
        match self.pass {
            PassPolicy::ByValue => self.expr.clone(),
            PassPolicy::ConstRef => format!("const {}&", self.expr),
        }
    }

    /// Spelling as an output parameter
    pub fn out_param(&self) -> String {
        format!("{}*", self.expr)
    }
}

pub fn scalar_type(kind: ScalarKind) -> CppType {
    match kind {
        ScalarKind::Boolean => CppType::by_value("bool"),
        ScalarKind::Byte => CppType::by_value("uint8_t"),
        ScalarKind::Int16 => CppType::by_value("int16_t"),
        ScalarKind::UInt16 => CppType::by_value("uint16_t"),
        ScalarKind::Int32 => CppType::by_value("int32_t"),
        ScalarKind::UInt32 => CppType::by_value("uint32_t"),
        ScalarKind::Int64 => CppType::by_value("int64_t"),
        ScalarKind::UInt64 => CppType::by_value("uint64_t"),
        ScalarKind::Double => CppType::by_value("double"),
        ScalarKind::String | ScalarKind::Signature => CppType::by_ref("std::string".to_string()),
        ScalarKind::ObjectPath => CppType::by_ref("dbus::ObjectPath".to_string()),
        ScalarKind::UnixFd => CppType::by_ref("dbus::FileDescriptor".to_string()),
    }
}

/// Map a type tree onto its C++ type
pub fn cpp_type(node: &TypeNode) -> CppType {
    match node {
        TypeNode::Scalar(kind) => scalar_type(*kind),
        TypeNode::Dynamic => CppType::by_ref("chromeos::Any".to_string()),
        TypeNode::Sequence(element) => {
            CppType::by_ref(format!("std::vector<{}>", cpp_type(element).expr))
        }
        TypeNode::Aggregate(fields) => {
            let members: Vec<String> = fields.iter().map(|f| cpp_type(f).expr).collect();
            CppType::by_ref(format!("std::tuple<{}>", members.join(", ")))
        }
        TypeNode::Association { key, value } => {
            if **key == TypeNode::Scalar(ScalarKind::String) && **value == TypeNode::Dynamic {
                CppType::by_ref("chromeos::VariantDictionary".to_string())
            } else {
                CppType::by_ref(format!(
                    "std::map<{}, {}>",
                    cpp_type(key).expr,
                    cpp_type(value).expr
                ))
            }
        }
    }
}
