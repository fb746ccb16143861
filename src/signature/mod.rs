//! D-Bus type-signature translation
//!
//! Signatures are parsed by recursive descent with a single character of
//! lookahead into an owned [`TypeNode`] tree, which [`cpp`] then maps onto a
//! C++ type expression and a parameter pass policy.

pub mod cpp;
pub mod types;

pub use cpp::{CppType, PassPolicy};
pub use types::{lookup_scalar, ScalarInfo, ScalarKind, TypeNode};

use crate::error::{SignatureError, SignatureErrorKind};
use types::{ARRAY, DICT_ENTRY_CLOSE, DICT_ENTRY_OPEN, STRUCT_CLOSE, STRUCT_OPEN, VARIANT};

/// Bus limits on signature size and nesting
pub const MAX_SIGNATURE_LENGTH: usize = 255;
pub const MAX_ARRAY_DEPTH: usize = 32;
/// Dictionary entries count as structs
pub const MAX_STRUCT_DEPTH: usize = 32;

/// Parse a signature holding exactly one complete type.
pub fn parse_signature(signature: &str) -> Result<TypeNode, SignatureError> {
    let mut parser = SignatureParser::new(signature);
    if parser.peek().is_none() {
        return Err(parser.error(SignatureErrorKind::Empty));
    }
    if parser.chars.len() > MAX_SIGNATURE_LENGTH {
        return Err(parser.error_at(MAX_SIGNATURE_LENGTH, SignatureErrorKind::TooLong));
    }
    let node = parser.parse_complete_type()?;
    if parser.peek().is_some() {
        return Err(parser.error(SignatureErrorKind::TrailingCharacters));
    }
    Ok(node)
}

/// Parse a signature and map it onto its C++ type in one step.
pub fn translate(signature: &str) -> Result<CppType, SignatureError> {
    parse_signature(signature).map(|node| cpp::cpp_type(&node))
}

struct SignatureParser<'a> {
    signature: &'a str,
    chars: Vec<char>,
    position: usize,
    array_depth: usize,
    struct_depth: usize,
}

impl<'a> SignatureParser<'a> {
    fn new(signature: &'a str) -> Self {
        Self {
            signature,
            chars: signature.chars().collect(),
            position: 0,
            array_depth: 0,
            struct_depth: 0,
        }
    }

    fn parse_complete_type(&mut self) -> Result<TypeNode, SignatureError> {
        let c = self
            .peek()
            .ok_or_else(|| self.error(SignatureErrorKind::UnexpectedEnd))?;

        match c {
            ARRAY => {
                if self.array_depth == MAX_ARRAY_DEPTH {
                    return Err(self.error(SignatureErrorKind::TooDeep));
                }
                self.array_depth += 1;
                self.advance();
                let node = if self.peek() == Some(DICT_ENTRY_OPEN) {
                    self.parse_dict_entry()?
                } else {
                    TypeNode::Sequence(Box::new(self.parse_complete_type()?))
                };
                self.array_depth -= 1;
                Ok(node)
            }
            STRUCT_OPEN => self.parse_struct(),
            DICT_ENTRY_OPEN => Err(self.error(SignatureErrorKind::DictEntryOutsideArray)),
            STRUCT_CLOSE | DICT_ENTRY_CLOSE => Err(self.error(SignatureErrorKind::UnexpectedChar(c))),
            VARIANT => {
                self.advance();
                Ok(TypeNode::Dynamic)
            }
            _ => match lookup_scalar(c) {
                Some(info) => {
                    self.advance();
                    Ok(TypeNode::Scalar(info.kind))
                }
                None => Err(self.error(SignatureErrorKind::UnknownCode(c))),
            },
        }
    }

    /// `(` one or more complete types `)`
    fn parse_struct(&mut self) -> Result<TypeNode, SignatureError> {
        self.enter_struct()?;
        self.advance();
        let mut fields = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.error(SignatureErrorKind::UnexpectedEnd)),
                Some(STRUCT_CLOSE) if fields.is_empty() => {
                    return Err(self.error(SignatureErrorKind::EmptyStruct));
                }
                Some(STRUCT_CLOSE) => {
                    self.advance();
                    self.struct_depth -= 1;
                    return Ok(TypeNode::Aggregate(fields));
                }
                Some(_) => fields.push(self.parse_complete_type()?),
            }
        }
    }

    fn enter_struct(&mut self) -> Result<(), SignatureError> {
        if self.struct_depth == MAX_STRUCT_DEPTH {
            return Err(self.error(SignatureErrorKind::TooDeep));
        }
        self.struct_depth += 1;
        Ok(())
    }

    /// `{` basic-key value `}`, only reachable right after an array marker
    fn parse_dict_entry(&mut self) -> Result<TypeNode, SignatureError> {
        self.enter_struct()?;
        self.advance();

        let key_position = self.position;
        if self.peek() == Some(DICT_ENTRY_CLOSE) {
            return Err(self.error(SignatureErrorKind::DictEntryArity));
        }
        let key = self.parse_complete_type()?;
        if !matches!(key, TypeNode::Scalar(_)) {
            return Err(self.error_at(key_position, SignatureErrorKind::NonBasicDictKey));
        }

        if self.peek() == Some(DICT_ENTRY_CLOSE) {
            return Err(self.error(SignatureErrorKind::DictEntryArity));
        }
        let value = self.parse_complete_type()?;

        match self.peek() {
            Some(DICT_ENTRY_CLOSE) => {
                self.advance();
                self.struct_depth -= 1;
                Ok(TypeNode::Association {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            Some(_) => Err(self.error(SignatureErrorKind::DictEntryArity)),
            None => Err(self.error(SignatureErrorKind::UnexpectedEnd)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, reason: SignatureErrorKind) -> SignatureError {
        self.error_at(self.position, reason)
    }

    fn error_at(&self, offset: usize, reason: SignatureErrorKind) -> SignatureError {
        SignatureError {
            signature: self.signature.to_string(),
            offset,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(signature: &str) -> SignatureErrorKind {
        parse_signature(signature)
            .expect_err("signature should be rejected")
            .reason
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse_signature("s").unwrap(), TypeNode::Scalar(ScalarKind::String));
        assert_eq!(parse_signature("h").unwrap(), TypeNode::Scalar(ScalarKind::UnixFd));
        assert_eq!(parse_signature("v").unwrap(), TypeNode::Dynamic);
    }

    #[test]
    fn test_sequence_of_object_paths() {
        assert_eq!(
            parse_signature("ao").unwrap(),
            TypeNode::Sequence(Box::new(TypeNode::Scalar(ScalarKind::ObjectPath)))
        );
    }

    #[test]
    fn test_dictionary() {
        let node = parse_signature("a{sv}").unwrap();
        assert_eq!(
            node,
            TypeNode::Association {
                key: Box::new(TypeNode::Scalar(ScalarKind::String)),
                value: Box::new(TypeNode::Dynamic),
            }
        );
    }

    #[test]
    fn test_nested_containers_round_trip() {
        for signature in ["aai", "a(ia{sv})", "(bynqiuxtdsogh)", "a{oa{sa{sv}}}", "((i)(s))"] {
            let node = parse_signature(signature).unwrap();
            assert_eq!(node.signature(), signature);
        }
    }

    #[test]
    fn test_bare_array_rejected() {
        let err = parse_signature("a").unwrap_err();
        assert_eq!(err.reason, SignatureErrorKind::UnexpectedEnd);
        assert_eq!(err.offset, 1);
        assert_eq!(err.signature, "a");
    }

    #[test]
    fn test_malformed_signatures() {
        assert_eq!(reason(""), SignatureErrorKind::Empty);
        assert_eq!(reason("ii"), SignatureErrorKind::TrailingCharacters);
        assert_eq!(reason("()"), SignatureErrorKind::EmptyStruct);
        assert_eq!(reason("(i"), SignatureErrorKind::UnexpectedEnd);
        assert_eq!(reason("i)"), SignatureErrorKind::TrailingCharacters);
        assert_eq!(reason(")"), SignatureErrorKind::UnexpectedChar(')'));
        assert_eq!(reason("z"), SignatureErrorKind::UnknownCode('z'));
        assert_eq!(reason("{sv}"), SignatureErrorKind::DictEntryOutsideArray);
        assert_eq!(reason("(a{sv}{sv})"), SignatureErrorKind::DictEntryOutsideArray);
        assert_eq!(reason("a{vs}"), SignatureErrorKind::NonBasicDictKey);
        assert_eq!(reason("a{ais}"), SignatureErrorKind::NonBasicDictKey);
        assert_eq!(reason("a{s}"), SignatureErrorKind::DictEntryArity);
        assert_eq!(reason("a{}"), SignatureErrorKind::DictEntryArity);
        assert_eq!(reason("a{sii}"), SignatureErrorKind::DictEntryArity);
        assert_eq!(reason("a{si"), SignatureErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_length_limit() {
        let longest = format!("({})", "i".repeat(MAX_SIGNATURE_LENGTH - 2));
        assert!(parse_signature(&longest).is_ok());

        let err = parse_signature(&format!("({})", "i".repeat(MAX_SIGNATURE_LENGTH - 1))).unwrap_err();
        assert_eq!(err.reason, SignatureErrorKind::TooLong);
        assert_eq!(err.offset, MAX_SIGNATURE_LENGTH);
    }

    #[test]
    fn test_huge_signature_is_rejected_not_overflowed() {
        let signature = format!("{}i", "a".repeat(200_000));
        assert_eq!(reason(&signature), SignatureErrorKind::TooLong);
    }

    #[test]
    fn test_array_nesting_limit() {
        let deepest = format!("{}i", "a".repeat(MAX_ARRAY_DEPTH));
        assert!(parse_signature(&deepest).is_ok());

        let err = parse_signature(&format!("{}i", "a".repeat(MAX_ARRAY_DEPTH + 1))).unwrap_err();
        assert_eq!(err.reason, SignatureErrorKind::TooDeep);
        assert_eq!(err.offset, MAX_ARRAY_DEPTH);
    }

    #[test]
    fn test_struct_nesting_limit() {
        let nested = |depth: usize| format!("{}i{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_signature(&nested(MAX_STRUCT_DEPTH)).is_ok());
        assert_eq!(reason(&nested(MAX_STRUCT_DEPTH + 1)), SignatureErrorKind::TooDeep);

        // Dictionary entries share the struct budget
        let mixed = format!("{}a{{si}}{}", "(".repeat(MAX_STRUCT_DEPTH), ")".repeat(MAX_STRUCT_DEPTH));
        assert_eq!(reason(&mixed), SignatureErrorKind::TooDeep);
    }

    #[test]
    fn test_sibling_containers_do_not_accumulate_depth() {
        let siblings = format!("({})", "(i)".repeat(40));
        assert!(parse_signature(&siblings).is_ok());
        let arrays = format!("({})", "ai".repeat(40));
        assert!(parse_signature(&arrays).is_ok());
    }

    #[test]
    fn test_translate() {
        let cpp = translate("as").unwrap();
        assert_eq!(cpp.expr, "std::vector<std::string>");
        assert_eq!(cpp.pass, PassPolicy::ConstRef);
    }
}
