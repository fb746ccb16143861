//! Identifier policy shared by the generators
//!
//! Every symbol a generator emits is derived here, so the adaptor, the proxy
//! and the name constants agree on spelling.

use std::collections::{HashMap, HashSet};

use crate::error::NamingError;
use crate::interface::{Argument, Interface};

/// Prefix of synthesized names for anonymous arguments
pub const SYNTHETIC_ARGUMENT_PREFIX: &str = "argument";

/// C++20 keywords and alternative operator tokens
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "co_await", "co_return",
    "co_yield", "compl", "concept", "const", "const_cast", "consteval", "constexpr", "constinit",
    "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum",
    "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline",
    "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr",
    "operator", "or", "or_eq", "private", "protected", "public", "register", "reinterpret_cast",
    "requires", "return", "short", "signed", "sizeof", "static", "static_assert", "static_cast",
    "struct", "switch", "template", "this", "thread_local", "throw", "true", "try", "typedef",
    "typeid", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "wchar_t",
    "while", "xor", "xor_eq",
];

pub fn is_cpp_keyword(name: &str) -> bool {
    CPP_KEYWORDS.contains(&name)
}

/// Turn arbitrary argument text into a C++ identifier
pub fn legalize(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    if is_cpp_keyword(&result) {
        result.push('_');
    }
    result
}

/// Reject document names that are emitted verbatim as C++ identifiers.
///
/// Interface segments become namespaces and method names become member
/// functions. Signal and property names only appear inside derived symbols.
pub fn check_reserved_words(interface: &Interface) -> Result<(), NamingError> {
    let segments = interface.name.split('.').map(|s| ("interface name segment", s));
    let methods = interface.methods.iter().map(|m| ("method", m.name.as_str()));
    for (kind, name) in segments.chain(methods) {
        if is_cpp_keyword(name) {
            return Err(NamingError::ReservedWord {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Name for the anonymous argument at 1-based `position`
pub fn synthetic_argument_name(position: usize) -> String {
    format!("{}{}", SYNTHETIC_ARGUMENT_PREFIX, position)
}

/// Resolve every argument of one list to a unique identifier.
///
/// Explicit names are legalized; anonymous entries become `argumentN`.
pub fn argument_names(owner: &str, arguments: &[Argument]) -> Result<Vec<String>, NamingError> {
    let mut explicit = HashSet::new();
    for argument in arguments.iter().filter(|a| !a.is_anonymous()) {
        let name = legalize(&argument.name);
        if !explicit.insert(name.clone()) {
            return Err(NamingError::DuplicateArgument {
                owner: owner.to_string(),
                name,
            });
        }
    }

    arguments
        .iter()
        .enumerate()
        .map(|(index, argument)| {
            if !argument.is_anonymous() {
                return Ok(legalize(&argument.name));
            }
            let name = synthetic_argument_name(index + 1);
            if explicit.contains(&name) {
                return Err(NamingError::SyntheticCollision {
                    owner: owner.to_string(),
                    name,
                    position: index + 1,
                });
            }
            Ok(name)
        })
        .collect()
}

pub fn adaptor_class_name(interface: &Interface) -> String {
    format!("{}Adaptor", interface.short_name())
}

pub fn method_interface_class_name(interface: &Interface) -> String {
    format!("{}AdaptorMethodInterface", interface.short_name())
}

pub fn proxy_class_name(interface: &Interface) -> String {
    format!("{}Proxy", interface.short_name())
}

/// Receiver hook in the proxy's `SignalReceiver`
pub fn signal_handler_name(signal: &str) -> String {
    format!("On{}Signal", signal)
}

/// Emit operation on the adaptor
pub fn signal_sender_name(signal: &str) -> String {
    format!("Send{}Signal", signal)
}

/// Adaptor member holding the registered signal
pub fn signal_member_name(signal: &str) -> String {
    format!("signal_{}_", signal)
}

/// Adaptor type alias for the registered signal
pub fn signal_type_alias(signal: &str) -> String {
    format!("Signal{}Type", signal)
}

pub fn method_constant_name(method: &str) -> String {
    format!("k{}Method", method)
}

pub fn signal_constant_name(signal: &str) -> String {
    format!("k{}Signal", signal)
}

pub fn property_constant_name(property: &str) -> String {
    format!("k{}Property", property)
}

/// Symbols already claimed inside one generated C++ scope
#[derive(Debug)]
pub struct ScopeSymbols {
    scope: String,
    owners: HashMap<String, String>,
}

impl ScopeSymbols {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            owners: HashMap::new(),
        }
    }

    /// Record `symbol` for `owner`, failing if another owner already has it
    pub fn claim(&mut self, symbol: &str, owner: &str) -> Result<(), NamingError> {
        if let Some(existing) = self.owners.get(symbol) {
            return Err(NamingError::SymbolCollision {
                scope: self.scope.clone(),
                symbol: symbol.to_string(),
                owner: owner.to_string(),
                existing: existing.clone(),
            });
        }
        self.owners.insert(symbol.to_string(), owner.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{Method, Property, PropertyAccess, Signal};

    #[test]
    fn test_anonymous_argument_gets_position_name() {
        let arguments = vec![Argument::new("", "s"), Argument::new("b", "i")];
        let names = argument_names("method M", &arguments).unwrap();
        assert_eq!(names, vec!["argument1", "b"]);
    }

    #[test]
    fn test_positions_are_per_list() {
        let arguments = vec![Argument::new("a", "s"), Argument::new("", "i"), Argument::new("", "y")];
        let names = argument_names("signal S", &arguments).unwrap();
        assert_eq!(names, vec!["a", "argument2", "argument3"]);
    }

    #[test]
    fn test_synthetic_collision() {
        let arguments = vec![Argument::new("", "s"), Argument::new("argument1", "i")];
        let err = argument_names("method M", &arguments).unwrap_err();
        assert_eq!(
            err,
            NamingError::SyntheticCollision {
                owner: "method M".to_string(),
                name: "argument1".to_string(),
                position: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_explicit_names() {
        let arguments = vec![Argument::new("x", "s"), Argument::new("x", "i")];
        assert!(matches!(
            argument_names("method M", &arguments),
            Err(NamingError::DuplicateArgument { name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_legalize() {
        assert_eq!(legalize("space_walk"), "space_walk");
        assert_eq!(legalize("foo-bar"), "foo_bar");
        assert_eq!(legalize("2fast"), "_2fast");
        assert_eq!(legalize("default"), "default_");
        assert_eq!(legalize("new"), "new_");
        assert_eq!(legalize("newer"), "newer");
    }

    #[test]
    fn test_keyword_argument_is_renamed() {
        let arguments = vec![Argument::new("default", "s"), Argument::new("class", "i")];
        let names = argument_names("signal S", &arguments).unwrap();
        assert_eq!(names, vec!["default_", "class_"]);
    }

    #[test]
    fn test_reserved_words() {
        assert!(check_reserved_words(&Interface::new("org.chromium.Test")).is_ok());
        assert_eq!(
            check_reserved_words(&Interface::new("org.class.Test")),
            Err(NamingError::ReservedWord {
                kind: "interface name segment",
                name: "class".to_string(),
            })
        );
        assert!(check_reserved_words(&Interface::new("org.chromium.delete")).is_err());

        let mut interface = Interface::new("org.chromium.Test");
        interface.methods.push(Method::named("delete"));
        assert!(matches!(
            check_reserved_words(&interface),
            Err(NamingError::ReservedWord { kind: "method", .. })
        ));

        // Only reachable through derived symbols
        let mut interface = Interface::new("org.chromium.Test");
        interface.signals.push(Signal::named("default"));
        interface.properties.push(Property::new("new", "s", PropertyAccess::Read));
        assert!(check_reserved_words(&interface).is_ok());
    }

    #[test]
    fn test_legalized_duplicates_collide() {
        let arguments = vec![Argument::new("a-b", "s"), Argument::new("a_b", "i")];
        assert!(argument_names("method M", &arguments).is_err());
    }

    #[test]
    fn test_derived_symbols() {
        assert_eq!(signal_handler_name("Foo"), "OnFooSignal");
        assert_eq!(signal_sender_name("Foo"), "SendFooSignal");
        assert_eq!(signal_member_name("Foo"), "signal_Foo_");
        assert_eq!(method_constant_name("Kaneda"), "kKanedaMethod");

        let interface = Interface::new("org.chromium.TestInterface");
        assert_eq!(adaptor_class_name(&interface), "TestInterfaceAdaptor");
        assert_eq!(
            method_interface_class_name(&interface),
            "TestInterfaceAdaptorMethodInterface"
        );
        assert_eq!(proxy_class_name(&interface), "TestInterfaceProxy");
    }

    #[test]
    fn test_scope_collision() {
        let mut symbols = ScopeSymbols::new("TestInterfaceProxy");
        symbols.claim("OnDBusSignalConnected", "signal connection callback").unwrap();
        let err = symbols
            .claim("OnDBusSignalConnected", "method OnDBusSignalConnected")
            .unwrap_err();
        assert!(matches!(err, NamingError::SymbolCollision { .. }));
        symbols.claim("OnFooSignal", "signal Foo").unwrap();
    }
}
