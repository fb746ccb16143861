//! Property-based tests for the bindings generator
//!
//! These tests use proptest to generate random signatures and interfaces and
//! verify that translation, naming and generation behave consistently.


use chromeos_dbus_bindings::naming::argument_names;
use chromeos_dbus_bindings::*;
use proptest::prelude::*;
use proptest_strategies::*;
use std::path::Path;

// ════════════════════════════════════════════════════════════
// Signature Property Tests
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every accepted signature renders back to exactly its input
    #[test]
    fn signature_round_trips(signature in complete_type()) {
        let node = parse_signature(&signature).expect("generated signature rejected");
        prop_assert_eq!(node.signature(), signature);
    }

    /// Two complete types in one signature are rejected
    #[test]
    fn trailing_types_rejected(first in complete_type(), second in complete_type()) {
        let signature = format!("{}{}", first, second);
        let err = parse_signature(&signature).unwrap_err();
        prop_assert_eq!(err.reason, SignatureErrorKind::TrailingCharacters);
        prop_assert_eq!(err.offset, first.chars().count());
    }

    /// A bare array marker in front of nothing is always incomplete
    #[test]
    fn dangling_array_rejected(prefix in "a{0,5}") {
        let signature = format!("{}a", prefix);
        let err = parse_signature(&signature).unwrap_err();
        prop_assert_eq!(err.reason, SignatureErrorKind::UnexpectedEnd);
    }

    /// Arbitrary input never panics, and errors point inside the signature
    #[test]
    fn noise_never_panics(signature in signature_noise()) {
        match parse_signature(&signature) {
            Ok(node) => prop_assert_eq!(node.signature(), signature),
            Err(err) => prop_assert!(err.offset <= signature.chars().count()),
        }
    }

    /// Only scalars and nothing else are passed by value
    #[test]
    fn containers_pass_by_reference(element in complete_type()) {
        let cpp = translate(&format!("a{}", element)).unwrap();
        prop_assert!(cpp.in_param().starts_with("const "));
        prop_assert!(cpp.in_param().ends_with('&'));
    }
}

// ════════════════════════════════════════════════════════════
// Naming Property Tests
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Anonymous arguments are named after their 1-based position
    #[test]
    fn anonymous_arguments_use_position(arguments in argument_list()) {
        let names = argument_names("method M", &arguments).unwrap();
        prop_assert_eq!(names.len(), arguments.len());
        for (index, (argument, name)) in arguments.iter().zip(&names).enumerate() {
            if argument.is_anonymous() {
                prop_assert_eq!(name, &format!("argument{}", index + 1));
            } else {
                prop_assert_eq!(name, &argument.name);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
// Generator Property Tests
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Generated interfaces always validate and render in every generator
    #[test]
    fn generators_accept_valid_interfaces(interface in interface()) {
        prop_assert!(interface.validate().is_ok());
        let output = Path::new("out.h");
        let adaptor = AdaptorGenerator::new().render(&interface, output).unwrap();
        let proxy = ProxyGenerator::new().render(&interface, output).unwrap();
        let names = MethodNameGenerator::new().render(&interface, output).unwrap();

        prop_assert_eq!(adaptor.matches("itf->AddMethodHandler(").count(), interface.methods.len());
        prop_assert_eq!(proxy.matches("CallMethodAndBlock(").count(), interface.methods.len());
        prop_assert_eq!(proxy.matches("ConnectToSignal(").count(), interface.signals.len());
        prop_assert_eq!(
            names.matches("const char k").count(),
            interface.methods.len() + interface.signals.len()
        );
    }

    /// Namespaces open and close in matching numbers
    #[test]
    fn namespaces_balance(interface in interface()) {
        let proxy = ProxyGenerator::new().render(&interface, Path::new("out.h")).unwrap();
        let depth = interface.namespaces().len();
        prop_assert_eq!(proxy.matches("\nnamespace ").count(), depth);
        prop_assert_eq!(proxy.matches("}  // namespace ").count(), depth);
    }

    /// Rendering is deterministic
    #[test]
    fn rendering_is_deterministic(interface in interface()) {
        let output = Path::new("out.h");
        let first = AdaptorGenerator::new().render(&interface, output).unwrap();
        let second = AdaptorGenerator::new().render(&interface, output).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ════════════════════════════════════════════════════════════
// Lexer Property Tests
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The lexer returns an error rather than panicking on arbitrary input
    #[test]
    fn lexer_never_panics(input in "[<>/=\"'&;#a-z0-9 \n!?-]{0,64}") {
        let _ = SimpleLexer::new(input).tokenize();
    }

    /// Attribute values survive entity escaping
    #[test]
    fn escaped_attributes_decode(value in "[a-z<>&\"' ]{0,20}") {
        let escaped = value
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;");
        let document = format!("<interface name=\"{}\"/>", escaped);
        let tokens = SimpleLexer::new(document).tokenize().unwrap();
        match &tokens[0] {
            lexer::Token::StartTag(tag) => prop_assert_eq!(tag.attribute("name"), Some(value.as_str())),
            other => prop_assert!(false, "unexpected token {:?}", other),
        }
    }
}
