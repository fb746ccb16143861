//! Code generation: C++ adaptors, proxies and member-name constants

pub mod adaptor;
pub mod header;
pub mod indented_text;
pub mod method_names;
pub mod proxy;

use std::path::Path;

use tracing::info;

use crate::error::{BindingsError, CodegenError};
use crate::interface::{Argument, Interface};
use crate::naming;
use crate::signature::{self, CppType};

pub use adaptor::AdaptorGenerator;
pub use indented_text::IndentedText;
pub use method_names::MethodNameGenerator;
pub use proxy::ProxyGenerator;

/// A generator that turns one interface into one C++ header
pub trait HeaderGenerator {
    /// Short label used in diagnostics, e.g. "adaptor"
    fn kind(&self) -> &'static str;

    /// Render the complete header text destined for `output`
    fn render(&self, interface: &Interface, output: &Path) -> Result<String, CodegenError>;

    /// Validate, render and atomically write the header
    fn generate(&self, interface: &Interface, output: &Path) -> Result<(), BindingsError> {
        interface.validate()?;
        let contents = self.render(interface, output)?;
        header::write_atomically(output, &contents)?;
        info!(
            interface = %interface.name,
            output = %output.display(),
            "generated {}",
            self.kind()
        );
        Ok(())
    }
}

/// An argument after signature translation and naming
#[derive(Debug, Clone)]
pub(crate) struct ResolvedArgument {
    /// Identifier, explicit or synthesized
    pub name: String,
    /// Whether the name came from the document
    pub explicit: bool,
    pub cpp: CppType,
}

impl ResolvedArgument {
    /// `/* name */` for explicitly named arguments, nothing otherwise
    pub fn name_comment(&self) -> String {
        if self.explicit {
            format!(" /* {} */", self.name)
        } else {
            String::new()
        }
    }
}

/// Translate and name one argument list.
///
/// `owner` describes the list in diagnostics, e.g. "method Kaneda input".
pub(crate) fn resolve_arguments(
    owner: &str,
    arguments: &[Argument],
) -> Result<Vec<ResolvedArgument>, CodegenError> {
    let names = naming::argument_names(owner, arguments)?;
    arguments
        .iter()
        .zip(names)
        .map(|(argument, name)| -> Result<ResolvedArgument, CodegenError> {
            let cpp = signature::translate(&argument.type_signature).map_err(|source| {
                CodegenError::Signature {
                    owner: format!("{} argument '{}'", owner, name),
                    source,
                }
            })?;
            Ok(ResolvedArgument {
                name,
                explicit: !argument.is_anonymous(),
                cpp,
            })
        })
        .collect()
}

/// How a method's outputs surface in a generated C++ signature
#[derive(Debug, Clone, Copy)]
pub(crate) enum ReturnStyle<'a> {
    /// No outputs: `void`
    Void,
    /// Exactly one anonymous output: returned by value
    Value(&'a ResolvedArgument),
    /// Several or named outputs: `void` plus one out-pointer each, in order
    OutParams,
}

pub(crate) fn return_style(outputs: &[ResolvedArgument]) -> ReturnStyle<'_> {
    match outputs {
        [] => ReturnStyle::Void,
        [single] if !single.explicit => ReturnStyle::Value(single),
        _ => ReturnStyle::OutParams,
    }
}

/// Checks every generator makes before rendering: no C++ keyword emitted
/// verbatim, and every property type is a valid signature
pub(crate) fn check_interface(interface: &Interface) -> Result<(), CodegenError> {
    naming::check_reserved_words(interface)?;
    for property in &interface.properties {
        signature::parse_signature(&property.type_signature).map_err(|source| {
            CodegenError::Signature {
                owner: format!("property {}", property.name),
                source,
            }
        })?;
    }
    Ok(())
}

/// Claim `symbol` in `scope`, converting collisions into codegen errors
pub(crate) fn claim(
    scope: &mut naming::ScopeSymbols,
    symbol: &str,
    owner: &str,
) -> Result<(), CodegenError> {
    scope.claim(symbol, owner).map_err(CodegenError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NamingError, SignatureErrorKind};
    use crate::interface::{Property, PropertyAccess};

    #[test]
    fn test_resolve_arguments() {
        let arguments = vec![Argument::new("iwata", "s"), Argument::new("", "ao")];
        let resolved = resolve_arguments("method Kaneda input", &arguments).unwrap();
        assert_eq!(resolved[0].name, "iwata");
        assert_eq!(resolved[0].name_comment(), " /* iwata */");
        assert_eq!(resolved[1].name, "argument2");
        assert_eq!(resolved[1].name_comment(), "");
        assert_eq!(resolved[1].cpp.in_param(), "const std::vector<dbus::ObjectPath>&");
    }

    #[test]
    fn test_return_style() {
        let one = resolve_arguments("m output", &[Argument::new("", "s")]).unwrap();
        assert!(matches!(return_style(&one), ReturnStyle::Value(a) if a.cpp.expr == "std::string"));

        let named = resolve_arguments("m output", &[Argument::new("text", "s")]).unwrap();
        assert!(matches!(return_style(&named), ReturnStyle::OutParams));

        let two = resolve_arguments("m output", &[Argument::new("", "s"), Argument::new("", "i")]).unwrap();
        assert!(matches!(return_style(&two), ReturnStyle::OutParams));

        assert!(matches!(return_style(&[]), ReturnStyle::Void));
    }

    #[test]
    fn test_bad_signature_names_owner() {
        let arguments = vec![Argument::new("clarke", "a")];
        let err = resolve_arguments("method Kaneda input", &arguments).unwrap_err();
        match err {
            CodegenError::Signature { owner, source } => {
                assert_eq!(owner, "method Kaneda input argument 'clarke'");
                assert_eq!(source.signature, "a");
                assert_eq!(source.reason, SignatureErrorKind::UnexpectedEnd);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_property_signature_is_checked() {
        let mut interface = Interface::new("org.chromium.Test");
        interface
            .properties
            .push(Property::new("Level", "a", PropertyAccess::Read));
        match check_interface(&interface).unwrap_err() {
            CodegenError::Signature { owner, source } => {
                assert_eq!(owner, "property Level");
                assert_eq!(source.reason, SignatureErrorKind::UnexpectedEnd);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_generator_rejects_bad_interfaces() {
        let generators: [&dyn HeaderGenerator; 3] = [
            &AdaptorGenerator::new(),
            &ProxyGenerator::new(),
            &MethodNameGenerator::new(),
        ];
        let keyword_namespace = Interface::new("org.class.Test");
        let mut bad_property = Interface::new("org.chromium.Test");
        bad_property
            .properties
            .push(Property::new("Level", "a{vs}", PropertyAccess::Read));

        for generator in generators {
            assert!(matches!(
                generator.render(&keyword_namespace, Path::new("out.h")),
                Err(CodegenError::Naming(NamingError::ReservedWord { .. }))
            ));
            assert!(matches!(
                generator.render(&bad_property, Path::new("out.h")),
                Err(CodegenError::Signature { .. })
            ));
        }
    }
}
