//! In-memory model of a D-Bus interface
//!
//! An [`Interface`] is built once, either by the introspection parser or
//! directly by library callers, then validated and handed read-only to the
//! generators.

use std::collections::HashSet;

use crate::error::ModelError;

/// A single method, signal or property argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Argument name; empty for anonymous arguments
    pub name: String,
    /// D-Bus type signature of exactly one complete type
    pub type_signature: String,
}

impl Argument {
    pub fn new(name: impl Into<String>, type_signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_signature: type_signature.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// Method with ordered inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub input_arguments: Vec<Argument>,
    pub output_arguments: Vec<Argument>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        input_arguments: Vec<Argument>,
        output_arguments: Vec<Argument>,
    ) -> Self {
        Self {
            name: name.into(),
            input_arguments,
            output_arguments,
        }
    }

    /// Method without inputs or outputs
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }
}

/// One-way notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Signal {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Property access mode as declared by the `access` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAccess {
    Read,
    Write,
    ReadWrite,
}

impl PropertyAccess {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(PropertyAccess::Read),
            "write" => Some(PropertyAccess::Write),
            "readwrite" => Some(PropertyAccess::ReadWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyAccess::Read => "read",
            PropertyAccess::Write => "write",
            PropertyAccess::ReadWrite => "readwrite",
        }
    }
}

/// Named, typed property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub type_signature: String,
    pub access: PropertyAccess,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        type_signature: impl Into<String>,
        access: PropertyAccess,
    ) -> Self {
        Self {
            name: name.into(),
            type_signature: type_signature.into(),
            access,
        }
    }
}

/// A complete D-Bus interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    /// Dot-separated interface name, e.g. `org.chromium.TestInterface`
    pub name: String,
    pub methods: Vec<Method>,
    pub signals: Vec<Signal>,
    pub properties: Vec<Property>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leading name segments, one C++ namespace each
    pub fn namespaces(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.name.split('.').collect();
        segments.pop();
        segments
    }

    /// Final name segment, which names the generated classes
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Check the structural invariants generators rely on.
    ///
    /// Type signatures are deliberately not checked here; they are translated
    /// (and rejected) per argument by the generators, which know the owner.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.is_empty() {
            return Err(ModelError::EmptyInterfaceName);
        }
        for segment in self.name.split('.') {
            if !is_identifier(segment) {
                return Err(ModelError::InvalidInterfaceSegment {
                    name: self.name.clone(),
                    segment: segment.to_string(),
                });
            }
        }

        check_members("method", self.methods.iter().map(|m| m.name.as_str()))?;
        check_members("signal", self.signals.iter().map(|s| s.name.as_str()))?;
        check_members("property", self.properties.iter().map(|p| p.name.as_str()))?;
        Ok(())
    }
}

fn check_members<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(ModelError::EmptyMemberName { kind });
        }
        if !is_identifier(name) {
            return Err(ModelError::InvalidMemberName {
                kind,
                name: name.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ModelError::DuplicateMember {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the shared rule for D-Bus member names and
/// interface name elements
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interface() -> Interface {
        let mut interface = Interface::new("org.chromium.TestInterface");
        interface.methods.push(Method::named("Kei"));
        interface.signals.push(Signal::named("Closer"));
        interface
            .properties
            .push(Property::new("Level", "i", PropertyAccess::Read));
        interface
    }

    #[test]
    fn test_name_segments() {
        let interface = test_interface();
        assert_eq!(interface.namespaces(), vec!["org", "chromium"]);
        assert_eq!(interface.short_name(), "TestInterface");

        let flat = Interface::new("Flat");
        assert!(flat.namespaces().is_empty());
        assert_eq!(flat.short_name(), "Flat");
    }

    #[test]
    fn test_valid_interface() {
        assert!(test_interface().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let interface = Interface::default();
        assert_eq!(interface.validate(), Err(ModelError::EmptyInterfaceName));
    }

    #[test]
    fn test_bad_segment_rejected() {
        let interface = Interface::new("org..chromium");
        assert!(matches!(
            interface.validate(),
            Err(ModelError::InvalidInterfaceSegment { segment, .. }) if segment.is_empty()
        ));
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let mut interface = test_interface();
        interface.methods.push(Method::named("Kei"));
        assert_eq!(
            interface.validate(),
            Err(ModelError::DuplicateMember {
                kind: "method",
                name: "Kei".to_string()
            })
        );
    }

    #[test]
    fn test_member_names_are_case_sensitive() {
        let mut interface = test_interface();
        interface.methods.push(Method::named("kei"));
        assert!(interface.validate().is_ok());
    }

    #[test]
    fn test_method_and_signal_may_share_a_name() {
        let mut interface = test_interface();
        interface.signals.push(Signal::named("Kei"));
        assert!(interface.validate().is_ok());
    }

    #[test]
    fn test_empty_signal_name_rejected() {
        let mut interface = test_interface();
        interface.signals.push(Signal::named(""));
        assert_eq!(
            interface.validate(),
            Err(ModelError::EmptyMemberName { kind: "signal" })
        );
    }

    #[test]
    fn test_property_access_parsing() {
        assert_eq!(PropertyAccess::parse("readwrite"), Some(PropertyAccess::ReadWrite));
        assert_eq!(PropertyAccess::parse("rw"), None);
        assert_eq!(PropertyAccess::Write.as_str(), "write");
    }
}
