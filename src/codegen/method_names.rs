//! String constants for every member name of an interface

use std::path::Path;

use super::header;
use super::indented_text::IndentedText;
use super::{check_interface, claim, HeaderGenerator};
use crate::error::CodegenError;
use crate::interface::Interface;
use crate::naming::{self, ScopeSymbols};

const BANNER: &str = "Automatic generation of D-Bus interface method names:";

/// Generates `k<Name>Method`, `k<Name>Signal` and `k<Name>Property` constants
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodNameGenerator;

impl MethodNameGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Constant name and value pairs, methods first, then signals and properties
    fn constants(&self, interface: &Interface) -> Result<Vec<(String, String)>, CodegenError> {
        let mut scope = ScopeSymbols::new(interface.short_name());
        let mut constants = Vec::new();

        for method in &interface.methods {
            let constant = naming::method_constant_name(&method.name);
            claim(&mut scope, &constant, &format!("method {}", method.name))?;
            constants.push((constant, method.name.clone()));
        }
        for signal in &interface.signals {
            let constant = naming::signal_constant_name(&signal.name);
            claim(&mut scope, &constant, &format!("signal {}", signal.name))?;
            constants.push((constant, signal.name.clone()));
        }
        for property in &interface.properties {
            let constant = naming::property_constant_name(&property.name);
            claim(&mut scope, &constant, &format!("property {}", property.name))?;
            constants.push((constant, property.name.clone()));
        }
        Ok(constants)
    }
}

impl HeaderGenerator for MethodNameGenerator {
    fn kind(&self) -> &'static str {
        "method names"
    }

    fn render(&self, interface: &Interface, output: &Path) -> Result<String, CodegenError> {
        check_interface(interface)?;
        let constants = self.constants(interface)?;

        let mut namespaces = interface.namespaces();
        namespaces.push(interface.short_name());

        let mut body = IndentedText::new();
        body.add_blank_line();
        header::open_namespaces(&mut body, &namespaces);
        for (constant, value) in &constants {
            body.add_line(format!("const char {}[] = \"{}\";", constant, value));
        }
        header::close_namespaces(&mut body, &namespaces)?;

        let mut text = IndentedText::new();
        header::wrap_header(&mut text, BANNER, interface, output, &body)?;
        text.finish()
    }
}
