//! Server-side adaptor generation
//!
//! The adaptor owns a `chromeos::dbus_utils::DBusObject`, routes every method
//! of the interface to a caller-owned implementation of the generated
//! `<Name>AdaptorMethodInterface`, and exposes one `Send<Signal>Signal` per
//! declared signal.

use std::path::Path;

use tracing::debug;

use super::header;
use super::indented_text::IndentedText;
use super::{check_interface, claim, resolve_arguments, return_style, HeaderGenerator, ResolvedArgument, ReturnStyle};
use crate::error::CodegenError;
use crate::interface::Interface;
use crate::naming::{self, ScopeSymbols};

const BANNER: &str = "Automatic generation of D-Bus interfaces:";

const INCLUDES: &[&str] = &[
    "<string>",
    "<vector>",
    "",
    "<base/macros.h>",
    "<dbus/object_path.h>",
    "<chromeos/dbus/dbus_object.h>",
    "<chromeos/dbus/exported_object_manager.h>",
    "<chromeos/variant_dictionary.h>",
];

struct AdaptorMethod {
    name: String,
    inputs: Vec<ResolvedArgument>,
    outputs: Vec<ResolvedArgument>,
}

struct AdaptorSignal {
    name: String,
    arguments: Vec<ResolvedArgument>,
}

/// Generates `<Name>Adaptor` headers
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptorGenerator;

impl AdaptorGenerator {
    pub fn new() -> Self {
        Self
    }

    fn resolve(
        &self,
        interface: &Interface,
    ) -> Result<(Vec<AdaptorMethod>, Vec<AdaptorSignal>), CodegenError> {
        let mut methods = Vec::with_capacity(interface.methods.len());
        for method in &interface.methods {
            debug!(method = %method.name, "resolving adaptor method");
            methods.push(AdaptorMethod {
                name: method.name.clone(),
                inputs: resolve_arguments(
                    &format!("method {} input", method.name),
                    &method.input_arguments,
                )?,
                outputs: resolve_arguments(
                    &format!("method {} output", method.name),
                    &method.output_arguments,
                )?,
            });
        }

        let mut signals = Vec::with_capacity(interface.signals.len());
        for signal in &interface.signals {
            signals.push(AdaptorSignal {
                name: signal.name.clone(),
                arguments: resolve_arguments(&format!("signal {}", signal.name), &signal.arguments)?,
            });
        }
        Ok((methods, signals))
    }

    /// Reject generated names that would clash inside one C++ class
    fn check_symbols(
        &self,
        interface: &Interface,
        methods: &[AdaptorMethod],
        signals: &[AdaptorSignal],
    ) -> Result<(), CodegenError> {
        let adaptor = naming::adaptor_class_name(interface);
        let method_interface = naming::method_interface_class_name(interface);

        let mut interface_scope = ScopeSymbols::new(method_interface.as_str());
        claim(&mut interface_scope, &method_interface, "the class itself")?;
        for method in methods {
            claim(&mut interface_scope, &method.name, &format!("method {}", method.name))?;
        }

        let mut adaptor_scope = ScopeSymbols::new(adaptor.as_str());
        claim(&mut adaptor_scope, &adaptor, "the class itself")?;
        claim(&mut adaptor_scope, &method_interface, "the method interface")?;
        claim(&mut adaptor_scope, "OnRegisterComplete", "the registration hook")?;
        claim(&mut adaptor_scope, "interface_", "the implementation pointer")?;
        claim(&mut adaptor_scope, "dbus_object_", "the exported object")?;
        for signal in signals {
            let owner = format!("signal {}", signal.name);
            claim(&mut adaptor_scope, &naming::signal_sender_name(&signal.name), &owner)?;
            claim(&mut adaptor_scope, &naming::signal_member_name(&signal.name), &owner)?;
            claim(&mut adaptor_scope, &naming::signal_type_alias(&signal.name), &owner)?;

            let sender = naming::signal_sender_name(&signal.name);
            let mut sender_scope = ScopeSymbols::new(format!("{}::{}", adaptor, sender));
            claim(&mut sender_scope, "signal", "the local signal pointer")?;
            for argument in &signal.arguments {
                claim(
                    &mut sender_scope,
                    &argument.name,
                    &format!("{} argument '{}'", owner, argument.name),
                )?;
            }
        }
        Ok(())
    }

    fn add_method_interface(
        &self,
        text: &mut IndentedText,
        interface: &Interface,
        methods: &[AdaptorMethod],
    ) {
        text.add_line(format!(
            "class {} {{",
            naming::method_interface_class_name(interface)
        ));
        text.add_line(" public:");
        text.push_offset(2);
        for method in methods {
            let return_type = match return_style(&method.outputs) {
                ReturnStyle::Value(output) => output.cpp.expr.clone(),
                ReturnStyle::Void | ReturnStyle::OutParams => "void".to_string(),
            };
            text.add_line(format!("virtual {} {}(", return_type, method.name));

            let mut params = vec!["chromeos::ErrorPtr* /* error */".to_string()];
            for input in &method.inputs {
                params.push(format!("{}{}", input.cpp.in_param(), input.name_comment()));
            }
            if let ReturnStyle::OutParams = return_style(&method.outputs) {
                for output in &method.outputs {
                    params.push(format!("{}{}", output.cpp.out_param(), output.name_comment()));
                }
            }
            text.add_list(&params, ",", ") = 0;", 4);
        }
        text.pop_offset();
        text.add_line("};");
    }

    fn add_constructor(
        &self,
        text: &mut IndentedText,
        interface: &Interface,
        methods: &[AdaptorMethod],
        signals: &[AdaptorSignal],
    ) {
        let adaptor = naming::adaptor_class_name(interface);
        let method_interface = naming::method_interface_class_name(interface);

        text.add_line(format!("{}(", adaptor));
        text.push_offset(4);
        text.add_line("chromeos::dbus_utils::ExportedObjectManager* object_manager,");
        text.add_line("const std::string& object_path,");
        text.add_line(format!("{}* interface)  // Owned by caller.", method_interface));
        text.add_line(": interface_(interface),");
        text.push_offset(2);
        text.add_line("dbus_object_(");
        text.add_line_with_offset("object_manager,", 4);
        text.add_line_with_offset("object_manager->GetBus(),", 4);
        text.add_line_with_offset("dbus::ObjectPath(object_path)) {", 4);
        text.pop_offset();
        text.pop_offset();

        text.push_offset(2);
        text.add_line("auto* itf =");
        text.add_line_with_offset(
            format!("dbus_object_.AddOrGetInterface(\"{}\");", interface.name),
            4,
        );
        for method in methods {
            text.add_line("itf->AddMethodHandler(");
            text.add_line_with_offset(format!("\"{}\",", method.name), 4);
            text.add_line_with_offset("base::Unretained(interface_),", 4);
            text.add_line_with_offset(format!("&{}::{});", method_interface, method.name), 4);
        }
        for signal in signals {
            text.add_line(format!(
                "{} = itf->RegisterSignalOfType<{}>(\"{}\");",
                naming::signal_member_name(&signal.name),
                naming::signal_type_alias(&signal.name),
                signal.name
            ));
        }
        text.add_line("dbus_object_.RegisterAsync(base::Bind(");
        text.add_line_with_offset(
            format!("&{}::OnRegisterComplete, base::Unretained(this)));", adaptor),
            4,
        );
        text.pop_offset();
        text.add_line("}");
    }

    fn add_signal_senders(&self, text: &mut IndentedText, signals: &[AdaptorSignal]) {
        for signal in signals {
            let sender = naming::signal_sender_name(&signal.name);
            if signal.arguments.is_empty() {
                text.add_line(format!("void {}() {{", sender));
            } else {
                text.add_line(format!("void {}(", sender));
                let params: Vec<String> = signal
                    .arguments
                    .iter()
                    .map(|a| format!("{} {}", a.cpp.in_param(), a.name))
                    .collect();
                text.add_list(&params, ",", ") {", 4);
            }

            let names: Vec<&str> = signal.arguments.iter().map(|a| a.name.as_str()).collect();
            text.push_offset(2);
            text.add_line(format!(
                "auto signal = {}.lock();",
                naming::signal_member_name(&signal.name)
            ));
            text.add_line("if (signal)");
            text.add_line_with_offset(format!("signal->Send({});", names.join(", ")), 2);
            text.pop_offset();
            text.add_line("}");
        }
    }

    fn add_signal_members(&self, text: &mut IndentedText, signals: &[AdaptorSignal]) {
        for signal in signals {
            let alias = naming::signal_type_alias(&signal.name);
            if signal.arguments.is_empty() {
                text.add_line(format!(
                    "using {} = chromeos::dbus_utils::DBusSignal<>;",
                    alias
                ));
            } else {
                text.add_line(format!("using {} = chromeos::dbus_utils::DBusSignal<", alias));
                let types: Vec<String> = signal.arguments.iter().map(|a| a.cpp.expr.clone()).collect();
                text.add_list(&types, ",", ">;", 4);
            }
            text.add_line(format!(
                "std::weak_ptr<{}> {};",
                alias,
                naming::signal_member_name(&signal.name)
            ));
        }
    }

    fn add_adaptor_class(
        &self,
        text: &mut IndentedText,
        interface: &Interface,
        methods: &[AdaptorMethod],
        signals: &[AdaptorSignal],
    ) -> Result<(), CodegenError> {
        let adaptor = naming::adaptor_class_name(interface);

        text.open_scope(format!("class {} {{", adaptor), "};");
        text.add_line(" public:");
        text.push_offset(2);
        self.add_method_interface(text, interface, methods);
        self.add_constructor(text, interface, methods, signals);
        text.add_line(format!("virtual ~{}() = default;", adaptor));
        text.add_line("virtual void OnRegisterComplete(bool success) {}");
        self.add_signal_senders(text, signals);
        text.pop_offset();

        text.add_line(" private:");
        text.push_offset(2);
        text.add_line(format!(
            "{}* interface_;  // Owned by caller.",
            naming::method_interface_class_name(interface)
        ));
        text.add_line("chromeos::dbus_utils::DBusObject dbus_object_;");
        self.add_signal_members(text, signals);
        text.add_line(format!("DISALLOW_COPY_AND_ASSIGN({});", adaptor));
        text.pop_offset();
        text.close_scope()
    }
}

impl HeaderGenerator for AdaptorGenerator {
    fn kind(&self) -> &'static str {
        "adaptor"
    }

    fn render(&self, interface: &Interface, output: &Path) -> Result<String, CodegenError> {
        check_interface(interface)?;
        let (methods, signals) = self.resolve(interface)?;
        self.check_symbols(interface, &methods, &signals)?;

        let mut body = IndentedText::new();
        body.add_blank_line();
        for include in INCLUDES {
            if include.is_empty() {
                body.add_blank_line();
            } else {
                body.add_line(format!("#include {}", include));
            }
        }
        body.add_blank_line();

        let namespaces = interface.namespaces();
        header::open_namespaces(&mut body, &namespaces);
        self.add_adaptor_class(&mut body, interface, &methods, &signals)?;
        header::close_namespaces(&mut body, &namespaces)?;

        let mut text = IndentedText::new();
        header::wrap_header(&mut text, BANNER, interface, output, &body)?;
        text.finish()
    }
}
