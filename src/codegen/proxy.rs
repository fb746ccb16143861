//! Client-side proxy generation
//!
//! The proxy wraps a `dbus::ObjectProxy` for one remote object. Each method
//! becomes a blocking call; each signal is routed to an overridable hook on
//! the nested `SignalReceiver`.

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
    "<base/bind.h>",
    "<base/callback.h>",
    "<base/logging.h>",
    "<base/macros.h>",
    "<base/memory/ref_counted.h>",
    "<chromeos/any.h>",
    "<chromeos/dbus/dbus_method_invoker.h>",
    "<chromeos/dbus/dbus_signal_handler.h>",
    "<chromeos/errors/error.h>",
    "<dbus/bus.h>",
    "<dbus/message.h>",
    "<dbus/object_path.h>",
    "<dbus/object_proxy.h>",
];

const SIGNAL_RECEIVER: &str = "SignalReceiver";
const SIGNAL_CONNECTED: &str = "OnDBusSignalConnected";

struct ProxyMethod {
    name: String,
    inputs: Vec<ResolvedArgument>,
    outputs: Vec<ResolvedArgument>,
}

struct ProxySignal {
    name: String,
    arguments: Vec<ResolvedArgument>,
}

/// Generates `<Name>Proxy` headers
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyGenerator;

impl ProxyGenerator {
    pub fn new() -> Self {
        Self
    }

    fn resolve(
        &self,
        interface: &Interface,
    ) -> Result<(Vec<ProxyMethod>, Vec<ProxySignal>), CodegenError> {
        let methods = interface
            .methods
            .iter()
            .map(|method| -> Result<ProxyMethod, CodegenError> {
                debug!(method = %method.name, "resolving proxy method");
                Ok(ProxyMethod {
                    name: method.name.clone(),
                    inputs: resolve_arguments(
                        &format!("method {} input", method.name),
                        &method.input_arguments,
                    )?,
                    outputs: resolve_arguments(
                        &format!("method {} output", method.name),
                        &method.output_arguments,
                    )?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let signals = interface
            .signals
            .iter()
            .map(|signal| -> Result<ProxySignal, CodegenError> {
                Ok(ProxySignal {
                    name: signal.name.clone(),
                    arguments: resolve_arguments(
                        &format!("signal {}", signal.name),
                        &signal.arguments,
                    )?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((methods, signals))
    }

    fn check_symbols(
        &self,
        interface: &Interface,
        methods: &[ProxyMethod],
        signals: &[ProxySignal],
    ) -> Result<(), CodegenError> {
        let proxy = naming::proxy_class_name(interface);

        let mut proxy_scope = ScopeSymbols::new(proxy.as_str());
        claim(&mut proxy_scope, &proxy, "the class itself")?;
        claim(&mut proxy_scope, SIGNAL_RECEIVER, "the signal receiver")?;
        claim(&mut proxy_scope, SIGNAL_CONNECTED, "the signal connection callback")?;
        claim(&mut proxy_scope, "bus_", "the bus member")?;
        claim(&mut proxy_scope, "service_name_", "the service name member")?;
        claim(&mut proxy_scope, "object_path_", "the object path member")?;
        claim(&mut proxy_scope, "dbus_object_proxy_", "the object proxy member")?;
        for method in methods {
            claim(&mut proxy_scope, &method.name, &format!("method {}", method.name))?;
        }

        let mut receiver_scope = ScopeSymbols::new(format!("{}::{}", proxy, SIGNAL_RECEIVER));
        claim(&mut receiver_scope, SIGNAL_RECEIVER, "the class itself")?;
        for signal in signals {
            claim(
                &mut receiver_scope,
                &naming::signal_handler_name(&signal.name),
                &format!("signal {}", signal.name),
            )?;
        }
        Ok(())
    }

    fn add_signal_receiver(&self, text: &mut IndentedText, signals: &[ProxySignal]) {
        text.add_line(format!("class {} {{", SIGNAL_RECEIVER));
        text.add_line(" public:");
        text.push_offset(2);
        for signal in signals {
            let handler = naming::signal_handler_name(&signal.name);
            if signal.arguments.is_empty() {
                text.add_line(format!("virtual void {}() {{}}", handler));
                continue;
            }
            text.add_line(format!("virtual void {}(", handler));
            let params: Vec<String> = signal
                .arguments
                .iter()
                .map(|a| format!("{}{}", a.cpp.in_param(), a.name_comment()))
                .collect();
            text.add_list(&params, ",", ") {}", 4);
        }
        text.pop_offset();
        text.add_line("};");
    }

    fn add_constructor(&self, text: &mut IndentedText, interface: &Interface, signals: &[ProxySignal]) {
        let proxy = naming::proxy_class_name(interface);

        text.add_line(format!("{}(", proxy));
        text.push_offset(4);
        text.add_line("const scoped_refptr<dbus::Bus>& bus,");
        text.add_line("const std::string& service_name,");
        text.add_line("const std::string& object_path,");
        text.add_line(format!("{}* signal_receiver)", SIGNAL_RECEIVER));
        text.add_line(": bus_(bus),");
        text.push_offset(2);
        text.add_line("service_name_(service_name),");
        text.add_line("object_path_(object_path),");
        text.add_line("dbus_object_proxy_(");
        text.add_line_with_offset("bus_->GetObjectProxy(service_name_, object_path_)) {", 4);
        text.pop_offset();
        text.pop_offset();

        text.push_offset(2);
        for signal in signals {
            text.add_line("chromeos::dbus_utils::ConnectToSignal(");
            text.push_offset(4);
            text.add_line("dbus_object_proxy_,");
            text.add_line(format!("\"{}\",", interface.name));
            text.add_line(format!("\"{}\",", signal.name));
            text.add_line("base::Bind(");
            text.add_line_with_offset(
                format!(
                    "&{}::{},",
                    SIGNAL_RECEIVER,
                    naming::signal_handler_name(&signal.name)
                ),
                4,
            );
            text.add_line_with_offset("base::Unretained(signal_receiver)),", 4);
            text.add_line("base::Bind(");
            text.add_line_with_offset(format!("&{}::{},", proxy, SIGNAL_CONNECTED), 4);
            text.add_line_with_offset("base::Unretained(this)));", 4);
            text.pop_offset();
        }
        text.pop_offset();
        text.add_line("}");
    }

    fn add_destructor(&self, text: &mut IndentedText, interface: &Interface) {
        text.add_line(format!("virtual ~{}() {{", naming::proxy_class_name(interface)));
        text.push_offset(2);
        text.add_line("dbus_object_proxy_->Detach();");
        text.add_line("bus_->RemoveObjectProxy(service_name_, object_path_, base::Closure());");
        text.pop_offset();
        text.add_line("}");
    }

    fn add_signal_connected_callback(&self, text: &mut IndentedText) {
        text.add_line(format!("void {}(", SIGNAL_CONNECTED));
        text.push_offset(4);
        text.add_line("const std::string& interface,");
        text.add_line("const std::string& signal,");
        text.add_line("bool success) {");
        text.pop_offset();
        text.push_offset(2);
        text.add_line("if (!success) {");
        text.push_offset(2);
        text.add_line("LOG(ERROR)");
        text.push_offset(4);
        text.add_line("<< \"Failed to connect to \" << interface << \".\" << signal");
        text.add_line("<< \" for \" << service_name_ << \" at \"");
        text.add_line("<< object_path_.value();");
        text.pop_offset();
        text.pop_offset();
        text.add_line("}");
        text.pop_offset();
        text.add_line("}");
    }

    fn add_method(&self, text: &mut IndentedText, interface: &Interface, method: &ProxyMethod) {
        let style = return_style(&method.outputs);
        let return_type = match style {
            ReturnStyle::Value(output) => output.cpp.expr.clone(),
            ReturnStyle::Void | ReturnStyle::OutParams => "void".to_string(),
        };
        text.add_line(format!("virtual {} {}(", return_type, method.name));

        let mut params: Vec<String> = method
            .inputs
            .iter()
            .map(|a| format!("{} {}_in", a.cpp.in_param(), a.name))
            .collect();
        let out_names: Vec<String> = match style {
            ReturnStyle::OutParams => method.outputs.iter().map(|a| format!("{}_out", a.name)).collect(),
            ReturnStyle::Void | ReturnStyle::Value(_) => Vec::new(),
        };
        if let ReturnStyle::OutParams = style {
            for (output, name) in method.outputs.iter().zip(&out_names) {
                params.push(format!("{} {}", output.cpp.out_param(), name));
            }
        }
        params.push("chromeos::ErrorPtr* error".to_string());
        text.add_list(&params, ",", ") {", 4);

        text.push_offset(2);
        text.add_line("auto response = chromeos::dbus_utils::CallMethodAndBlock(");
        let mut call_args = vec![
            "dbus_object_proxy_".to_string(),
            format!("\"{}\"", interface.name),
            format!("\"{}\"", method.name),
            "error".to_string(),
        ];
        call_args.extend(method.inputs.iter().map(|a| format!("{}_in", a.name)));
        text.add_list(&call_args, ",", ");", 4);

        let mut extract_args = vec!["response.get()".to_string(), "error".to_string()];
        match style {
            ReturnStyle::Value(output) => {
                text.add_line(format!("{} result{{}};", output.cpp.expr));
                text.add_line("if (!response) {");
                text.add_line_with_offset("return result;", 2);
                text.add_line("}");
                extract_args.push("&result".to_string());
            }
            ReturnStyle::Void | ReturnStyle::OutParams => {
                text.add_line("if (!response) {");
                text.add_line_with_offset("return;", 2);
                text.add_line("}");
                extract_args.extend(out_names);
            }
        }
        text.add_line("chromeos::dbus_utils::ExtractMethodCallResults(");
        text.add_line_with_offset(format!("{});", extract_args.join(", ")), 4);
        if let ReturnStyle::Value(_) = style {
            text.add_line("return result;");
        }
        text.pop_offset();
        text.add_line("}");
    }

    fn add_proxy_class(
        &self,
        text: &mut IndentedText,
        interface: &Interface,
        methods: &[ProxyMethod],
        signals: &[ProxySignal],
    ) -> Result<(), CodegenError> {
        let proxy = naming::proxy_class_name(interface);

        text.open_scope(format!("class {} {{", proxy), "};");
        text.add_line(" public:");
        text.push_offset(2);
        self.add_signal_receiver(text, signals);
        self.add_constructor(text, interface, signals);
        self.add_destructor(text, interface);
        self.add_signal_connected_callback(text);
        for method in methods {
            self.add_method(text, interface, method);
        }
        text.pop_offset();
        text.add_blank_line();

        text.add_line(" private:");
        text.push_offset(2);
        text.add_line("scoped_refptr<dbus::Bus> bus_;");
        text.add_line("std::string service_name_;");
        text.add_line("dbus::ObjectPath object_path_;");
        text.add_line("dbus::ObjectProxy* dbus_object_proxy_;");
        text.add_blank_line();
        text.add_line(format!("DISALLOW_COPY_AND_ASSIGN({});", proxy));
        text.pop_offset();
        text.close_scope()
    }
}

impl HeaderGenerator for ProxyGenerator {
    fn kind(&self) -> &'static str {
        "proxy"
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
        self.add_proxy_class(&mut body, interface, &methods, &signals)?;
        header::close_namespaces(&mut body, &namespaces)?;

        let mut text = IndentedText::new();
        header::wrap_header(&mut text, BANNER, interface, output, &body)?;
        text.finish()
    }
}
