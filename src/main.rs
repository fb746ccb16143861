use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chromeos_dbus_bindings::{
    parse_interface_file, AdaptorGenerator, HeaderGenerator, Interface, MethodNameGenerator,
    ProxyGenerator,
};

#[derive(Parser)]
#[command(name = "generate-chromeos-dbus-bindings")]
#[command(about = "Generate libchrome D-Bus C++ bindings from introspection XML", long_about = None)]
struct Cli {
    /// The input XML interface file
    #[arg(long)]
    input: PathBuf,

    /// Output header with string constants for each member name
    #[arg(long, value_name = "FILE")]
    method_names: Option<PathBuf>,

    /// Output header with the D-Bus adaptor class
    #[arg(long, value_name = "FILE")]
    adaptor: Option<PathBuf>,

    /// Output header with the D-Bus proxy class
    #[arg(long, value_name = "FILE")]
    proxy: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let interface = match parse_interface_file(&cli.input) {
        Ok(interface) => interface,
        Err(e) => {
            error!(input = %cli.input.display(), "failed to parse interface file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        interface = %interface.name,
        methods = interface.methods.len(),
        signals = interface.signals.len(),
        properties = interface.properties.len(),
        "parsed interface"
    );

    let mut failures = 0;
    if let Some(path) = &cli.method_names {
        failures += run(&MethodNameGenerator::new(), &interface, path);
    }
    if let Some(path) = &cli.adaptor {
        failures += run(&AdaptorGenerator::new(), &interface, path);
    }
    if let Some(path) = &cli.proxy {
        failures += run(&ProxyGenerator::new(), &interface, path);
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Run one generator, returning the number of failures (0 or 1)
fn run(generator: &dyn HeaderGenerator, interface: &Interface, output: &Path) -> usize {
    info!(output = %output.display(), "outputting {}", generator.kind());
    match generator.generate(interface, output) {
        Ok(()) => 0,
        Err(e) => {
            error!(output = %output.display(), "failed to output {}: {}", generator.kind(), e);
            1
        }
    }
}
