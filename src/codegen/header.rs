//! Header scaffolding shared by every generator and atomic output

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::indented_text::IndentedText;
use crate::error::{BindingsError, CodegenError};
use crate::interface::Interface;

/// Include guard unique to the interface and output path.
///
/// ASCII letters are upper-cased, digits kept, everything else becomes `_`.
pub fn header_guard(output: &Path, interface_name: &str) -> String {
    format!(
        "____chromeos_dbus_binding___{}__{}",
        interface_name,
        output.display()
    )
    .chars()
    .map(|c| {
        if c.is_ascii_alphabetic() {
            c.to_ascii_uppercase()
        } else if c.is_ascii_digit() {
            c
        } else {
            '_'
        }
    })
    .collect()
}

/// Banner, include guard and the caller's body, in that order.
///
/// The body must have closed every scope it opened.
pub fn wrap_header(
    text: &mut IndentedText,
    banner: &str,
    interface: &Interface,
    output: &Path,
    body: &IndentedText,
) -> Result<(), CodegenError> {
    if body.open_scopes() > 0 {
        return Err(CodegenError::UnbalancedScopes {
            open: body.open_scopes(),
        });
    }
    let guard = header_guard(output, &interface.name);
    text.add_line(format!("// {}", banner));
    text.add_line(format!("//  - {}", interface.name));
    text.add_line(format!("#ifndef {}", guard));
    text.add_line(format!("#define {}", guard));
    text.add_block(body);
    text.add_line(format!("#endif  // {}", guard));
    Ok(())
}

/// Open one `namespace` per entry, followed by a blank line
pub fn open_namespaces(text: &mut IndentedText, namespaces: &[&str]) {
    for namespace in namespaces {
        text.open_scope(
            format!("namespace {} {{", namespace),
            format!("}}  // namespace {}", namespace),
        );
    }
    if !namespaces.is_empty() {
        text.add_blank_line();
    }
}

/// Close the namespaces opened by [`open_namespaces`], innermost first
pub fn close_namespaces(text: &mut IndentedText, namespaces: &[&str]) -> Result<(), CodegenError> {
    if !namespaces.is_empty() {
        text.add_blank_line();
    }
    for _ in namespaces {
        text.close_scope()?;
    }
    Ok(())
}

/// Write `contents` to a temporary file beside `output`, then move it over
/// `output` so readers never observe a partial file.
pub fn write_atomically(output: &Path, contents: &str) -> Result<(), BindingsError> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(directory).map_err(|e| BindingsError::io(directory, e))?;
    debug!(temp = %temp.path().display(), "writing generated header");

    temp.write_all(contents.as_bytes())
        .map_err(|e| BindingsError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| BindingsError::io(temp.path(), e))?;
    set_readable(temp.as_file()).map_err(|e| BindingsError::io(temp.path(), e))?;

    temp.persist(output)
        .map_err(|e| BindingsError::io(output, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_readable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
