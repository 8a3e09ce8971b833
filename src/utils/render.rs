//! Rendering of dashboard data files.
//!
//! The front end loads plain `<script>` files, so each data set is written as
//! a single global assignment: `var <name> = <json>;`.

use crate::error::SyncResult;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Serialize `value` as JSON indented with four spaces
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> SyncResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| crate::error::Error::Serialization(e.to_string()))
}

/// Render `var <name> = <json>;`
pub fn render_assignment<T: Serialize + ?Sized>(var_name: &str, value: &T) -> SyncResult<String> {
    Ok(format!("var {} = {};", var_name, to_pretty_json(value)?))
}

/// Render and write a data file, replacing any previous version in one step.
///
/// The content goes to a sibling temporary file first and is renamed over the
/// target, so readers only ever see the old file or the complete new one.
pub fn write_assignment<T: Serialize + ?Sized>(
    path: &Path,
    var_name: &str,
    value: &T,
) -> SyncResult<()> {
    let content = render_assignment(var_name, value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let written = fs::write(tmp_path, content).and_then(|()| fs::rename(tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(tmp_path);
        return Err(e.into());
    }

    debug!("Wrote {} to {}", var_name, path.display());
    Ok(())
}
