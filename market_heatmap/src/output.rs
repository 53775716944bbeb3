//! JSON output helpers.
use std::fs;
use std::path::Path;

use market_common::Result;
use serde::Serialize;

/// Write `document` as pretty-printed JSON to `path`, creating parent
/// directories as needed.
pub fn write_json_file<T: Serialize>(path: &str, document: &T) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(document)?)?;
    Ok(())
}

/// Print `document` as single-line JSON on stdout.
pub fn print_json<T: Serialize>(document: &T) -> Result<()> {
    println!("{}", serde_json::to_string(document)?);
    Ok(())
}
