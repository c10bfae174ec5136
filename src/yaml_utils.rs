//! YAML utilities for archived session documents
//!
//! Session archives are written by external exporters and are not always
//! clean YAML:
//! - Control characters left over from upstream free-text fields
//! - A UTF-8 byte order mark at the start of the file
//! - NUL padding after the document when dumped from fixed-size buffers
//!
//! This module provides low-level cleaning without parsing.

use crate::{Result, TrackError};

/// Preprocess session YAML to fix known issues
///
/// Removes a leading byte order mark and control characters (except `\n`,
/// `\r`, `\t`). Returns the cleaned YAML string ready for parsing.
pub fn preprocess_session_yaml(yaml: &str) -> Result<String> {
    let yaml = yaml.strip_prefix('\u{feff}').unwrap_or(yaml);
    let mut result = String::with_capacity(yaml.len());

    for ch in yaml.chars() {
        match ch {
            '\x00'..='\x08' | '\x0B'..='\x0C' | '\x0E'..='\x1F' | '\x7F' => continue,
            _ => result.push(ch),
        }
    }

    if result.trim().is_empty() {
        return Err(TrackError::parse_error(
            "YAML preprocessing",
            "YAML is empty after preprocessing",
        ));
    }

    Ok(result)
}

/// Decode raw file bytes into YAML text
///
/// Stops at the first NUL byte and validates UTF-8. Returns the raw YAML
/// string without preprocessing.
pub fn decode_yaml_bytes(data: &[u8]) -> Result<String> {
    let yaml_len = data.iter().position(|&b| b == 0).unwrap_or(data.len());

    let yaml_str = std::str::from_utf8(&data[..yaml_len])
        .map_err(|e| TrackError::parse_error("YAML UTF-8 conversion", e.to_string()))?;

    Ok(yaml_str.to_string())
}
