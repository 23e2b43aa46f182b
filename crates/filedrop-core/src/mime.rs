//! Content type resolution for incoming files.

use crate::registry::{self, OCTET_STREAM};

/// Resolve the content type of a file.
///
/// A non-empty type reported by the platform is trusted verbatim. Otherwise
/// the lowercased extension of `name` is looked up in the registry, falling
/// back to `application/octet-stream`. Never fails; unsupported results are
/// left for the validator to reject.
pub fn resolve(name: &str, platform_type: Option<&str>) -> String {
    if let Some(t) = platform_type.filter(|t| !t.is_empty()) {
        return t.to_string();
    }
    extension_of(name)
        .map(|ext| registry::resolve_from_extension(&ext))
        .unwrap_or(OCTET_STREAM)
        .to_string()
}

/// Lowercased text after the last `.` of `name`, if there is a dot.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}
