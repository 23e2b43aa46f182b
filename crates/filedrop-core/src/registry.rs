//! Static allow-list of content types and the lookups built on it.
//!
//! Every function here is total: unknown input maps to a fallback rather
//! than an error, and the Validator decides what to do with it.

use crate::attachment::Category;

/// Fallback for files whose type cannot be determined.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content types accepted for upload, grouped images, documents, code.
pub const ALLOWED_TYPES: &[&str] = &[
    // Images
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
    // Documents
    "application/pdf",
    "text/plain",
    "text/markdown",
    "text/csv",
    // Code and data
    "text/javascript",
    "application/javascript",
    "text/typescript",
    "application/typescript",
    "text/html",
    "text/css",
    "application/json",
    "text/x-python",
    "text/x-java",
    "text/x-c",
    "text/x-cpp",
    "text/x-csharp",
    "text/x-go",
    "text/x-rust",
    "text/x-php",
    "text/x-ruby",
    "text/x-swift",
    "text/x-kotlin",
    "application/xml",
    "text/xml",
    "application/x-yaml",
    "text/yaml",
];

/// Types classified as documents. Everything else that is not an image is code.
pub const DOCUMENT_TYPES: &[&str] = &["application/pdf", "text/plain", "text/markdown", "text/csv"];

const EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("jsx", "text/javascript"),
    ("ts", "text/typescript"),
    ("tsx", "text/typescript"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("py", "text/x-python"),
    ("java", "text/x-java"),
    ("c", "text/x-c"),
    ("cpp", "text/x-cpp"),
    ("cc", "text/x-cpp"),
    ("cxx", "text/x-cpp"),
    ("cs", "text/x-csharp"),
    ("go", "text/x-go"),
    ("rs", "text/x-rust"),
    ("php", "text/x-php"),
    ("rb", "text/x-ruby"),
    ("swift", "text/x-swift"),
    ("kt", "text/x-kotlin"),
    ("xml", "application/xml"),
    ("yaml", "application/x-yaml"),
    ("yml", "application/x-yaml"),
];

pub fn is_allowed(content_type: &str) -> bool {
    ALLOWED_TYPES.contains(&content_type)
}

pub fn classify(content_type: &str) -> Category {
    if content_type.starts_with("image/") {
        Category::Image
    } else if DOCUMENT_TYPES.contains(&content_type) {
        Category::Document
    } else {
        Category::Code
    }
}

/// Look up a content type by file extension (without the dot), ignoring case.
pub fn resolve_from_extension(ext: &str) -> &'static str {
    EXTENSIONS
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, t)| *t)
        .unwrap_or(OCTET_STREAM)
}

/// Canonical extension for a content type. Unknown types map to `txt`.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "text/markdown" => "md",
        "text/csv" => "csv",
        "text/javascript" | "application/javascript" => "js",
        "text/typescript" | "application/typescript" => "ts",
        "text/html" => "html",
        "text/css" => "css",
        "application/json" => "json",
        "text/x-python" => "py",
        "text/x-java" => "java",
        "text/x-c" => "c",
        "text/x-cpp" => "cpp",
        "text/x-csharp" => "cs",
        "text/x-go" => "go",
        "text/x-rust" => "rs",
        "text/x-php" => "php",
        "text/x-ruby" => "rb",
        "text/x-swift" => "swift",
        "text/x-kotlin" => "kt",
        "application/xml" | "text/xml" => "xml",
        "application/x-yaml" | "text/yaml" => "yaml",
        _ => "txt",
    }
}

/// Human-readable name for a content type, e.g. `PNG`, `Python`, `YAML`.
pub fn display_name(content_type: &str) -> String {
    if let Some(subtype) = content_type.strip_prefix("image/") {
        return subtype.to_uppercase();
    }
    let name = match content_type {
        "application/pdf" => "PDF",
        "text/plain" => "Text",
        "text/markdown" => "Markdown",
        "text/csv" => "CSV",
        t if t.contains("javascript") => "JavaScript",
        t if t.contains("typescript") => "TypeScript",
        "text/html" => "HTML",
        "text/css" => "CSS",
        "application/json" => "JSON",
        "text/x-python" => "Python",
        "text/x-java" => "Java",
        "text/x-c" => "C",
        "text/x-cpp" => "C++",
        "text/x-csharp" => "C#",
        "text/x-go" => "Go",
        "text/x-rust" => "Rust",
        "text/x-php" => "PHP",
        "text/x-ruby" => "Ruby",
        "text/x-swift" => "Swift",
        "text/x-kotlin" => "Kotlin",
        t if t.contains("xml") => "XML",
        t if t.contains("yaml") => "YAML",
        _ => "File",
    };
    name.to_string()
}

/// Display names of the allow-list, deduplicated, in allow-list order.
pub fn allowed_display_names() -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for t in ALLOWED_TYPES {
        let name = display_name(t);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// The allow-list as a file-picker `accept` filter.
pub fn accept_attribute() -> String {
    ALLOWED_TYPES.join(",")
}
