use crate::error::Rejection;
use crate::registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Decide whether a file with the given name, size and resolved type may be
/// attached. The type check runs before the size check.
pub fn validate(name: &str, size: u64, content_type: &str, max_size: u64) -> Verdict {
    if !registry::is_allowed(content_type) {
        return Verdict::Rejected(Rejection::unsupported_type(name));
    }
    if size > max_size {
        return Verdict::Rejected(Rejection::file_too_large(name, max_size));
    }
    Verdict::Accepted
}
