//! Endpoint path rewriting.
//!
//! # Design Decisions
//! - Rules are scanned in declared order; the first matching prefix wins
//! - First match, not longest match: scanning stops immediately
//! - Unmatched paths pass through unmodified
//! - No regex to guarantee O(n) matching

use crate::config::schema::RewriteRule;

/// Rewrite a request path against the ordered rule set.
///
/// A matched prefix is replaced once; the remainder of the path is kept.
/// When the replacement ends with '/' and the remainder begins with one, the
/// seam is collapsed so `/status/<id>` maps onto the sub-resource path
/// `/v1/generations/<id>`.
pub fn rewrite_path(rules: &[RewriteRule], path: &str) -> String {
    for rule in rules {
        if let Some(suffix) = path.strip_prefix(rule.prefix.as_str()) {
            if rule.upstream_prefix.ends_with('/') && suffix.starts_with('/') {
                return format!("{}{}", rule.upstream_prefix, &suffix[1..]);
            }
            return format!("{}{}", rule.upstream_prefix, suffix);
        }
    }
    path.to_string()
}
