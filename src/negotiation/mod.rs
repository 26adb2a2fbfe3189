//! Content negotiation
//!
//! Parses the client's Accept header and ranks the server's representations
//! against it. The output is a lazy sequence of candidates, so the resolver can
//! stop at the first one that exists on disk.

pub mod accept;
pub mod matcher;

pub use accept::{AcceptHeader, MediaRange, WILDCARD};
pub use matcher::{match_accept, matches, Candidate, Matches, Representation};

/// Accept value assumed when the request carries no Accept header
pub const DEFAULT_ACCEPT: &str = "*/*";

/// Negotiate candidates for a request
///
/// An absent header is treated as [`DEFAULT_ACCEPT`].
///
/// # Examples
/// ```
/// use autoneg::negotiation::{negotiate, Representation};
///
/// let reprs = vec![
///     Representation::new("text", "html", ["html"]),
///     Representation::new("text", "plain", ["txt"]),
/// ];
/// let first = negotiate(&reprs, Some("text/plain, text/html;q=0.9"), false).next();
/// assert_eq!(first.map(|c| c.content_type).as_deref(), Some("text/plain"));
/// ```
pub fn negotiate<'a>(
    representations: &'a [Representation],
    accept: Option<&str>,
    strict: bool,
) -> Matches<'a> {
    let accept = AcceptHeader::parse(accept.unwrap_or(DEFAULT_ACCEPT));
    match_accept(representations, accept, strict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_header_matches_everything() {
        let reprs = vec![
            Representation::new("text", "html", ["html"]),
            Representation::new("application", "json", ["json"]),
        ];
        let types: Vec<_> = negotiate(&reprs, None, false).map(|c| c.content_type).collect();
        assert_eq!(types, ["text/html", "application/json"]);
    }

    #[test]
    fn test_absent_header_in_strict_mode() {
        // */* is a wildcard, so strict mode accepts nothing without a header
        let reprs = vec![Representation::new("text", "html", ["html"])];
        assert_eq!(negotiate(&reprs, None, true).count(), 0);
    }

    #[test]
    fn test_unparsable_header_is_not_defaulted() {
        let reprs = vec![Representation::new("text", "html", ["html"])];
        assert_eq!(negotiate(&reprs, Some("bogus"), false).count(), 0);
    }
}
