//! Accept header parsing
//!
//! Turns a raw `Accept` header into media ranges ordered by client preference.
//! Parsing never fails: segments that do not look like `type/subtype[;q=value]`
//! are dropped.

/// Wildcard token allowed in either half of a media range
pub const WILDCARD: &str = "*";

/// One client preference from an Accept header
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub main_type: String,
    pub subtype: String,
    /// Preference weight in `[0, 1]`
    pub quality: f64,
}

impl MediaRange {
    pub fn new(main_type: impl Into<String>, subtype: impl Into<String>, quality: f64) -> Self {
        Self {
            main_type: main_type.into(),
            subtype: subtype.into(),
            quality,
        }
    }

    /// Parse a single, already trimmed header segment
    ///
    /// Only a `q` parameter is understood. Anything else makes the segment
    /// unparsable, as does a quality outside `[0, 1]`.
    pub fn parse(segment: &str) -> Option<Self> {
        let (range, params) = match segment.split_once(';') {
            Some((range, params)) => (range, Some(params)),
            None => (segment, None),
        };

        let (main_type, subtype) = range.trim().split_once('/')?;
        if !is_token(main_type) || !is_token(subtype) {
            return None;
        }

        let quality = match params {
            Some(params) => parse_quality(params)?,
            None => 1.0,
        };

        Some(Self::new(main_type, subtype, quality))
    }

    /// `type/subtype` form, wildcards included
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.subtype)
    }
}

/// Client preferences in the order they should be tried
///
/// Grouped by quality, highest first. Entries sharing a quality keep their
/// left-to-right header order.
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
    ranges: Vec<MediaRange>,
}

impl AcceptHeader {
    /// Parse a raw header value
    ///
    /// # Examples
    /// ```
    /// use autoneg::negotiation::AcceptHeader;
    ///
    /// let accept = AcceptHeader::parse("text/html;q=0.8, text/plain");
    /// let order: Vec<String> = accept.iter().map(|r| r.essence()).collect();
    /// assert_eq!(order, ["text/plain", "text/html"]);
    /// ```
    pub fn parse(header: &str) -> Self {
        let mut ranges: Vec<MediaRange> = header
            .split(',')
            .filter_map(|segment| MediaRange::parse(segment.trim()))
            .collect();

        // sort_by is stable, so header order survives within a quality group
        ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));

        Self { ranges }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl IntoIterator for AcceptHeader {
    type Item = MediaRange;
    type IntoIter = std::vec::IntoIter<MediaRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}

impl<'a> IntoIterator for &'a AcceptHeader {
    type Item = &'a MediaRange;
    type IntoIter = std::slice::Iter<'a, MediaRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_graphic() && c != '/')
}

/// Parse the parameter part after the first `;`
fn parse_quality(params: &str) -> Option<f64> {
    let (name, value) = params.split_once('=')?;
    if name.trim() != "q" {
        return None;
    }

    let value = value.trim();
    if value.is_empty() {
        return Some(1.0);
    }
    if !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let quality: f64 = value.parse().ok()?;
    (0.0..=1.0).contains(&quality).then_some(quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essences(header: &str) -> Vec<String> {
        AcceptHeader::parse(header).iter().map(MediaRange::essence).collect()
    }

    #[test]
    fn test_implicit_quality_outranks_explicit() {
        assert_eq!(
            essences("text/html;q=0.8, text/plain"),
            ["text/plain", "text/html"]
        );
    }

    #[test]
    fn test_stable_within_quality_group() {
        assert_eq!(
            essences("a/x;q=0.5, b/y, c/z;q=0.5, d/w"),
            ["b/y", "d/w", "a/x", "c/z"]
        );
    }

    #[test]
    fn test_default_and_empty_quality() {
        let accept = AcceptHeader::parse("text/html, text/plain;q=");
        assert_eq!(accept.len(), 2);
        assert!(accept.iter().all(|r| (r.quality - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_whitespace_tolerated() {
        let accept = AcceptHeader::parse("  text/html ; q = 0.3 ,\ttext/plain\t");
        let ranges: Vec<_> = accept.iter().cloned().collect();
        assert_eq!(ranges[0], MediaRange::new("text", "plain", 1.0));
        assert_eq!(ranges[1], MediaRange::new("text", "html", 0.3));
    }

    #[test]
    fn test_malformed_segments_discarded() {
        assert_eq!(
            essences("html, text/, /plain, a/b/c, text/html;level=1, text/x;q=abc, text/y;q=1.5, text/ok"),
            ["text/ok"]
        );
    }

    #[test]
    fn test_only_garbage_yields_empty() {
        assert!(AcceptHeader::parse("garbage, ;;;, ").is_empty());
        assert!(AcceptHeader::parse("").is_empty());
    }

    #[test]
    fn test_duplicates_kept_in_their_groups() {
        let accept = AcceptHeader::parse("text/html;q=0.2, text/plain;q=0.5, text/html");
        let ranges: Vec<_> = accept.iter().cloned().collect();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], MediaRange::new("text", "html", 1.0));
        assert_eq!(ranges[1], MediaRange::new("text", "plain", 0.5));
        assert_eq!(ranges[2], MediaRange::new("text", "html", 0.2));
    }

    #[test]
    fn test_wildcards_parse() {
        let accept = AcceptHeader::parse("*/*;q=0.1, text/*");
        assert_eq!(
            accept.iter().map(MediaRange::essence).collect::<Vec<_>>(),
            ["text/*", "*/*"]
        );
    }

    #[test]
    fn test_qualities_compared_at_full_precision() {
        assert_eq!(essences("b/y;q=0.1, a/x;q=0.100000001"), ["a/x", "b/y"]);
    }

    #[test]
    fn test_non_ascii_segment_discarded() {
        assert_eq!(essences("text/plain, t\u{e9}xt/html, t\u{fffd}xt/x"), ["text/plain"]);
    }

    #[test]
    fn test_zero_quality_kept() {
        let accept = AcceptHeader::parse("text/html;q=0");
        assert_eq!(accept.len(), 1);
        assert!(accept.iter().all(|r| r.quality == 0.0));
    }
}
