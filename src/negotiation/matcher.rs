//! Representation matching
//!
//! Pairs client media ranges with the server's representations and yields
//! deduplicated candidates lazily, client preference first and server order
//! second.

use std::collections::HashSet;

use super::accept::{AcceptHeader, MediaRange, WILDCARD};

/// A server-declared content type and the file extensions that store it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    pub main_type: String,
    pub subtype: String,
    pub extensions: Vec<String>,
}

impl Representation {
    pub fn new<I, S>(main_type: impl Into<String>, subtype: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            main_type: main_type.into(),
            subtype: subtype.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// `type/subtype`
    pub fn content_type(&self) -> String {
        format!("{}/{}", self.main_type, self.subtype)
    }
}

/// A negotiated content type ready to be looked up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub content_type: String,
    pub extensions: &'a [String],
}

/// Whether `range` accepts `representation`
///
/// Exact matches always count. Wildcards (`*/sub`, `type/*`, `*/*`) only count
/// outside strict mode.
pub fn matches(range: &MediaRange, representation: &Representation, strict: bool) -> bool {
    if range.main_type == representation.main_type && range.subtype == representation.subtype {
        return true;
    }
    if strict {
        return false;
    }

    match (range.main_type == WILDCARD, range.subtype == WILDCARD) {
        (true, true) => true,
        (true, false) => range.subtype == representation.subtype,
        (false, true) => range.main_type == representation.main_type,
        (false, false) => false,
    }
}

/// Lazy candidate sequence produced by [`match_accept`]
///
/// The set of emitted content types spans the whole pass: once a content type
/// has been yielded for some media range it is never yielded again, even for
/// a later, lower-quality range.
#[derive(Debug)]
pub struct Matches<'a> {
    representations: &'a [Representation],
    ranges: std::vec::IntoIter<MediaRange>,
    current: Option<MediaRange>,
    position: usize,
    strict: bool,
    seen: HashSet<String>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let representations: &'a [Representation] = self.representations;

        loop {
            if self.current.is_none() {
                self.current = Some(self.ranges.next()?);
                self.position = 0;
            }
            let range = self.current.as_ref()?;

            while let Some(representation) = representations.get(self.position) {
                self.position += 1;
                if matches(range, representation, self.strict)
                    && self.seen.insert(representation.content_type())
                {
                    return Some(Candidate {
                        content_type: representation.content_type(),
                        extensions: &representation.extensions,
                    });
                }
            }

            self.current = None;
        }
    }
}

/// Match parsed client preferences against the server's representations
pub fn match_accept(
    representations: &[Representation],
    accept: AcceptHeader,
    strict: bool,
) -> Matches<'_> {
    Matches {
        representations,
        ranges: accept.into_iter(),
        current: None,
        position: 0,
        strict,
        seen: HashSet::new(),
    }
}
