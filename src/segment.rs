use std::str::Split;

/// A single `/`-delimited piece of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Matched verbatim against the request segment.
    Literal(&'a str),
    /// `{name}`, matches any single request segment.
    Variable(&'a str),
}

impl<'a> Segment<'a> {
    /// Classifies a template segment. Only a segment wrapped entirely in
    /// braces is a variable, anything else (`{id`, `a{id}`) is literal text.
    pub(crate) fn parse(segment: &'a str) -> Segment<'a> {
        if segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}') {
            Segment::Variable(&segment[1..segment.len() - 1])
        } else {
            Segment::Literal(segment)
        }
    }
}

/// The non-empty segments of a path.
///
/// Leading, trailing and doubled slashes produce no segments, so `/a/b`,
/// `a/b/` and `/a//b` all yield `["a", "b"]`. The iterator is cheap to
/// clone, which the backtracking search relies on.
#[derive(Clone)]
pub(crate) struct Segments<'a> {
    inner: Split<'a, char>,
}

impl<'a> Segments<'a> {
    pub(crate) fn new(path: &'a str) -> Segments<'a> {
        Segments {
            inner: path.split('/'),
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|segment| !segment.is_empty())
    }
}

/// The segments of a path template, classified.
pub(crate) fn template(path: &str) -> impl Iterator<Item = Segment<'_>> + Clone {
    Segments::new(path).map(Segment::parse)
}
