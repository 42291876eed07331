use crate::segment::{self, Segment, Segments};

use std::{fmt, slice};

/// The variables bound by a match, in template order.
///
/// Names come from the template that was stored first; a template
/// registered later with different variable names resolves to the same
/// entry and reports the original names.
///
/// ```rust
/// # use path_registry::PathRegistry;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = PathRegistry::new();
/// registry.insert("/store/order/{orderId}", "getOrderById");
///
/// let matched = registry.at("/store/order/7")?;
///
/// for (key, value) in matched.params.iter() {
///     println!("key: {}, value: {}", key, value);
/// }
///
/// assert_eq!(matched.params.get("orderId"), Some("7"));
/// # Ok(())
/// # }
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Clone, Default)]
pub struct Params<'k, 'v> {
    bound: Vec<(&'k str, &'v str)>,
}

impl<'k, 'v> Params<'k, 'v> {
    // Pairs each variable of `template` with the request segment at the same
    // position. The caller guarantees `path` matched `template`, so both
    // yield the same number of segments.
    pub(crate) fn bind(template: &'k str, path: &'v str) -> Self {
        let bound = segment::template(template)
            .zip(Segments::new(path))
            .filter_map(|(segment, value)| match segment {
                Segment::Variable(name) => Some((name, value)),
                Segment::Literal(_) => None,
            })
            .collect();

        Self { bound }
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Returns the value of the first parameter registered under the given key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&'v str> {
        let key = key.as_ref();
        self.bound
            .iter()
            .find(|(name, _)| *name == key)
            .map(|&(_, value)| value)
    }

    /// Returns an iterator over the parameters in the list.
    pub fn iter(&self) -> ParamsIter<'_, 'k, 'v> {
        ParamsIter {
            inner: self.bound.iter(),
        }
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

impl fmt::Debug for Params<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An iterator over the names and values of a match's [parameters](crate::Params).
pub struct ParamsIter<'ps, 'k, 'v> {
    inner: slice::Iter<'ps, (&'k str, &'v str)>,
}

impl<'k, 'v> Iterator for ParamsIter<'_, 'k, 'v> {
    type Item = (&'k str, &'v str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ParamsIter<'_, '_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_variables_in_order() {
        let params = Params::bind(
            "/repos/{owner}/{repo}/issues/{issue}/comments/{comment}",
            "/repos/rust-lang/rust/issues/1/comments/2",
        );

        assert!(params.iter().eq(vec![
            ("owner", "rust-lang"),
            ("repo", "rust"),
            ("issue", "1"),
            ("comment", "2"),
        ]));
        assert_eq!(params.iter().len(), 4);
        assert_eq!(params.get("repo"), Some("rust"));
        assert_eq!(params.get("issues"), None);
    }

    #[test]
    fn empty_segments_do_not_shift_values() {
        let params = Params::bind("/pet//{petId}/", "//pet/10//");
        assert_eq!(params.get("petId"), Some("10"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn literal_template_binds_nothing() {
        let params = Params::bind("/store/inventory", "/store/inventory");
        assert!(params.get("").is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn empty_name_is_a_key() {
        let params = Params::bind("/files/{}", "/files/a.txt");
        assert_eq!(params.get(""), Some("a.txt"));
    }

    #[test]
    fn first_key_wins() {
        let params = Params::bind("/{id}/{id}", "/1/2");

        assert_eq!(params.get("id"), Some("1"));
        assert_eq!(params.len(), 2);
        assert_eq!(format!("{:?}", params), r#"{"id": "1", "id": "2"}"#);
    }
}
