use crate::error::{InsertError, MatchError};
use crate::params::Params;
use crate::segment::Segments;
use crate::tree::{Leaf, Node};

use std::fmt;

/// A registry of OpenAPI path templates.
///
/// Templates are `/`-delimited; a segment written as `{name}` is a variable
/// and matches any single request segment. The variable's name plays no part
/// in matching, so `/pet/{id}` and `/pet/{petId}` are the same template.
///
/// ```rust
/// use path_registry::PathRegistry;
///
/// let mut registry = PathRegistry::new();
/// assert!(registry.insert("/pet/findByStatus", "findPetsByStatus"));
/// assert!(registry.insert("/pet/{petId}", "getPetById"));
///
/// assert_eq!(registry.search("/pet/findByStatus"), Some(&"findPetsByStatus"));
/// assert_eq!(registry.search("/pet/42"), Some(&"getPetById"));
/// assert_eq!(registry.search("/store/inventory"), None);
/// ```
///
/// The registry is meant to be filled once and then queried. Inserting needs
/// `&mut self`, searching only `&self`, so once built it can be shared across
/// threads (e.g. behind an `Arc`) without further synchronization.
#[derive(Clone)]
pub struct PathRegistry<V> {
    root: Node<V>,
    len: usize,
}

/// A successful match of a concrete path.
#[derive(Debug)]
pub struct Match<'k, 'v, V> {
    /// The value stored for the matched template.
    pub value: &'k V,
    /// The template the value was stored under.
    pub template: &'k str,
    /// The variables of the template, bound to the request segments.
    pub params: Params<'k, 'v>,
}

impl<V> Default for PathRegistry<V> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }
}

impl<V> PathRegistry<V> {
    /// Construct a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` for a path template.
    ///
    /// Returns `true` if the template was stored, or if it was already
    /// stored with an equal value. Returns `false`, leaving the registry
    /// unchanged, if the template already holds a different value.
    ///
    /// ```rust
    /// use path_registry::PathRegistry;
    ///
    /// let mut registry = PathRegistry::new();
    /// assert!(registry.insert("/s1/{id1}", "root1"));
    /// assert!(registry.insert("/s1/{id1}", "root1"));
    /// assert!(!registry.insert("/s1/{id2}", "root2"));
    /// ```
    pub fn insert(&mut self, template: &str, value: V) -> bool
    where
        V: PartialEq,
    {
        self.try_insert(template, value).is_ok()
    }

    /// Stores `value` for a path template, reporting which template it
    /// conflicts with on failure.
    ///
    /// ```rust
    /// use path_registry::{InsertError, PathRegistry};
    ///
    /// let mut registry = PathRegistry::new();
    /// registry.try_insert("/user/{username}", 1)?;
    ///
    /// assert_eq!(
    ///     registry.try_insert("/user/{name}", 2),
    ///     Err(InsertError::Conflict { with: "/user/{username}".into() })
    /// );
    /// # Ok::<_, InsertError>(())
    /// ```
    pub fn try_insert(&mut self, template: &str, value: V) -> Result<(), InsertError>
    where
        V: PartialEq,
    {
        match self.root.insert(template, value) {
            Ok(true) => {
                trace!("registered path template '{}'", template);
                self.len += 1;
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => {
                debug!("rejected path template '{}': {}", template, err);
                Err(err)
            }
        }
    }

    /// Resolves a concrete path to the value of the most specific template.
    ///
    /// Literal segments take precedence over variables wherever both could
    /// match. If the literal branch leads nowhere, the variable branch at
    /// the same position is tried instead.
    ///
    /// ```rust
    /// use path_registry::PathRegistry;
    ///
    /// let mut registry = PathRegistry::new();
    /// registry.insert("/s1/s2", "root1");
    /// registry.insert("/s1/{id1}", "root2");
    /// registry.insert("/s1/{id1}/s3", "root3");
    ///
    /// assert_eq!(registry.search("/s1/s2"), Some(&"root1"));
    /// assert_eq!(registry.search("/s1/111"), Some(&"root2"));
    /// assert_eq!(registry.search("/s1/s2/s3"), Some(&"root3"));
    /// ```
    pub fn search(&self, path: &str) -> Option<&V> {
        self.root.find(Segments::new(path)).map(|leaf| &leaf.value)
    }

    /// Resolves a concrete path like [`search`](PathRegistry::search),
    /// returning a mutable reference to the stored value.
    pub fn search_mut(&mut self, path: &str) -> Option<&mut V> {
        self.root.find_mut(Segments::new(path)).map(|leaf| &mut leaf.value)
    }

    /// Resolves a concrete path, returning the matched template and the
    /// values bound to its variables.
    ///
    /// ```rust
    /// use path_registry::PathRegistry;
    ///
    /// let mut registry = PathRegistry::new();
    /// registry.insert("/pet/{petId}/uploadImage", "uploadFile");
    ///
    /// let matched = registry.at("/pet/12/uploadImage")?;
    /// assert_eq!(*matched.value, "uploadFile");
    /// assert_eq!(matched.template, "/pet/{petId}/uploadImage");
    /// assert_eq!(matched.params.get("petId"), Some("12"));
    /// # Ok::<_, path_registry::MatchError>(())
    /// ```
    pub fn at<'k, 'v>(&'k self, path: &'v str) -> Result<Match<'k, 'v, V>, MatchError> {
        let leaf = self
            .root
            .find(Segments::new(path))
            .ok_or(MatchError::NotFound)?;

        trace!("resolved '{}' to template '{}'", path, leaf.template);

        Ok(Match {
            value: &leaf.value,
            template: &leaf.template,
            params: Params::bind(&leaf.template, path),
        })
    }

    /// Returns `true` if some template matches the concrete path.
    pub fn contains(&self, path: &str) -> bool {
        self.search(path).is_some()
    }

    /// Returns the number of distinct templates stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no template is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the stored templates and their values, depth first with
    /// literal segments in sorted order before variables.
    pub fn iter(&self) -> Iter<'_, V> {
        let mut leaves = Vec::with_capacity(self.len);
        self.root.visit(&mut |leaf| leaves.push(leaf));

        Iter {
            inner: leaves.into_iter(),
        }
    }

    /// Moves every template of `other` into this registry.
    ///
    /// Either all templates are merged, or none are: if any template of
    /// `other` holds a value different from the one stored here for the same
    /// template, the first such conflict is returned and `self` is unchanged.
    ///
    /// ```rust
    /// use path_registry::PathRegistry;
    ///
    /// let mut pets = PathRegistry::new();
    /// pets.insert("/pet/{petId}", "getPetById");
    ///
    /// let mut store = PathRegistry::new();
    /// store.insert("/store/order/{orderId}", "getOrderById");
    ///
    /// pets.merge(store)?;
    /// assert_eq!(pets.search("/store/order/3"), Some(&"getOrderById"));
    /// # Ok::<_, path_registry::InsertError>(())
    /// ```
    pub fn merge(&mut self, other: Self) -> Result<(), InsertError>
    where
        V: PartialEq,
    {
        let mut leaves = Vec::with_capacity(other.len);
        other.root.into_leaves(&mut leaves);

        for leaf in &leaves {
            if let Some(existing) = self.root.conflict(&leaf.template, &leaf.value) {
                return Err(InsertError::Conflict {
                    with: existing.template.clone(),
                });
            }
        }

        for Leaf { template, value } in leaves {
            self.try_insert(&template, value)?;
        }

        Ok(())
    }
}

impl<V: fmt::Debug> fmt::Debug for PathRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An iterator over the templates of a [`PathRegistry`].
pub struct Iter<'a, V> {
    inner: std::vec::IntoIter<&'a Leaf<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|leaf| (leaf.template.as_str(), &leaf.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a PathRegistry<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_distinct_templates() {
        let mut registry = PathRegistry::new();

        assert!(registry.insert("/a/{x}", 1));
        assert!(registry.insert("/a/{y}", 1));
        assert!(registry.insert("/a/b", 2));
        assert!(!registry.insert("/a/{z}", 3));

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn root_template() {
        let mut registry = PathRegistry::new();
        assert!(registry.search("/").is_none());

        assert!(registry.insert("/", "root"));
        assert_eq!(registry.search("/"), Some(&"root"));
        assert_eq!(registry.search(""), Some(&"root"));
        assert!(registry.search("/a").is_none());
    }

    #[test]
    fn params_use_stored_names() {
        let mut registry = PathRegistry::new();
        registry.insert("/users/{userId}/orders/{orderId}", "order");
        registry.insert("/users/{u}/orders/{o}", "order");

        let matched = registry.at("/users/7/orders/9").unwrap();
        assert_eq!(matched.template, "/users/{userId}/orders/{orderId}");
        assert!(matched
            .params
            .iter()
            .eq(vec![("userId", "7"), ("orderId", "9")]));
    }

    #[test]
    fn merge_into_empty() {
        let mut other = PathRegistry::new();
        other.insert("/a", 1);
        other.insert("/{x}/b", 2);

        let mut registry = PathRegistry::new();
        registry.merge(other).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.search("/q/b"), Some(&2));
    }

    #[test]
    fn debug_lists_templates() {
        let mut registry = PathRegistry::new();
        registry.insert("/b", 2);
        registry.insert("/a", 1);

        assert_eq!(format!("{:?}", registry), r#"{"/a": 1, "/b": 2}"#);
    }
}
