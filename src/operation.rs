//! Resolution of inbound requests to the operations of an OpenAPI document.
//!
//! An [`OperationRouter`] keeps one [`PathRegistry`] per request method, the
//! way an OpenAPI document groups operations under path items:
//!
//! ```rust
//! use http::Method;
//! use path_registry::operation::OperationRouter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = OperationRouter::with_base_path("/services/rest/ping/v1");
//! router.register(Method::PUT, "/ping/{id}", "doPing")?;
//! router.register(Method::GET, "/pong/{id}", "doPong")?;
//!
//! let ping = router.resolve(&Method::PUT, "/services/rest/ping/v1/ping/42")?;
//! assert_eq!(ping.operation_id(), "doPing");
//! assert_eq!(ping.api_path(), "/ping/{id}");
//! assert_eq!(ping.full_path(), "/services/rest/ping/v1/ping/{id}");
//!
//! router.set_root_context_path("/root");
//! let ping = router.resolve(&Method::PUT, "/root/services/rest/ping/v1/ping/42")?;
//! assert_eq!(ping.full_path(), "/root/services/rest/ping/v1/ping/{id}");
//! # Ok(())
//! # }
//! ```
use crate::error::{InsertError, MatchError};
use crate::registry::PathRegistry;
use crate::segment::{self, Segment};

use http::Method;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A declared operation: where it lives and how it is identified.
///
/// Two operations are equal if they share the operation id, the method and
/// the template structure. Variable names are not compared, so `/pet/{id}`
/// and `/pet/{petId}` declare the same operation.
#[derive(Debug, Clone)]
pub struct OperationPath {
    operation_id: String,
    method: Method,
    api_path: String,
    context_path: String,
}

impl OperationPath {
    /// The `operationId` of the operation.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// The request method the operation is declared for.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path template as written in the document, e.g. `/pet/{petId}`.
    pub fn api_path(&self) -> &str {
        &self.api_path
    }

    /// The prefix the operation is currently served under, empty if none.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// The context path followed by the api path.
    pub fn full_path(&self) -> String {
        format!("{}{}", self.context_path, self.api_path)
    }

    // The template with variable names erased.
    fn shape(&self) -> impl Iterator<Item = Option<&str>> {
        segment::template(&self.api_path).map(|segment| match segment {
            Segment::Literal(literal) => Some(literal),
            Segment::Variable(_) => None,
        })
    }
}

impl PartialEq for OperationPath {
    fn eq(&self, other: &Self) -> bool {
        self.operation_id == other.operation_id
            && self.method == other.method
            && self.shape().eq(other.shape())
    }
}

impl Eq for OperationPath {}

impl Hash for OperationPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operation_id.hash(state);
        self.method.hash(state);
        for segment in self.shape() {
            segment.hash(state);
        }
    }
}

impl fmt::Display for OperationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.full_path(), self.operation_id)
    }
}

/// What to do when a registration conflicts with an operation that is
/// already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Fail the registration.
    Strict,
    /// Skip the registration and log a warning.
    #[default]
    Report,
    /// Skip the registration silently.
    Ignore,
}

/// Maps `(method, request path)` pairs to declared operations.
///
/// Request paths must carry the router's context path, which is the root
/// context path followed by the base path of the document. Changing either
/// part updates every registered operation.
pub struct OperationRouter {
    trees: HashMap<Method, PathRegistry<String>>,
    operations: HashMap<String, OperationPath>,

    base_path: String,
    root_context_path: String,
    neglect_base_path: bool,
    context_path: String,

    /// How conflicting registrations are handled.
    pub conflict_policy: ConflictPolicy,

    /// If enabled, a request whose path is only registered for other methods
    /// fails with [`MatchError::MethodNotAllowed`] instead of
    /// [`MatchError::NotFound`].
    pub handle_method_not_allowed: bool,
}

impl Default for OperationRouter {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
            operations: HashMap::new(),
            base_path: String::new(),
            root_context_path: String::new(),
            neglect_base_path: false,
            context_path: String::new(),
            conflict_policy: ConflictPolicy::default(),
            handle_method_not_allowed: true,
        }
    }
}

impl OperationRouter {
    /// Construct a router without a context path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a router for a document served below `base_path`.
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        let mut router = Self::default();
        router.set_base_path(base_path);
        router
    }

    /// The base path of the document, e.g. `/api/v3`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// A prefix placed in front of the base path, e.g. when the document is
    /// deployed below some other application root.
    pub fn root_context_path(&self) -> &str {
        &self.root_context_path
    }

    /// Whether the base path is left out of the context path.
    pub fn neglect_base_path(&self) -> bool {
        self.neglect_base_path
    }

    /// The prefix every request path must carry: the root context path
    /// followed by the base path, without trailing slashes. Empty if neither
    /// is set.
    ///
    /// For example, with a context path of `/api/v3` the request path
    /// `/api/v3/pet/1` is resolved as `/pet/1`, and `/pet/1` is not found.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Sets the base path of the document. An empty path or `/` clears it.
    pub fn set_base_path(&mut self, base_path: impl Into<String>) {
        self.base_path = base_path.into();
        self.reinitialize();
    }

    /// Sets the root context path. An empty path or `/` clears it.
    pub fn set_root_context_path(&mut self, root_context_path: impl Into<String>) {
        self.root_context_path = root_context_path.into();
        self.reinitialize();
    }

    /// If enabled, only the root context path prefixes request paths.
    pub fn set_neglect_base_path(&mut self, neglect_base_path: bool) {
        self.neglect_base_path = neglect_base_path;
        self.reinitialize();
    }

    // Derives the context path and moves every registered operation under it.
    fn reinitialize(&mut self) {
        let mut context = String::new();
        let base = if self.neglect_base_path { "" } else { self.base_path.as_str() };

        for part in [self.root_context_path.as_str(), base] {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                context.push('/');
                context.push_str(part);
            }
        }

        debug!("context path set to '{}'", context);
        for operation in self.operations.values_mut() {
            operation.context_path.clone_from(&context);
        }

        self.context_path = context;
    }

    /// Registers an operation under a path template.
    ///
    /// Returns `Ok(true)` if the operation is registered, including when the
    /// same operation was registered before, possibly with other variable
    /// names. A registration that conflicts with a different operation (same
    /// method and template, or same operation id) fails under
    /// [`ConflictPolicy::Strict`] and returns `Ok(false)` otherwise.
    pub fn register(
        &mut self,
        method: Method,
        api_path: &str,
        operation_id: &str,
    ) -> Result<bool, InsertError> {
        let operation = OperationPath {
            operation_id: operation_id.to_owned(),
            method: method.clone(),
            api_path: api_path.to_owned(),
            context_path: self.context_path.clone(),
        };

        if let Some(existing) = self.operations.get(operation_id) {
            if *existing != operation {
                let err = InsertError::DuplicateOperation {
                    id: operation_id.to_owned(),
                };
                return self.reject(&operation, err);
            }
        }

        let tree = self.trees.entry(method).or_default();
        if let Err(err) = tree.try_insert(api_path, operation.operation_id.clone()) {
            return self.reject(&operation, err);
        }

        debug!("registered operation {}", operation);
        self.operations
            .entry(operation.operation_id.clone())
            .or_insert(operation);
        Ok(true)
    }

    fn reject(&self, operation: &OperationPath, err: InsertError) -> Result<bool, InsertError> {
        match self.conflict_policy {
            ConflictPolicy::Strict => Err(err),
            ConflictPolicy::Report => {
                warn!("skipping operation {}: {}", operation, err);
                Ok(false)
            }
            ConflictPolicy::Ignore => {
                debug!("skipping operation {}: {}", operation, err);
                Ok(false)
            }
        }
    }

    /// Resolves a request to the operation declared for it.
    ///
    /// The request path must start with the context path, if any. Literal
    /// segments of a template are preferred over variables, so with both
    /// `/pet/findByStatus` and `/pet/{petId}` registered, `/pet/findByStatus`
    /// resolves to the former.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<&OperationPath, MatchError> {
        let api_path = self.strip_context(path).ok_or(MatchError::NotFound)?;

        if let Some(operation) = self
            .trees
            .get(method)
            .and_then(|tree| tree.search(api_path))
            .and_then(|id| self.operations.get(id))
        {
            trace!("{} {} resolved to {}", method, path, operation);
            return Ok(operation);
        }

        if self.handle_method_not_allowed {
            let allowed = self.allowed(path);
            if !allowed.is_empty() {
                return Err(MatchError::MethodNotAllowed { allowed });
            }
        }

        Err(MatchError::NotFound)
    }

    /// Returns the operation registered under the given id.
    pub fn operation(&self, operation_id: &str) -> Option<&OperationPath> {
        self.operations.get(operation_id)
    }

    /// Returns the methods a request path is registered for, sorted by name.
    pub fn allowed(&self, path: &str) -> Vec<Method> {
        let api_path = match self.strip_context(path) {
            Some(api_path) => api_path,
            None => return Vec::new(),
        };

        let mut allowed = self
            .trees
            .iter()
            .filter(|(_, tree)| tree.contains(api_path))
            .map(|(method, _)| method.clone())
            .collect::<Vec<_>>();

        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }

    /// Returns `true` if the request path belongs to any registered
    /// operation, whatever its method.
    pub fn matches(&self, path: &str) -> bool {
        self.strip_context(path)
            .is_some_and(|api_path| self.trees.values().any(|tree| tree.contains(api_path)))
    }

    /// Returns the number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if no operation is registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    // The request path relative to the context path. The prefix must end on
    // a segment boundary: `/api` strips from `/api/pet`, not from `/apis`.
    fn strip_context<'p>(&self, path: &'p str) -> Option<&'p str> {
        let context = self.context_path.as_str();
        let rest = path.strip_prefix(context)?;

        if context.is_empty() || rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

impl fmt::Debug for OperationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations = self.operations.values().collect::<Vec<_>>();
        operations.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));

        f.debug_struct("OperationRouter")
            .field("context_path", &self.context_path)
            .field("conflict_policy", &self.conflict_policy)
            .field("handle_method_not_allowed", &self.handle_method_not_allowed)
            .field("operations", &operations)
            .finish()
    }
}
