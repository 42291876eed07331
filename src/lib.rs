//! A registry resolving concrete request paths against OpenAPI path
//! templates.
//!
//! ```rust
//! use path_registry::PathRegistry;
//!
//! let mut registry = PathRegistry::new();
//! registry.insert("/s1/s2/{id1}", "root1");
//! registry.insert("/s1/s2/{id1}/s3/{id2}", "root2");
//!
//! assert_eq!(registry.search("/s1/s2/123"), Some(&"root1"));
//! assert_eq!(registry.search("/s1/s2/123/s3/456"), Some(&"root2"));
//! ```
//!
//! Templates are split into `/`-delimited segments. A segment written as
//! `{name}` is a variable and matches any one request segment; every other
//! segment must match exactly (case-sensitive). Empty segments are ignored,
//! so `/pet/`, `pet` and `//pet` all mean `/pet`.
//!
//! Variable names do not take part in matching:
//! ```ignore
//!  /pet/{id}     same template as /pet/{petId}
//!  /pet/{id}/x   different template from /pet/x/{id}
//! ```
//!
//! Where a literal and a variable segment could both match, the literal wins,
//! unless following it cannot complete the match:
//! ```ignore
//!  Templates: /user/login, /user/{username}, /user/{username}/avatar
//!
//!  /user/login          match: /user/login
//!  /user/alice          match: /user/{username}
//!  /user/login/avatar   match: /user/{username}/avatar
//!  /user                no match
//! ```
//!
//! [`operation::OperationRouter`] builds on the registry to resolve requests
//! to the declared operations of an OpenAPI document.
#![deny(clippy::all)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod error;
pub mod operation;
mod params;
mod registry;
mod segment;
mod tree;

pub use error::{InsertError, MatchError};
pub use params::{Params, ParamsIter};
pub use registry::{Iter, Match, PathRegistry};
