//! Catalog backend implementations.
//!
//! # Available Backends
//!
//! - [`RestCatalog`] - The comics/characters REST API over HTTP
//!
//! Any other backend (fixtures, a cache in front of the API) only needs to
//! implement [`Catalog`](crate::catalog::Catalog).

pub mod rest;

pub use rest::RestCatalog;
