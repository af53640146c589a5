//! # Domain Layer
//!
//! Pure data: module definitions, the module tree, paths, requests and the
//! uniform action result. Nothing here touches the reactive engine.
//!
//! ## Components
//!
//! - `module`: `RawModule` builder and handler types
//! - `tree`: `Module`, `ModuleCollection` (register/unregister/get/update)
//! - `path`: `ModulePath` and nested state lookup
//! - `request`: `Request` union, `Mutation`/`Action` records, call options
//! - `deferred`: `Deferred`, the awaitable action outcome
//! - `errors`: `StoreError` enumeration

pub mod deferred;
pub mod errors;
pub mod module;
pub mod path;
pub mod request;
pub mod tree;

pub use deferred::*;
pub use errors::*;
pub use module::*;
pub use path::*;
pub use request::*;
pub use tree::*;
