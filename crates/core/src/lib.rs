//! Domain building blocks shared by the database and API crates.
//!
//! Nothing in here touches the network or the database: error taxonomy,
//! entity scoping, paging, request validation helpers, the rate-limit policy table,
//! and the image variant presets and renderer.

pub mod entity_scope;
pub mod error;
pub mod image_variants;
pub mod paging;
pub mod rate_limit;
pub mod types;
pub mod validation;
