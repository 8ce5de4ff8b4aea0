//! Tower layers applied to the whole router.

pub mod cors;

pub use cors::build_cors_layer;
