// =============================================================================
// HTTP API
// =============================================================================
//
// REST surface over the shared signal scorer. Reads are public; mutations
// require the admin bearer token.

pub mod auth;
pub mod rest;

pub use rest::router;
