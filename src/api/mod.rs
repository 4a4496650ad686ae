//! API Module
//!
//! HTTP handlers and routing for the memoization service.
//!
//! # Endpoints
//! - `POST /get` - Look up a memoized response
//! - `PUT /set` - Memoize a response
//! - `POST /metadata` - Inspect an entry without consuming it
//! - `GET /stats` - Cache statistics
//! - `DELETE /clear` - Drop every entry
//! - `GET /export` - Snapshot of fresh entries
//! - `POST /import` - Restore a snapshot
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
