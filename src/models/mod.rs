//! Request and Response models for the memoization API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.
//! Stats, metadata, snapshots and import reports are served as the cache's
//! own serializable types.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{LookupRequest, SetRequest};
pub use responses::{ClearResponse, GetResponse, HealthResponse, SetResponse};
