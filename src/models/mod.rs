//! Request and Response models for the cache inspector API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! parsing query strings and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::EntryQuery;
pub use responses::{
    ClearResponse, EntryResponse, ErrorResponse, HealthResponse, InvalidateResponse, StatsResponse,
};
