//! API Module
//!
//! HTTP handlers and routing for the cache inspector.
//!
//! # Endpoints
//! - `GET /entries/:namespace` - Read an entry by namespace and query params
//! - `DELETE /entries/:prefix` - Invalidate by prefix
//! - `DELETE /entries` - Clear the cache
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
