//! API Module
//!
//! Admin HTTP surface over the shared response cache.
//!
//! # Endpoints
//! - `PUT /cache`, `DELETE /cache` - Store a value, clear everything
//! - `GET /cache/:key`, `DELETE /cache/:key` - Inspect or drop one key
//! - `POST /invalidate` - Substring or regex invalidation
//! - `DELETE /resources/:resource[/:id]` - Resource invalidation
//! - `PUT /settings` - Runtime toggles
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
