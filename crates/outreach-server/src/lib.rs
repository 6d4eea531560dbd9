//! outreach-server — axum front end for the outreach hub command service.

pub mod config;
pub mod handlers;
pub mod router;
