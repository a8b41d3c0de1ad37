//! Router Module Index
//!
//! Routing split by access level. Authentication is applied per module in
//! `create_router`, so a route's protection follows from the module it lives in.

/// Routes open to anonymous clients.
pub mod public;

/// Routes requiring a valid session token.
pub mod authenticated;

/// Routes requiring a valid session token with the ADMIN role.
pub mod admin;
