// SPDX-License-Identifier: MIT

//! Middleware modules (authentication, role gating, security headers).

pub mod auth;
pub mod role;
pub mod security;

pub use auth::require_auth;
pub use role::require_admin;
