//! HTTP request handlers for the facelift server.
//!
//! Each submodule covers one API area. Handlers stay thin: they translate
//! HTTP into calls on the lifecycle manager and engine, and map core
//! errors through [`crate::error::HttpError`].

pub mod downloads;
pub mod enhance;
pub mod files;
pub mod status;
