//! HTTP handlers.
//!
//! Handlers decode the request, call one application service with the
//! authenticated user, and turn the result into a response DTO.

pub mod auth;
pub mod groups;
pub mod members;
pub mod tasks;
