//! # family-groups
//!
//! JSON API for family groups: users register, create groups, invite other
//! registered users, and share a task list inside each group.
//!
//! ## Layers
//!
//! - [`domain`]: entities, identifiers, authorization policy and errors
//! - [`application`]: one async service function per operation
//! - [`infrastructure`]: configuration, repositories (in-memory and `SQLite`)
//!   and the dependency container
//! - [`api`]: axum router, handlers, extractors and error responses
//!
//! ## Invariants
//!
//! - Every group keeps at least one admin. Removals and demotions that would
//!   break this are refused with `LAST_ADMIN`.
//! - A user is at most once a member of a group.
//! - A task's assignee is a member of its group; removing a member
//!   unassigns their tasks.
//!
//! ## Example
//!
//! ```rust,ignore
//! use family_groups::api::create_router;
//! use family_groups::infrastructure::{AppConfig, AppDependencies};
//!
//! let dependencies = AppDependencies::in_memory(AppConfig::default());
//! let router = create_router(dependencies);
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
