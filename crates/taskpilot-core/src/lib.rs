//! # taskpilot-core
//!
//! Foundation types and the command vocabulary shared by all taskpilot crates.
//!
//! - **Branded IDs**: [`ids::UserId`], [`ids::SessionId`], [`ids::ProjectId`],
//!   [`ids::TaskId`], [`ids::SprintId`] as newtypes
//! - **Actors**: [`actor::Actor`] — the authenticated caller on whose behalf
//!   commands run
//! - **Parameters**: [`params::ParamValue`] tagged union and [`params::ParamMap`]
//!   with typed accessors
//! - **Commands**: [`command::CommandDescriptor`], [`command::CommandInvocation`],
//!   [`command::CommandResult`]
//! - **Conversations**: [`session::Session`] and [`session::Turn`] wire types
//! - **Errors**: [`errors::CommandError`] — the command-local failure taxonomy
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other taskpilot crates.

#![deny(unsafe_code)]

pub mod actor;
pub mod command;
pub mod errors;
pub mod ids;
pub mod params;
pub mod session;
