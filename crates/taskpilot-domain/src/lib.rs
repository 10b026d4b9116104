//! # taskpilot-domain
//!
//! Outbound collaborator interfaces and the entity types they trade in.
//!
//! The orchestrator treats project/task/sprint persistence and business rules
//! as external collaborators — this crate defines only the seams:
//!
//! - **Services**: [`services::ProjectService`], [`services::TaskService`],
//!   [`services::SprintService`], [`services::UserDirectory`]
//! - **Entities**: [`types::Project`], [`types::Task`], [`types::Sprint`],
//!   [`types::TaskStatus`]
//! - **Errors**: [`errors::DomainError`]
//! - **Test double**: [`testutil::InMemoryDirectory`] implementing all four
//!   services over in-process maps
//!
//! ## Crate Position
//!
//! Interface crate. Depends on: taskpilot-core.
//! Depended on by: taskpilot-commands, taskpilot-runtime.

#![deny(unsafe_code)]

pub mod errors;
pub mod services;
pub mod testutil;
pub mod types;

pub use errors::DomainError;
pub use services::{ProjectService, SprintService, TaskService, UserDirectory};
