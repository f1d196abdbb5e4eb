//! Core use-case services.
//!
//! # Responsibility
//! - Turn store load/save into task-level operations.
//! - Keep the shell and the scanner decoupled from file details.

pub mod task_service;
