//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! Terraform, gcloud, ssh-keygen and ssh adapters, module staging, config
//! loading and run state persistence.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod fs;
pub mod gcloud;
pub mod keygen;
pub mod ssh;
pub mod state;
pub mod terraform;
