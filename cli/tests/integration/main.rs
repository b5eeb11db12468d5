//! Integration tests for netcheck
//!
//! These tests spawn the actual binary and check end-to-end behavior that
//! does not need a cloud project.

mod config_file;
