//! Integration test suite for taskdeck.
//!
//! These tests exercise the HTTP client against a mock server and the
//! on-disk session lifecycle under a sandboxed home directory.
//!
//! # Test Categories
//!
//! - `api_flow`: ApiClient request/response contract against wiremock
//! - `session_flow`: Session persistence under TASKDECK_HOME
//!
//! # CI Compatibility
//!
//! All HTTP traffic goes to a local wiremock server and all filesystem
//! state lives in temp directories, making these safe to run in CI.

mod api_flow;
mod session_flow;
