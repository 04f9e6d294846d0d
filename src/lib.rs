//! Flare instrumentation workspace - integration tests across the member crates.
//!
//! This is a virtual package that provides workspace-level integration tests.
//! The actual functionality is provided by the workspace member crates:
//!
//! - `flare-core`: Span, scope, and hub model plus the reporting client contract
//! - `flare-messenger`: Message lifecycle instrumentation for workers
//! - `flare-http`: Traced HTTP client and streaming response wrapper
