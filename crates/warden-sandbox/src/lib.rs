//! # warden-sandbox
//!
//! Path sandbox for Warden.
//!
//! Every path an agent hands us goes through [`PathSandbox::validate`] before
//! any filesystem call is made. The sandbox resolves the path against the
//! working directory, collapses `.`/`..` lexically (symlinks are not
//! followed) and accepts it only if one of the configured allowed roots
//! is a component-wise prefix.
//!
//! ## Key components
//!
//! - [`PathSandbox`] — immutable root list, `validate` / `is_allowed`
//! - [`SandboxConfig`] — allowed roots plus optional host/container remap
//! - [`PathRemap`] — host workspace → container workspace prefix rewrite
//! - [`SandboxError`] — `AccessDenied` is the one error that must always
//!   surface as a hard rejection

pub mod config;
pub mod error;
pub mod normalize;
pub mod remap;
pub mod sandbox;

pub use config::{parse_allowed_dirs, SandboxConfig};
pub use error::SandboxError;
pub use normalize::normalize_lexically;
pub use remap::PathRemap;
pub use sandbox::PathSandbox;
