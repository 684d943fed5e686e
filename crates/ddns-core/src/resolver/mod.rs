//! Name resolver implementations
//!
//! This module provides the built-in implementation of the NameResolver trait:
//! - `SystemResolver`: the operating system's resolver (getaddrinfo)

pub mod system;

pub use system::SystemResolver;
