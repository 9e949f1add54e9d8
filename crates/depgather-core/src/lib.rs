//! Core data types for depgather.
//!
//! This crate defines the package model the gatherer works on: package
//! identities, declared dependency edges, resolved dependency nodes, target
//! frameworks with the reducer that picks an applicable dependency group,
//! and the `depgather.toml` configuration.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod framework;
pub mod package;
