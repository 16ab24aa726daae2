//! Shared test utilities for the openpype-deps workspace.
//!
//! This crate provides the studio fixtures used across crate test suites.
//! It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: the checked-in base and addon `pyproject.toml` files
//! - [`studio`]: [`TestStudio`](studio::TestStudio) builder for on-disk layouts

pub mod fixtures;
pub mod studio;
