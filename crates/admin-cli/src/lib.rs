//! Library components of the admin schema CLI.
//!
//! [`fixture::FixtureSource`] serves schemas and records from JSON files so
//! the pipeline can run without a backend.

#![allow(missing_docs)]

pub mod fixture;
pub mod logging;
