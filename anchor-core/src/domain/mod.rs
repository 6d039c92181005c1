//! Core domain types
//!
//! This module contains the domain structures shared by the Anchor server
//! (which persists and mutates them) and its clients (which display them).

pub mod actor;
pub mod baseline;
pub mod execution;
pub mod state;
pub mod verification;
