//! Anchor Core
//!
//! Core types and abstractions for the Anchor baseline service.
//!
//! This crate contains:
//! - Domain types: executions, baseline records, verification data
//! - DTOs: Data transfer objects for the HTTP API and its clients

pub mod domain;
pub mod dto;
