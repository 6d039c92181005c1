//! Anchor server
//!
//! Execution baseline management: repositories, the baseline service and its
//! HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;
