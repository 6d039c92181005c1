//! Data Transfer Objects
//!
//! Request and query payloads exchanged between the Anchor server and its
//! clients.

pub mod baseline;
