//! Card record management and bank-account linkage coordination.
//!
//! The domain module owns the entities, ports, and the coordinating service;
//! the outbound module holds driven adapters (remote bank-account HTTP client
//! and an in-memory card store).

pub mod domain;
pub mod outbound;
