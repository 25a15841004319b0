//! # solprog-core — Foundational Types for solprogctl
//!
//! Defines the primitives shared by the keypair loader and the command
//! controller:
//!
//! - **`ProgramId`** — a 32-byte public identity, rendered and parsed as
//!   base58. Comparing a derived identity against the expected one is the
//!   whole of identity verification.
//! - **`ControllerError`** — the single error taxonomy surfaced by every
//!   controller command.
//!
//! ## Crate Policy
//!
//! - Leaf of the workspace DAG: no dependencies on other `solprog-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;

pub use error::{ControllerError, ControllerResult};
pub use identity::{ProgramId, DEFAULT_PROGRAM_ID};
