//! # solprog-crypto — Keypair Loading
//!
//! Decodes Solana CLI keypair files (a JSON array of 64 byte values: the
//! ed25519 seed followed by its public key) into signing keys and derives
//! their public `ProgramId`.
//!
//! ## Crate Policy
//!
//! - Depends only on `solprog-core` internally.
//! - Secret key bytes are never logged, serialized, or shown by `Debug`.
//! - Tests use real ed25519 keys derived from fixed seeds.

pub mod keypair;

pub use keypair::{load_keypair_file, ProgramKeypair, KEYPAIR_LENGTH};
