//! # Aura Consensus
//!
//! Authority Round (Aura) proof-of-authority engine.
//!
//! A fixed, epoch-scoped list of authorities takes turns sealing blocks.
//! Time is divided into steps of `period` seconds and step `s` belongs to
//! authority `s % n`. A header is valid only if its seal recovers to the
//! authority owning the header's step.
//!
//! ## Components
//!
//! - [`ValidatorSet`] / [`AuthorityHistory`]: authority lists per epoch
//! - [`SignatureCache`]: bounded LRU of recovered signers
//! - [`TurnScheduler`]: pure step and turn-window arithmetic
//! - [`SealSigner`]: injected signing capability
//! - [`Aura`]: scheduling, sealing and verification
//! - [`p2p`]: decoding `BlockHeaders` messages from peers
//!
//! ## Turn Layout
//!
//! ```text
//! period = 5, authorities = [A, B, C]
//!
//! step:      320517711   320517712   320517713   320517714
//! owner:         A           B           C           A
//! window:  [t-1, t+4)  [t+4, t+9)  [t+9, t+14) [t+14, t+19)     t = 1602588556
//! ```
//!
//! ## Example
//!
//! ```rust
//! use aura_config::AuraConfig;
//! use aura_consensus::{Aura, LocalSigner};
//! use aura_crypto::PrivateKey;
//!
//! let key = PrivateKey::random();
//! let signer = LocalSigner::new(key.clone());
//! let config = AuraConfig::new(5, 30_000, vec![key.address()]);
//!
//! let aura = Aura::new(config).unwrap();
//! aura.authorize(key.address(), signer);
//!
//! // A single authority owns every step.
//! assert!(aura.check_step(1_602_588_556, 0).allowed);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod p2p;
pub mod signatures;
pub mod signer;
pub mod turn;
pub mod validators;

pub use engine::{calc_difficulty, Aura, ChainReader, StateResult};
pub use error::{AuraError, Result};
pub use p2p::{headers_from_message, P2pMessage, BLOCK_HEADERS_MSG};
pub use signatures::SignatureCache;
pub use signer::{LocalSigner, SealSigner, SignerError};
pub use turn::{StepCheck, TurnScheduler, TurnWindow};
pub use validators::{AuthorityHistory, ValidatorSet};
