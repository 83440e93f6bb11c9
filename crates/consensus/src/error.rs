//! Error types for the Aura engine

use aura_types::{Address, H256};
use thiserror::Error;

use crate::signer::SignerError;

/// Errors returned by scheduling, sealing and verification.
#[derive(Debug, Error)]
pub enum AuraError {
    /// The local identity is missing or not an authority for the step
    #[error("local signer is not an authority")]
    InvalidSigner,

    /// A header was sealed by an address outside the authority set
    #[error("unauthorized signer {signer}")]
    UnauthorizedSigner {
        /// Recovered sealer
        signer: Address,
    },

    /// A header was sealed by an authority outside its turn
    #[error("step {step} belongs to {expected}, sealed by {signer}")]
    WrongTurn {
        /// Claimed step
        step: u64,
        /// Authority owning the step
        expected: Address,
        /// Recovered sealer
        signer: Address,
    },

    /// The header carries no step/signature
    #[error("header is not sealed")]
    MissingSeal,

    /// The claimed step does not match the header timestamp
    #[error("step {step} does not match timestamp step {expected}")]
    InvalidStep {
        /// Claimed step
        step: u64,
        /// Step derived from the timestamp
        expected: u64,
    },

    /// The header claims a step too far ahead of the local clock
    #[error("step {step} is in the future (current step {current})")]
    FutureBlock {
        /// Claimed step
        step: u64,
        /// Local step
        current: u64,
    },

    /// The header step does not advance past its parent
    #[error("step {step} does not advance parent step {parent_step}")]
    StepNotIncreasing {
        /// Claimed step
        step: u64,
        /// Parent step
        parent_step: u64,
    },

    /// The parent header is not known to the chain
    #[error("unknown ancestor {0}")]
    UnknownAncestor(H256),

    /// Block number is not parent number plus one
    #[error("invalid block number {number}, parent is {parent}")]
    InvalidNumber {
        /// Header number
        number: u64,
        /// Parent number
        parent: u64,
    },

    /// Difficulty does not follow the step gap
    #[error("invalid difficulty")]
    InvalidDifficulty,

    /// Ommers are not allowed
    #[error("non-empty ommers hash")]
    InvalidUncleHash,

    /// Mix digest must be zero
    #[error("non-zero mix digest")]
    InvalidMixDigest,

    /// Nonce must be zero
    #[error("non-zero nonce")]
    InvalidNonce,

    /// Gas used above gas limit
    #[error("gas used {used} exceeds gas limit {limit}")]
    GasUsedExceedsLimit {
        /// Gas used
        used: u64,
        /// Gas limit
        limit: u64,
    },

    /// An authority set with no members
    #[error("authority set is empty")]
    EmptyAuthoritySet,

    /// An authority listed twice in one set
    #[error("duplicate authority {0}")]
    DuplicateAuthority(Address),

    /// Step duration of zero
    #[error("period must be greater than zero")]
    InvalidPeriod,

    /// A transition that is not on a later epoch boundary
    #[error("invalid authority transition at step {step}: {reason}")]
    InvalidEpochTransition {
        /// Activation step
        step: u64,
        /// Why it was rejected
        reason: String,
    },

    /// The local turn did not arrive within the sealing budget
    #[error("no sealing turn within {0} seconds")]
    SealTimeout(u64),

    /// The signing capability failed
    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    /// Header or block decoding failed
    #[error("codec error: {0}")]
    Codec(#[from] aura_types::Error),

    /// Signature recovery failed
    #[error("crypto error: {0}")]
    Crypto(#[from] aura_crypto::CryptoError),

    /// Engine configuration rejected
    #[error("config error: {0}")]
    Config(#[from] aura_config::ConfigError),

    /// P2P message with a code other than block headers
    #[error("unexpected message code {0:#04x}")]
    UnexpectedMessage(u64),

    /// The sealed-block receiver was dropped
    #[error("result channel closed")]
    ResultChannelClosed,
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, AuraError>;
