//! Aura consensus engine
//!
//! Authorities take turns sealing blocks in fixed time slots. The engine
//! answers two questions for the surrounding chain machinery:
//!
//! - *May I seal now, and if not, when?* ([`Aura::check_step`],
//!   [`Aura::count_closest_turn`], [`Aura::wait_for_next_sealer_turn`],
//!   [`Aura::seal`])
//! - *Is this header's seal valid?* ([`Aura::verify_header`],
//!   [`Aura::verify_seal`])
//!
//! ## Seal Lifecycle
//!
//! ```text
//! prepare ──► finalize ──► seal ──► (network) ──► verify_header
//!   │            │          │                        │
//!   │            │          ├─ wait for own turn      ├─ header rules
//!   │            │          ├─ sign seal_hash         └─ verify_seal
//!   │            │          └─ attach (step, sig)         ├─ recover signer (cached)
//!   │            └─ commit external state result          ├─ membership at step
//!   └─ coinbase, timestamp, difficulty                    └─ turn ownership
//! ```
//!
//! The engine holds no background tasks of its own. Each call to
//! [`Aura::seal`] spawns at most one delivery task, which ends when the
//! sealed block is handed over or the stop signal fires.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aura_config::{AuraConfig, ConfigError};
use aura_crypto::recover_address;
use aura_types::{Address, Block, Bloom, Header, Seal, EMPTY_LIST_HASH, H256, H64, U256};
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use crate::error::{AuraError, Result};
use crate::signatures::SignatureCache;
use crate::signer::{SealSigner, SignerError};
use crate::turn::{StepCheck, TurnScheduler, TurnWindow};
use crate::validators::{AuthorityHistory, ValidatorSet};

/// Read access to headers already known to the chain.
pub trait ChainReader: Send + Sync {
    /// Header with the given hash, if known.
    fn header_by_hash(&self, hash: &H256) -> Option<Header>;
}

impl ChainReader for HashMap<H256, Header> {
    fn header_by_hash(&self, hash: &H256) -> Option<Header> {
        self.get(hash).cloned()
    }
}

/// Output of executing a block's transactions, supplied by the execution layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateResult {
    /// World state root after execution
    pub state_root: H256,
    /// Receipts trie root
    pub receipts_root: H256,
    /// Combined logs bloom
    pub logs_bloom: Bloom,
    /// Total gas consumed
    pub gas_used: u64,
}

impl StateResult {
    /// A result that leaves the header's execution fields as they are.
    pub fn unchanged(header: &Header) -> Self {
        Self {
            state_root: header.state_root,
            receipts_root: header.receipts_root,
            logs_bloom: header.logs_bloom,
            gas_used: header.gas_used,
        }
    }
}

struct Identity {
    address: Address,
    signer: Arc<dyn SealSigner>,
}

/// Difficulty of a header at `step` whose parent was sealed at `parent_step`.
///
/// Consecutive steps give `2^128 - 2`; every skipped step lowers it by one.
pub fn calc_difficulty(parent_step: u64, step: u64) -> U256 {
    U256::from(u128::MAX) + U256::from(parent_step) - U256::from(step)
}

fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn unix_now() -> u64 {
    since_epoch().as_secs()
}

// Step of a header used as a parent; unsealed headers (genesis) count as step 0.
fn parent_step(parent: &Header) -> u64 {
    parent.step().unwrap_or(0)
}

async fn stopped(stop: &mut broadcast::Receiver<()>) {
    match stop.recv().await {
        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
        // A dropped sender can no longer ask us to stop.
        Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
    }
}

/// The Aura proof-of-authority engine.
pub struct Aura {
    config: AuraConfig,
    turns: TurnScheduler,
    history: AuthorityHistory,
    signatures: SignatureCache,
    identity: RwLock<Option<Arc<Identity>>>,
}

impl Aura {
    /// Creates a verify-only engine from `config`.
    pub fn new(config: AuraConfig) -> Result<Self> {
        config.validate()?;

        let turns = TurnScheduler::new(config.period)?;
        let history = AuthorityHistory::from_config(&config)?;
        let capacity = NonZeroUsize::new(config.signature_cache_size)
            .ok_or(AuraError::Config(ConfigError::InvalidCacheSize))?;

        info!(
            period = config.period,
            epoch_length = config.epoch_length,
            authorities = config.authorities.len(),
            transitions = config.transitions.len(),
            "Aura engine created"
        );

        Ok(Self {
            config,
            turns,
            history,
            signatures: SignatureCache::new(capacity),
            identity: RwLock::new(None),
        })
    }

    /// Chain parameters.
    pub fn config(&self) -> &AuraConfig {
        &self.config
    }

    /// Authority sets over time.
    pub fn authorities(&self) -> &AuthorityHistory {
        &self.history
    }

    /// Recovered-signer cache.
    pub fn signatures(&self) -> &SignatureCache {
        &self.signatures
    }

    /// Step containing the current wall-clock time.
    pub fn current_step(&self) -> u64 {
        self.turns.step_at(unix_now())
    }

    /// Installs the local signing identity, replacing any previous one.
    pub fn authorize<S>(&self, address: Address, signer: S)
    where
        S: SealSigner + 'static,
    {
        *self.identity.write() = Some(Arc::new(Identity {
            address,
            signer: Arc::new(signer),
        }));
        info!(signer = %address, "sealing identity authorized");
    }

    /// Address of the local signing identity, if any.
    pub fn signer(&self) -> Option<Address> {
        self.identity.read().as_ref().map(|id| id.address)
    }

    fn identity(&self) -> Option<Arc<Identity>> {
        self.identity.read().clone()
    }

    /// Digest an authority signs: the header without its seal.
    pub fn seal_hash(&self, header: &Header) -> H256 {
        header.seal_hash()
    }

    /// Genesis header carrying the configured difficulty.
    pub fn genesis_header(&self, timestamp: u64) -> Header {
        Header {
            difficulty: self.config.difficulty,
            timestamp,
            ..Default::default()
        }
    }

    /// Address that sealed `header`.
    pub fn author(&self, header: &Header) -> Result<Address> {
        let (signer, cached) = self.recover_signer(header)?;
        if !cached {
            self.signatures.put(header.hash(), signer);
        }
        Ok(signer)
    }

    fn recover_signer(&self, header: &Header) -> Result<(Address, bool)> {
        let seal = header.seal.as_ref().ok_or(AuraError::MissingSeal)?;
        if let Some(signer) = self.signatures.get(&header.hash()) {
            return Ok((signer, true));
        }
        let signer = recover_address(&header.seal_hash(), &seal.signature)?;
        Ok((signer, false))
    }

    fn local_index(&self, set: &ValidatorSet) -> Option<usize> {
        self.signer().and_then(|address| set.index_of(&address))
    }

    /// Whether the local authority may seal at `now`, and the bounds of
    /// the step containing `now`.
    ///
    /// `tolerance` is a unix timestamp that must not lie beyond the end of
    /// the step; zero disables that check.
    pub fn check_step(&self, now: u64, tolerance: u64) -> StepCheck {
        let step = self.turns.step_at(now);
        let set = self.history.set_at(step);
        match self.local_index(&set) {
            Some(index) => self.turns.check_step(now, tolerance, index, set.len()),
            None => StepCheck {
                allowed: false,
                window: self.turns.window(step),
            },
        }
    }

    /// The local authority's closest turn that ends more than `lead` seconds
    /// after `base`.
    ///
    /// Turns are searched across scheduled authority transitions. Fails with
    /// [`AuraError::InvalidSigner`] if no identity is authorized or it holds
    /// no turn in any set from `base` onwards.
    pub fn count_closest_turn(&self, base: u64, lead: u64) -> Result<TurnWindow> {
        let address = self.signer().ok_or(AuraError::InvalidSigner)?;
        let mut from = self.turns.step_at(base.saturating_add(lead));

        loop {
            let set = self.history.set_at(from);
            let transition = self.history.next_transition_after(from);
            let candidate = set
                .index_of(&address)
                .and_then(|index| self.turns.next_owned_step(from, index, set.len()));

            match (candidate, transition) {
                (Some(step), Some(next)) if step >= next => from = next,
                (Some(step), _) => return Ok(self.turns.window(step)),
                (None, Some(next)) => from = next,
                (None, None) => return Err(AuraError::InvalidSigner),
            }
        }
    }

    /// Waits until the local authority's next turn at or after `base` starts.
    ///
    /// Returns immediately with [`AuraError::InvalidSigner`] if the local
    /// identity cannot seal.
    pub async fn wait_for_next_sealer_turn(&self, base: u64) -> Result<()> {
        self.wait_for_turn(base).await.map(|_| ())
    }

    async fn wait_for_turn(&self, base: u64) -> Result<TurnWindow> {
        let turn = self.count_closest_turn(base, 0)?;
        let target = Duration::from_secs(turn.start);

        loop {
            let now = since_epoch();
            if now >= target {
                return Ok(turn);
            }
            let remaining = target - now;
            trace!(start = turn.start, ?remaining, "waiting for turn");
            // Re-check the clock after every wakeup.
            tokio::time::sleep(remaining).await;
        }
    }

    /// Seals `block` in the local authority's next turn and delivers the
    /// sealed copy on `results`.
    ///
    /// The wait is bounded by one full rotation (`authorities * period`
    /// seconds). A message on `stop` at any point before delivery cancels
    /// sealing without error. Signing failures are returned. The caller's
    /// `block` is never modified.
    pub async fn seal(
        &self,
        block: Block,
        results: mpsc::Sender<Block>,
        mut stop: broadcast::Receiver<()>,
    ) -> Result<()> {
        let identity = self.identity().ok_or(AuraError::InvalidSigner)?;
        let number = block.number();

        let now = unix_now();
        let base = now.max(block.header.timestamp);
        let rotation = self.history.set_at(self.turns.step_at(now)).len() as u64;
        let budget = rotation.saturating_mul(self.turns.period());

        let turn = tokio::select! {
            biased;
            _ = stopped(&mut stop) => {
                debug!(number, "sealing stopped while waiting for turn");
                return Ok(());
            }
            waited = tokio::time::timeout(Duration::from_secs(budget), self.wait_for_turn(base)) => {
                match waited {
                    Ok(turn) => turn?,
                    Err(_) => {
                        warn!(number, budget, "no sealing turn within budget");
                        return Err(AuraError::SealTimeout(budget));
                    }
                }
            }
        };

        let step = self.turns.step_at(turn.start);
        let mut header = block.header;
        self.restamp(&mut header, step, turn);

        let hash = header.seal_hash();
        let signature = identity.signer.sign_hash(hash)?;
        let recovered = recover_address(&hash, &signature)?;
        if recovered != identity.address {
            return Err(SignerError::WrongKey {
                expected: identity.address,
                actual: recovered,
            }
            .into());
        }
        header.seal = Some(Seal::new(step, signature));

        let sealed = Block {
            header,
            transactions: block.transactions,
            ommers: block.ommers,
        };
        if results.is_closed() {
            return Err(AuraError::ResultChannelClosed);
        }

        info!(number, step, hash = %sealed.hash(), "block sealed");
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = stopped(&mut stop) => {
                    debug!(number, "sealing stopped before delivery");
                }
                sent = results.send(sealed) => {
                    if sent.is_err() {
                        warn!(number, "sealed block receiver dropped");
                    }
                }
            }
        });

        Ok(())
    }

    // Moves a header prepared for an earlier step into the sealing step,
    // keeping its difficulty consistent with the new step gap.
    fn restamp(&self, header: &mut Header, step: u64, turn: TurnWindow) {
        let prepared = self.turns.step_at(header.timestamp);
        if prepared == step {
            return;
        }
        debug!(prepared, step, "moving header into sealing step");
        header.timestamp = turn.start;
        if step > prepared {
            header.difficulty = header.difficulty.saturating_sub(U256::from(step - prepared));
        } else {
            header.difficulty = header.difficulty.saturating_add(U256::from(prepared - step));
        }
    }

    /// Checks that `header` was sealed in turn by an authority of the set
    /// governing its step.
    ///
    /// A cached signer skips recovery but is re-checked against the
    /// current authority history.
    pub fn verify_seal(&self, header: &Header) -> Result<()> {
        let step = header.step().ok_or(AuraError::MissingSeal)?;
        let (signer, _) = self.recover_signer(header)?;

        let set = self.history.set_at(step);
        if !set.contains(&signer) {
            warn!(number = header.number, step, %signer, "seal by non-authority");
            return Err(AuraError::UnauthorizedSigner { signer });
        }
        let expected = set.owner_of(step);
        if expected != signer {
            warn!(number = header.number, step, %signer, %expected, "seal out of turn");
            return Err(AuraError::WrongTurn {
                step,
                expected,
                signer,
            });
        }

        self.signatures.put(header.hash(), signer);
        debug!(number = header.number, step, %signer, "seal verified");
        Ok(())
    }

    /// Checks `header` against its parent from `chain`, then its seal.
    ///
    /// Genesis (number 0) is trusted as-is.
    pub fn verify_header<C>(&self, chain: &C, header: &Header) -> Result<()>
    where
        C: ChainReader + ?Sized,
    {
        if header.number == 0 {
            return Ok(());
        }
        let parent = chain
            .header_by_hash(&header.parent_hash)
            .ok_or(AuraError::UnknownAncestor(header.parent_hash))?;
        self.verify_with_parent(header, &parent)
    }

    /// Verifies a contiguous batch. Each header may use its predecessor in
    /// the batch as parent; others are looked up in `chain`.
    pub fn verify_headers<C>(&self, chain: &C, headers: &[Header]) -> Vec<Result<()>>
    where
        C: ChainReader + ?Sized,
    {
        headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                if header.number == 0 {
                    return Ok(());
                }
                let previous = i.checked_sub(1).map(|p| &headers[p]);
                match previous {
                    Some(parent) if parent.hash() == header.parent_hash => {
                        self.verify_with_parent(header, parent)
                    }
                    _ => self.verify_header(chain, header),
                }
            })
            .collect()
    }

    fn verify_with_parent(&self, header: &Header, parent: &Header) -> Result<()> {
        let step = header.step().ok_or(AuraError::MissingSeal)?;

        let expected = self.turns.step_at(header.timestamp);
        if step != expected {
            return Err(AuraError::InvalidStep { step, expected });
        }
        let current = self.current_step();
        if step > current.saturating_add(1) {
            return Err(AuraError::FutureBlock { step, current });
        }
        if parent.number.checked_add(1) != Some(header.number) {
            return Err(AuraError::InvalidNumber {
                number: header.number,
                parent: parent.number,
            });
        }
        let parent_step = parent_step(parent);
        if step <= parent_step {
            return Err(AuraError::StepNotIncreasing { step, parent_step });
        }
        if header.ommers_hash != EMPTY_LIST_HASH {
            return Err(AuraError::InvalidUncleHash);
        }
        if !header.mix_hash.is_zero() {
            return Err(AuraError::InvalidMixDigest);
        }
        if !header.nonce.is_zero() {
            return Err(AuraError::InvalidNonce);
        }
        if header.difficulty != calc_difficulty(parent_step, step) {
            return Err(AuraError::InvalidDifficulty);
        }
        if header.gas_used > header.gas_limit {
            return Err(AuraError::GasUsedExceedsLimit {
                used: header.gas_used,
                limit: header.gas_limit,
            });
        }

        self.verify_seal(header)
    }

    /// Fills the consensus fields of a header about to be built on its
    /// parent: coinbase, timestamp, difficulty and the zeroed PoW fields.
    pub fn prepare<C>(&self, chain: &C, header: &mut Header) -> Result<()>
    where
        C: ChainReader + ?Sized,
    {
        let parent = chain
            .header_by_hash(&header.parent_hash)
            .ok_or(AuraError::UnknownAncestor(header.parent_hash))?;

        header.number = parent
            .number
            .checked_add(1)
            .ok_or(AuraError::InvalidNumber {
                number: header.number,
                parent: parent.number,
            })?;
        header.coinbase = self.signer().unwrap_or(Address::ZERO);
        header.timestamp = parent
            .timestamp
            .saturating_add(self.turns.period())
            .max(unix_now());
        header.difficulty = calc_difficulty(parent_step(&parent), self.turns.step_at(header.timestamp));
        header.ommers_hash = EMPTY_LIST_HASH;
        header.mix_hash = H256::ZERO;
        header.nonce = H64::ZERO;
        header.seal = None;

        debug!(
            number = header.number,
            timestamp = header.timestamp,
            "header prepared"
        );
        Ok(())
    }

    /// Commits an externally computed state result into `header`.
    ///
    /// No rewards are paid; ommers and PoW fields are forced empty.
    pub fn finalize(&self, header: &mut Header, state: StateResult) {
        header.state_root = state.state_root;
        header.receipts_root = state.receipts_root;
        header.logs_bloom = state.logs_bloom;
        header.gas_used = state.gas_used;
        header.ommers_hash = EMPTY_LIST_HASH;
        header.mix_hash = H256::ZERO;
        header.nonce = H64::ZERO;
        trace!(number = header.number, state_root = %header.state_root, "header finalized");
    }

    /// [`finalize`](Self::finalize), then assembles the block.
    pub fn finalize_and_assemble(
        &self,
        mut header: Header,
        state: StateResult,
        transactions: Vec<Vec<u8>>,
    ) -> Block {
        self.finalize(&mut header, state);
        Block::new(header, transactions)
    }
}

impl std::fmt::Debug for Aura {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aura")
            .field("period", &self.config.period)
            .field("epoch_length", &self.config.epoch_length)
            .field("signer", &self.signer())
            .field("signatures", &self.signatures)
            .finish()
    }
}
