//! Authority sets and their epoch history
//!
//! An authority set is an ordered list of addresses; position in the list is
//! the turn index, so the owner of step `s` is `list[s % len]`. Sets change
//! only at epoch boundaries. [`AuthorityHistory`] keeps the genesis set plus
//! every scheduled replacement, keyed by the first step it governs.
//!
//! Readers take an `Arc` snapshot of the whole history, so a transition that
//! lands mid-verification is either fully visible or not visible at all.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use aura_config::AuraConfig;
use aura_types::Address;
use parking_lot::RwLock;
use tracing::info;

use crate::error::{AuraError, Result};

/// Ordered, duplicate-free list of authorities for one epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSet {
    authorities: Vec<Address>,
    index: HashMap<Address, usize>,
}

impl ValidatorSet {
    /// Builds a set, rejecting empty lists and repeated addresses.
    pub fn new(authorities: Vec<Address>) -> Result<Self> {
        if authorities.is_empty() {
            return Err(AuraError::EmptyAuthoritySet);
        }
        let mut index = HashMap::with_capacity(authorities.len());
        for (i, authority) in authorities.iter().enumerate() {
            if index.insert(*authority, i).is_some() {
                return Err(AuraError::DuplicateAuthority(*authority));
            }
        }
        Ok(Self { authorities, index })
    }

    /// Turn index of `address`, if it is an authority.
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    /// Returns true if `address` is an authority.
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// Number of authorities.
    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }

    /// Authority whose turn `step` is.
    pub fn owner_of(&self, step: u64) -> Address {
        self.authorities[(step % self.authorities.len() as u64) as usize]
    }

    /// Authorities in turn order.
    pub fn authorities(&self) -> &[Address] {
        &self.authorities
    }
}

#[derive(Debug, Clone)]
struct Schedule {
    genesis: Arc<ValidatorSet>,
    // First step governed -> set
    transitions: BTreeMap<u64, Arc<ValidatorSet>>,
}

/// Authority sets over time, swapped copy-on-write at epoch boundaries.
#[derive(Debug)]
pub struct AuthorityHistory {
    epoch_length: u64,
    schedule: RwLock<Arc<Schedule>>,
}

impl AuthorityHistory {
    /// History with a single set governing every step.
    pub fn new(genesis: ValidatorSet, epoch_length: u64) -> Result<Self> {
        if epoch_length == 0 {
            return Err(AuraError::InvalidEpochTransition {
                step: 0,
                reason: "epoch length must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            epoch_length,
            schedule: RwLock::new(Arc::new(Schedule {
                genesis: Arc::new(genesis),
                transitions: BTreeMap::new(),
            })),
        })
    }

    /// Builds the history described by a validated configuration.
    pub fn from_config(config: &AuraConfig) -> Result<Self> {
        let history = Self::new(
            ValidatorSet::new(config.authorities.clone())?,
            config.epoch_length,
        )?;
        for transition in &config.transitions {
            history.schedule_transition(
                transition.step,
                ValidatorSet::new(transition.authorities.clone())?,
            )?;
        }
        Ok(history)
    }

    /// Steps per epoch.
    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    /// Epoch containing `step`.
    pub fn epoch_of(&self, step: u64) -> u64 {
        step / self.epoch_length
    }

    /// The set governing `step`.
    pub fn set_at(&self, step: u64) -> Arc<ValidatorSet> {
        let schedule = self.schedule.read().clone();
        Self::lookup(&schedule, step)
    }

    /// First step after `step` at which a different set takes over.
    pub fn next_transition_after(&self, step: u64) -> Option<u64> {
        let schedule = self.schedule.read().clone();
        schedule
            .transitions
            .range(step.saturating_add(1)..)
            .next()
            .map(|(start, _)| *start)
    }

    /// Installs `set` from `step` onwards.
    ///
    /// `step` must start an epoch and come after every transition already
    /// scheduled. Concurrent readers keep the snapshot they already hold.
    pub fn schedule_transition(&self, step: u64, set: ValidatorSet) -> Result<()> {
        if step % self.epoch_length != 0 {
            return Err(AuraError::InvalidEpochTransition {
                step,
                reason: format!("not a multiple of epoch length {}", self.epoch_length),
            });
        }

        let mut guard = self.schedule.write();
        let last = guard.transitions.keys().next_back().copied().unwrap_or(0);
        if step <= last {
            return Err(AuraError::InvalidEpochTransition {
                step,
                reason: format!("must come after step {}", last),
            });
        }

        let mut next = Schedule::clone(&guard);
        let authorities = set.len();
        next.transitions.insert(step, Arc::new(set));
        *guard = Arc::new(next);

        info!(
            step,
            epoch = step / self.epoch_length,
            authorities,
            "Authority transition scheduled"
        );
        Ok(())
    }

    fn lookup(schedule: &Schedule, step: u64) -> Arc<ValidatorSet> {
        let set = schedule
            .transitions
            .range(..=step)
            .next_back()
            .map(|(_, set)| set)
            .unwrap_or(&schedule.genesis);
        Arc::clone(set)
    }
}
