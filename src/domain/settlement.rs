//! Settlement arithmetic.
//!
//! Converts final standings into per-participant entitlements. Stakes of
//! participants who missed the qualifying bar are split evenly among those
//! who met it; the integer-division remainder is kept as pool dust and is
//! never dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Address, Amount};
use crate::error::LedgerError;

/// Final standing of one participant at settlement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    /// Participant address.
    pub address: Address,
    /// Days whose proof reached quorum.
    pub verified_days: u64,
}

/// Recorded outcome of a pool settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Extra amount paid to each qualifier on top of their stake.
    pub reward_per_winner: Amount,
    /// Number of participants who met the qualifying bar.
    pub qualifying_count: u64,
    /// Total stake lost by non-qualifiers.
    pub forfeited: Amount,
    /// Undistributable remainder of `forfeited / qualifying_count`.
    pub dust: Amount,
    /// Whether the dust was already swept to the operator.
    pub dust_swept: bool,
    /// `true` when nobody qualified and every stake is refunded.
    pub refund_only: bool,
    /// Payout owed to each participant, fixed at settlement.
    pub entitlements: BTreeMap<Address, Amount>,
    /// Unix time of settlement.
    pub settled_at: i64,
}

impl Settlement {
    /// Computes entitlements from final standings.
    ///
    /// A participant qualifies when `verified_days >= min_verified_days`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Internal`] on amount overflow.
    pub fn compute(
        stake: Amount,
        standings: &[Standing],
        min_verified_days: u64,
        settled_at: i64,
    ) -> Result<Self, LedgerError> {
        let overflow = || LedgerError::Internal("settlement amount overflow".to_string());

        let qualifying_count = standings
            .iter()
            .filter(|s| s.verified_days >= min_verified_days)
            .count() as u64;
        let losing_count = (standings.len() as u64).saturating_sub(qualifying_count);

        if qualifying_count == 0 {
            let entitlements = standings.iter().map(|s| (s.address, stake)).collect();
            return Ok(Self {
                reward_per_winner: Amount::ZERO,
                qualifying_count,
                forfeited: Amount::ZERO,
                dust: Amount::ZERO,
                dust_swept: false,
                refund_only: true,
                entitlements,
                settled_at,
            });
        }

        let forfeited = stake.checked_mul(losing_count).ok_or_else(overflow)?;
        let (reward_per_winner, dust) = forfeited.split(qualifying_count).ok_or_else(overflow)?;
        let winner_payout = stake.checked_add(reward_per_winner).ok_or_else(overflow)?;

        let entitlements = standings
            .iter()
            .map(|s| {
                let payout = if s.verified_days >= min_verified_days {
                    winner_payout
                } else {
                    Amount::ZERO
                };
                (s.address, payout)
            })
            .collect();

        Ok(Self {
            reward_per_winner,
            qualifying_count,
            forfeited,
            dust,
            dust_swept: false,
            refund_only: false,
            entitlements,
            settled_at,
        })
    }

    /// Returns the payout owed to `address` (zero when unknown).
    #[must_use]
    pub fn entitlement_of(&self, address: &Address) -> Amount {
        self.entitlements.get(address).copied().unwrap_or_default()
    }

    /// Sum of every entitlement; equals escrow minus dust.
    #[must_use]
    pub fn total_entitlements(&self) -> Amount {
        self.entitlements
            .values()
            .fold(Amount::ZERO, |acc, a| acc.checked_add(*a).unwrap_or(acc))
    }
}
