//! Pool aggregate: membership, daily proof tally and settlement.
//!
//! A [`Pool`] exclusively owns every participant, submission and vote
//! record scoped to it. All operations take the observed unix time `now`
//! explicitly, validate completely against the lazily computed
//! [`PoolPhase`], and only then mutate. A failed call leaves the pool
//! exactly as it was.
//!
//! Operations that move funds are split in two halves (`check_*` and
//! `apply_*`) so the service can run the custody transfer in between while
//! holding the pool's write lock.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::clock::ledger_time;
use super::settlement::{Settlement, Standing};
use super::tally::{self, MAX_BPS, SECONDS_PER_DAY};
use super::{Address, Amount, LedgerEvent, PoolId};
use crate::error::LedgerError;

/// Maximum pool name length in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Creation parameters of a pool. Immutable once the pool exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    /// Human-readable challenge name.
    pub name: String,
    /// Fixed contribution every participant escrows on join.
    pub stake_amount: Amount,
    /// Number of challenge days.
    pub duration_days: u64,
    /// Unix time of day 0.
    pub start_time: i64,
    /// Last unix second at which joining is allowed.
    pub registration_end_time: i64,
    /// Participants required at registration close, else the pool cancels.
    pub min_contributors: u64,
    /// Share of eligible voters (basis points) whose approval verifies a proof.
    pub quorum_bps: u16,
    /// Verified days a participant needs to qualify for rewards.
    pub min_votes_required: u64,
}

impl PoolParams {
    /// Checks every creation invariant against the creation time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPoolParameters`] naming the first
    /// violated rule.
    pub fn validate(&self, now: i64) -> Result<(), LedgerError> {
        let invalid = |msg: &str| Err(LedgerError::InvalidPoolParameters(msg.to_string()));

        if self.name.trim().is_empty() {
            return invalid("name must not be empty");
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return invalid("name must be at most 100 characters");
        }
        if self.stake_amount.is_zero() {
            return invalid("stake_amount must be positive");
        }
        if self.duration_days == 0 {
            return invalid("duration_days must be positive");
        }
        if self.registration_end_time < now {
            return invalid("registration_end_time must not be in the past");
        }
        if self.start_time < self.registration_end_time {
            return invalid("start_time must not precede registration_end_time");
        }
        if self.min_contributors < 2 {
            return invalid("min_contributors must be at least 2");
        }
        if self.quorum_bps == 0 || self.quorum_bps > MAX_BPS {
            return invalid("quorum_bps must be within 1..=10000");
        }
        if self.min_votes_required == 0 {
            return invalid("min_votes_required must be at least 1");
        }
        if self.end_time().is_none() {
            return invalid("duration_days is out of range");
        }
        Ok(())
    }

    /// Unix time at which the last day ends, `None` on overflow.
    #[must_use]
    pub fn end_time(&self) -> Option<i64> {
        i64::try_from(self.duration_days)
            .ok()?
            .checked_mul(SECONDS_PER_DAY)?
            .checked_add(self.start_time)
    }
}

/// Lifecycle phase, derived from stored flags and the observed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolPhase {
    /// Registration window open.
    Registration,
    /// Registration closed with enough joiners; days running.
    Active,
    /// Duration elapsed; waiting for settlement.
    Settleable,
    /// Settlement ran (terminal).
    Settled,
    /// Too few joiners at registration close (terminal).
    Canceled,
}

impl PoolPhase {
    /// Returns the phase as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Active => "active",
            Self::Settleable => "settleable",
            Self::Settled => "settled",
            Self::Canceled => "canceled",
        }
    }

    /// Returns `true` for the terminal phases.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Canceled)
    }
}

/// Per-pool record of one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Whether the address escrowed its stake.
    pub has_joined: bool,
    /// Finalized days whose proof reached quorum.
    pub verified_days: u64,
    /// Votes this participant cast on others' proofs.
    pub votes_cast: u64,
    /// Whether the entitlement was paid out.
    pub withdrawn: bool,
}

/// One participant's proof for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Opaque proof reference (URL, content hash).
    pub proof_ref: String,
    /// Unix time of submission.
    pub timestamp: i64,
    /// Approvals received.
    pub yes_votes: u64,
    /// Rejections received.
    pub no_votes: u64,
    /// Votes by voter address; presence guards against double voting.
    votes: BTreeMap<Address, bool>,
}

impl Submission {
    fn new(proof_ref: String, timestamp: i64) -> Self {
        Self {
            proof_ref,
            timestamp,
            yes_votes: 0,
            no_votes: 0,
            votes: BTreeMap::new(),
        }
    }

    /// Returns `true` once any vote was recorded.
    #[must_use]
    pub fn has_votes(&self) -> bool {
        !self.votes.is_empty()
    }

    /// Returns the vote `voter` cast, if any.
    #[must_use]
    pub fn vote_of(&self, voter: &Address) -> Option<bool> {
        self.votes.get(voter).copied()
    }

    fn view(&self, required: u64) -> SubmissionView {
        SubmissionView {
            proof_ref: self.proof_ref.clone(),
            timestamp: self.timestamp,
            yes_votes: self.yes_votes,
            no_votes: self.no_votes,
            is_verified: tally::is_verified(self.yes_votes, self.no_votes, required),
        }
    }
}

/// Read view of a submission with its derived verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionView {
    /// Opaque proof reference.
    pub proof_ref: String,
    /// Unix time of submission.
    pub timestamp: i64,
    /// Approvals received.
    pub yes_votes: u64,
    /// Rejections received.
    pub no_votes: u64,
    /// Quorum reached and approvals outnumber rejections.
    pub is_verified: bool,
}

/// Static pool facts for detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolDetails {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Creation parameters.
    pub params: PoolParams,
    /// Current participant count.
    pub participant_count: u64,
    /// Whether settlement ran.
    pub settled: bool,
    /// Unix time of creation.
    pub created_at: i64,
}

/// Economic state of a pool as observed at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Lifecycle phase.
    pub phase: PoolPhase,
    /// Whether settlement ran.
    pub settled: bool,
    /// Whether the pool is canceled.
    pub canceled: bool,
    /// Every participant is owed exactly their stake back.
    pub refund_state: bool,
    /// Reward per qualifier (zero before settlement).
    pub reward_per_winner: Amount,
    /// Current participant count.
    pub participant_count: u64,
    /// Qualifiers (zero before settlement).
    pub qualifying_count: u64,
    /// Escrowed balance.
    pub escrow: Amount,
    /// Settlement remainder awaiting sweep.
    pub dust: Amount,
    /// Whether dust was swept.
    pub dust_swept: bool,
    /// Current day index, `None` before start.
    pub current_day: Option<u64>,
    /// Days folded into participant progress.
    pub finalized_days: u64,
}

/// Lightweight summary of a pool for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Challenge name.
    pub name: String,
    /// Per-participant stake.
    pub stake_amount: Amount,
    /// Challenge length in days.
    pub duration_days: u64,
    /// Current participant count.
    pub participant_count: u64,
    /// Lifecycle phase.
    pub phase: PoolPhase,
}

/// Payout computed by [`Pool::check_withdraw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Amount owed to the caller.
    pub amount: Amount,
    /// `true` when the payout only returns the stake.
    pub refund: bool,
}

/// Aggregate holding one commitment challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    id: PoolId,
    params: PoolParams,
    created_at: i64,
    settled: bool,
    canceled: bool,
    escrow: Amount,
    participants: BTreeMap<Address, Participant>,
    join_order: Vec<Address>,
    submissions: BTreeMap<u64, BTreeMap<Address, Submission>>,
    finalized_days: u64,
    /// `(day, participant)` pairs counted in `verified_days`.
    #[serde(default)]
    credited: BTreeSet<(u64, Address)>,
    settlement: Option<Settlement>,
}

impl Pool {
    /// Validates `params` and creates an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPoolParameters`] on any violated rule.
    pub fn create(id: PoolId, params: PoolParams, now: i64) -> Result<Self, LedgerError> {
        params.validate(now)?;
        Ok(Self {
            id,
            params,
            created_at: now,
            settled: false,
            canceled: false,
            escrow: Amount::ZERO,
            participants: BTreeMap::new(),
            join_order: Vec::new(),
            submissions: BTreeMap::new(),
            finalized_days: 0,
            credited: BTreeSet::new(),
            settlement: None,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// Pool identifier.
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Creation parameters.
    #[must_use]
    pub const fn params(&self) -> &PoolParams {
        &self.params
    }

    /// Escrowed balance.
    #[must_use]
    pub const fn escrow(&self) -> Amount {
        self.escrow
    }

    /// Number of joined participants.
    #[must_use]
    pub fn participant_count(&self) -> u64 {
        self.join_order.len() as u64
    }

    /// Participant addresses in join order.
    #[must_use]
    pub fn participants(&self) -> &[Address] {
        &self.join_order
    }

    /// Settlement outcome, once settled.
    #[must_use]
    pub const fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    /// Days already folded into participant progress.
    #[must_use]
    pub const fn finalized_days(&self) -> u64 {
        self.finalized_days
    }

    /// Returns `true` if `address` joined this pool.
    #[must_use]
    pub fn has_joined(&self, address: &Address) -> bool {
        self.participants.contains_key(address)
    }

    // ── Derived state ───────────────────────────────────────────────────

    /// Unix time at which the last day ends.
    #[must_use]
    pub fn end_time(&self) -> i64 {
        self.params.end_time().unwrap_or(i64::MAX)
    }

    /// Day index at `now`, `None` before the start.
    #[must_use]
    pub fn current_day(&self, now: i64) -> Option<u64> {
        tally::day_index(now, self.params.start_time)
    }

    /// Approvals a submission currently needs.
    #[must_use]
    pub fn required_yes_votes(&self) -> u64 {
        tally::required_yes_votes(self.params.quorum_bps, self.participant_count())
    }

    /// Lifecycle phase at `now`.
    #[must_use]
    pub fn phase(&self, now: i64) -> PoolPhase {
        if self.settled {
            PoolPhase::Settled
        } else if self.canceled || self.cancellation_due(now) {
            PoolPhase::Canceled
        } else if now <= self.params.registration_end_time {
            PoolPhase::Registration
        } else if now >= self.end_time() {
            PoolPhase::Settleable
        } else {
            PoolPhase::Active
        }
    }

    fn cancellation_due(&self, now: i64) -> bool {
        now > self.params.registration_end_time
            && self.participant_count() < self.params.min_contributors
    }

    /// Completed days at `now` (days that can no longer receive proofs).
    fn elapsed_days(&self, now: i64) -> u64 {
        self.current_day(now)
            .map_or(0, |day| day.min(self.params.duration_days))
    }

    // ── Lazy transitions ────────────────────────────────────────────────

    /// Materializes transitions implied by the passage of time: cancellation
    /// and folding of completed days. Idempotent.
    fn advance(&mut self, now: i64) -> Vec<LedgerEvent> {
        let mut events = Vec::new();
        if !self.settled && !self.canceled && self.cancellation_due(now) {
            self.canceled = true;
            events.push(LedgerEvent::PoolCanceled {
                pool_id: self.id,
                participant_count: self.participant_count(),
                min_contributors: self.params.min_contributors,
                timestamp: ledger_time(now),
            });
        }
        if !self.canceled {
            let limit = self.elapsed_days(now);
            events.extend(self.finalize_through(limit, now));
        }
        events
    }

    fn verified_on(&self, day: u64, required: u64) -> Vec<Address> {
        self.submissions
            .get(&day)
            .map(|subs| {
                subs.iter()
                    .filter(|(_, s)| tally::is_verified(s.yes_votes, s.no_votes, required))
                    .map(|(addr, _)| *addr)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn finalize_through(&mut self, limit: u64, now: i64) -> Vec<LedgerEvent> {
        let required = self.required_yes_votes();
        let mut events = Vec::new();
        while self.finalized_days < limit {
            let day = self.finalized_days;
            let verified = self.verified_on(day, required);
            for addr in &verified {
                self.credit(day, *addr, true);
            }
            self.finalized_days = day.saturating_add(1);
            events.push(LedgerEvent::DayFinalized {
                pool_id: self.id,
                day,
                verified,
                timestamp: ledger_time(now),
            });
        }
        events
    }

    /// Brings `addr`'s credit for a finalized `day` in line with its
    /// current verification. Each pair counts at most once.
    fn credit(&mut self, day: u64, addr: Address, verified: bool) {
        let changed = if verified {
            self.credited.insert((day, addr))
        } else {
            self.credited.remove(&(day, addr))
        };
        if !changed {
            return;
        }
        if let Some(p) = self.participants.get_mut(&addr) {
            p.verified_days = if verified {
                p.verified_days.saturating_add(1)
            } else {
                p.verified_days.saturating_sub(1)
            };
        }
    }

    /// Verified-day counts as they will stand once every day is finalized,
    /// in join order. Pure: used to validate settlement before mutating.
    fn final_standings(&self) -> Vec<Standing> {
        let required = self.required_yes_votes();
        let mut pending: BTreeMap<Address, u64> = BTreeMap::new();
        for day in self.finalized_days..self.params.duration_days {
            for addr in self.verified_on(day, required) {
                if self.credited.contains(&(day, addr)) {
                    continue;
                }
                let count = pending.entry(addr).or_default();
                *count = count.saturating_add(1);
            }
        }
        self.join_order
            .iter()
            .map(|addr| {
                let finalized = self
                    .participants
                    .get(addr)
                    .map_or(0, |p| p.verified_days);
                Standing {
                    address: *addr,
                    verified_days: finalized
                        .saturating_add(pending.get(addr).copied().unwrap_or(0)),
                }
            })
            .collect()
    }

    // ── Membership ──────────────────────────────────────────────────────

    /// Validates a join and returns the stake the caller must escrow.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PoolCanceled`], [`LedgerError::AlreadySettled`],
    /// [`LedgerError::RegistrationClosed`] or [`LedgerError::AlreadyJoined`].
    pub fn check_join(&self, caller: &Address, now: i64) -> Result<Amount, LedgerError> {
        match self.phase(now) {
            PoolPhase::Canceled => return Err(LedgerError::PoolCanceled(self.id)),
            PoolPhase::Settled => return Err(LedgerError::AlreadySettled(self.id)),
            _ => {}
        }
        if now > self.params.registration_end_time {
            return Err(LedgerError::RegistrationClosed(self.id));
        }
        if self.has_joined(caller) {
            return Err(LedgerError::AlreadyJoined(self.id));
        }
        if self.escrow.checked_add(self.params.stake_amount).is_none() {
            return Err(LedgerError::Internal("escrow overflow".to_string()));
        }
        Ok(self.params.stake_amount)
    }

    /// Records a join whose stake custody already debited.
    ///
    /// Must follow a successful [`Pool::check_join`] under the same lock
    /// and with the same `now`.
    pub fn apply_join(&mut self, caller: Address, now: i64) -> Vec<LedgerEvent> {
        let mut events = self.advance(now);
        self.participants.insert(
            caller,
            Participant {
                has_joined: true,
                ..Participant::default()
            },
        );
        self.join_order.push(caller);
        self.escrow = self.escrow.saturating_add(self.params.stake_amount);
        events.push(LedgerEvent::ParticipantJoined {
            pool_id: self.id,
            participant: caller,
            escrow: self.escrow,
            participant_count: self.participant_count(),
            timestamp: ledger_time(now),
        });
        events
    }

    // ── Proof & vote tally ──────────────────────────────────────────────

    /// Records today's proof for `caller`, returning the day index.
    ///
    /// A proof may be replaced until it receives its first vote.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidProofRef`], [`LedgerError::NotJoined`],
    /// [`LedgerError::PoolInactive`], [`LedgerError::ProofWindowClosed`] or
    /// [`LedgerError::DuplicateSubmission`].
    pub fn submit_proof(
        &mut self,
        caller: Address,
        proof_ref: String,
        now: i64,
    ) -> Result<(u64, Vec<LedgerEvent>), LedgerError> {
        if proof_ref.trim().is_empty() {
            return Err(LedgerError::InvalidProofRef);
        }
        if !self.has_joined(&caller) {
            return Err(LedgerError::NotJoined(self.id));
        }
        let phase = self.phase(now);
        if phase.is_terminal() {
            return Err(LedgerError::PoolInactive(self.id));
        }
        if phase != PoolPhase::Active {
            return Err(LedgerError::ProofWindowClosed(self.id));
        }
        let day = self
            .current_day(now)
            .filter(|d| *d < self.params.duration_days)
            .ok_or(LedgerError::ProofWindowClosed(self.id))?;
        if self
            .submissions
            .get(&day)
            .and_then(|subs| subs.get(&caller))
            .is_some_and(Submission::has_votes)
        {
            return Err(LedgerError::DuplicateSubmission { day });
        }

        let mut events = self.advance(now);
        self.submissions
            .entry(day)
            .or_default()
            .insert(caller, Submission::new(proof_ref.clone(), now));
        events.push(LedgerEvent::ProofSubmitted {
            pool_id: self.id,
            participant: caller,
            day,
            proof_ref,
            timestamp: ledger_time(now),
        });
        Ok((day, events))
    }

    /// Counts `voter`'s judgement of `target`'s proof for `day`.
    ///
    /// Votes are accepted for any day up to the current one until the pool
    /// settles or cancels. A late vote on an already finalized day
    /// re-tallies that submission and adjusts the target's verified days.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotJoined`], [`LedgerError::PoolInactive`],
    /// [`LedgerError::SelfVote`], [`LedgerError::FutureDay`],
    /// [`LedgerError::VotingClosed`], [`LedgerError::NoSubmission`] or
    /// [`LedgerError::DuplicateVote`].
    pub fn vote(
        &mut self,
        voter: Address,
        day: u64,
        target: Address,
        approve: bool,
        now: i64,
    ) -> Result<(SubmissionView, Vec<LedgerEvent>), LedgerError> {
        if !self.has_joined(&voter) {
            return Err(LedgerError::NotJoined(self.id));
        }
        if self.phase(now).is_terminal() {
            return Err(LedgerError::PoolInactive(self.id));
        }
        if voter == target {
            return Err(LedgerError::SelfVote);
        }
        let current = self
            .current_day(now)
            .ok_or(LedgerError::FutureDay { day })?;
        if day > current {
            return Err(LedgerError::FutureDay { day });
        }
        if day >= self.params.duration_days {
            return Err(LedgerError::VotingClosed { day });
        }

        let required = self.required_yes_votes();
        let submission = self
            .submissions
            .get_mut(&day)
            .and_then(|subs| subs.get_mut(&target))
            .ok_or(LedgerError::NoSubmission { day })?;
        if submission.votes.contains_key(&voter) {
            return Err(LedgerError::DuplicateVote { day });
        }
        submission.votes.insert(voter, approve);
        if approve {
            submission.yes_votes = submission.yes_votes.saturating_add(1);
        } else {
            submission.no_votes = submission.no_votes.saturating_add(1);
        }
        let view = submission.view(required);

        if let Some(p) = self.participants.get_mut(&voter) {
            p.votes_cast = p.votes_cast.saturating_add(1);
        }

        let mut events = self.advance(now);
        if day < self.finalized_days {
            self.credit(day, target, view.is_verified);
        }
        events.push(LedgerEvent::VoteCast {
            pool_id: self.id,
            voter,
            target,
            day,
            approve,
            yes_votes: view.yes_votes,
            no_votes: view.no_votes,
            is_verified: view.is_verified,
            timestamp: ledger_time(now),
        });
        Ok((view, events))
    }

    // ── Settlement ──────────────────────────────────────────────────────

    /// Finalizes every day and fixes each participant's entitlement.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AlreadySettled`], [`LedgerError::PoolCanceled`],
    /// [`LedgerError::NotSettleable`] or [`LedgerError::Internal`] on
    /// amount overflow.
    pub fn process_results(
        &mut self,
        now: i64,
    ) -> Result<(Settlement, Vec<LedgerEvent>), LedgerError> {
        match self.phase(now) {
            PoolPhase::Settled => return Err(LedgerError::AlreadySettled(self.id)),
            PoolPhase::Canceled => return Err(LedgerError::PoolCanceled(self.id)),
            PoolPhase::Registration | PoolPhase::Active => {
                return Err(LedgerError::NotSettleable(self.id));
            }
            PoolPhase::Settleable => {}
        }

        let settlement = Settlement::compute(
            self.params.stake_amount,
            &self.final_standings(),
            self.params.min_votes_required,
            now,
        )?;

        let mut events = self.advance(now);
        let duration = self.params.duration_days;
        events.extend(self.finalize_through(duration, now));
        self.settled = true;
        self.settlement = Some(settlement.clone());
        events.push(LedgerEvent::PoolSettled {
            pool_id: self.id,
            reward_per_winner: settlement.reward_per_winner,
            qualifying_count: settlement.qualifying_count,
            dust: settlement.dust,
            refund_only: settlement.refund_only,
            timestamp: ledger_time(now),
        });
        Ok((settlement, events))
    }

    /// Computes what `caller` may withdraw.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotJoined`], [`LedgerError::AlreadyWithdrawn`] or
    /// [`LedgerError::NotSettled`].
    pub fn check_withdraw(&self, caller: &Address, now: i64) -> Result<Payout, LedgerError> {
        let participant = self
            .participants
            .get(caller)
            .ok_or(LedgerError::NotJoined(self.id))?;
        if participant.withdrawn {
            return Err(LedgerError::AlreadyWithdrawn(self.id));
        }
        let payout = match (self.phase(now), self.settlement.as_ref()) {
            (PoolPhase::Settled, Some(settlement)) => Payout {
                amount: settlement.entitlement_of(caller),
                refund: settlement.refund_only,
            },
            (PoolPhase::Canceled, _) => Payout {
                amount: self.params.stake_amount,
                refund: true,
            },
            _ => return Err(LedgerError::NotSettled(self.id)),
        };
        if payout.amount > self.escrow {
            return Err(LedgerError::Internal(format!(
                "escrow shortfall in pool {}",
                self.id
            )));
        }
        Ok(payout)
    }

    /// Records a payout custody already credited.
    ///
    /// Must follow a successful [`Pool::check_withdraw`] under the same lock
    /// and with the same `now`.
    pub fn apply_withdraw(&mut self, caller: Address, payout: Payout, now: i64) -> Vec<LedgerEvent> {
        let mut events = self.advance(now);
        if let Some(p) = self.participants.get_mut(&caller) {
            p.withdrawn = true;
        }
        self.escrow = self.escrow.saturating_sub(payout.amount);
        events.push(LedgerEvent::RewardWithdrawn {
            pool_id: self.id,
            participant: caller,
            amount: payout.amount,
            refund: payout.refund,
            timestamp: ledger_time(now),
        });
        events
    }

    /// Returns the dust available for the operator sweep.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotSettled`] or [`LedgerError::NoDust`].
    pub fn check_sweep(&self, now: i64) -> Result<Amount, LedgerError> {
        let settlement = match (self.phase(now), self.settlement.as_ref()) {
            (PoolPhase::Settled, Some(settlement)) => settlement,
            _ => return Err(LedgerError::NotSettled(self.id)),
        };
        if settlement.dust_swept || settlement.dust.is_zero() {
            return Err(LedgerError::NoDust(self.id));
        }
        Ok(settlement.dust)
    }

    /// Records a dust sweep custody already credited to `operator`.
    pub fn apply_sweep(&mut self, operator: Address, now: i64) -> Vec<LedgerEvent> {
        let Some(settlement) = self.settlement.as_mut() else {
            return Vec::new();
        };
        let amount = settlement.dust;
        settlement.dust_swept = true;
        self.escrow = self.escrow.saturating_sub(amount);
        vec![LedgerEvent::DustSwept {
            pool_id: self.id,
            operator,
            amount,
            timestamp: ledger_time(now),
        }]
    }

    // ── Read views ──────────────────────────────────────────────────────

    /// Static pool facts.
    #[must_use]
    pub fn details(&self) -> PoolDetails {
        PoolDetails {
            pool_id: self.id,
            params: self.params.clone(),
            participant_count: self.participant_count(),
            settled: self.settled,
            created_at: self.created_at,
        }
    }

    /// Economic state at `now`.
    #[must_use]
    pub fn state(&self, now: i64) -> PoolState {
        let phase = self.phase(now);
        let settlement = self.settlement.as_ref();
        PoolState {
            pool_id: self.id,
            phase,
            settled: self.settled,
            canceled: phase == PoolPhase::Canceled,
            refund_state: phase == PoolPhase::Canceled
                || settlement.is_some_and(|s| s.refund_only),
            reward_per_winner: settlement.map_or(Amount::ZERO, |s| s.reward_per_winner),
            participant_count: self.participant_count(),
            qualifying_count: settlement.map_or(0, |s| s.qualifying_count),
            escrow: self.escrow,
            dust: settlement.map_or(Amount::ZERO, |s| s.dust),
            dust_swept: settlement.is_some_and(|s| s.dust_swept),
            current_day: self.current_day(now),
            finalized_days: self.finalized_days,
        }
    }

    /// Summary for list views.
    #[must_use]
    pub fn summary(&self, now: i64) -> PoolSummary {
        PoolSummary {
            pool_id: self.id,
            name: self.params.name.clone(),
            stake_amount: self.params.stake_amount,
            duration_days: self.params.duration_days,
            participant_count: self.participant_count(),
            phase: self.phase(now),
        }
    }

    /// Progress of `user`; a zeroed record with `has_joined == false` for
    /// addresses that never joined.
    #[must_use]
    pub fn progress(&self, user: &Address) -> Participant {
        self.participants.get(user).cloned().unwrap_or_default()
    }

    /// Submission of `user` for `day` with its derived outcome.
    #[must_use]
    pub fn submission(&self, day: u64, user: &Address) -> Option<SubmissionView> {
        let required = self.required_yes_votes();
        self.submissions
            .get(&day)
            .and_then(|subs| subs.get(user))
            .map(|s| s.view(required))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const REG_END: i64 = NOW + 3_600;
    const DAY: i64 = SECONDS_PER_DAY;

    fn addr(b: u8) -> Address {
        let mut bytes = [0u8; Address::LEN];
        if let Some(last) = bytes.last_mut() {
            *last = b;
        }
        Address::from_bytes(bytes)
    }

    fn params() -> PoolParams {
        PoolParams {
            name: "Daily Run".to_string(),
            stake_amount: Amount::new(10),
            duration_days: 3,
            start_time: REG_END,
            registration_end_time: REG_END,
            min_contributors: 2,
            quorum_bps: 5_000,
            min_votes_required: 1,
        }
    }

    fn pool_with(params: PoolParams) -> Pool {
        let Ok(pool) = Pool::create(PoolId::new(0), params, NOW) else {
            panic!("pool creation failed");
        };
        pool
    }

    fn join(pool: &mut Pool, who: Address, now: i64) {
        let Ok(_) = pool.check_join(&who, now) else {
            panic!("join rejected");
        };
        let _ = pool.apply_join(who, now);
    }

    /// Pool with three joiners, now at the start of day 0.
    fn active_pool() -> Pool {
        let mut pool = pool_with(params());
        for b in 1..=3 {
            join(&mut pool, addr(b), NOW);
        }
        pool
    }

    fn day_start(day: i64) -> i64 {
        REG_END + 1 + day * DAY
    }

    // ── Creation ──

    #[test]
    fn create_rejects_each_invalid_parameter() {
        let mutations: [fn(&mut PoolParams); 11] = [
            |p| p.stake_amount = Amount::ZERO,
            |p| p.duration_days = 0,
            |p| p.registration_end_time = NOW - 1,
            |p| p.start_time = p.registration_end_time - 1,
            |p| p.min_contributors = 1,
            |p| p.quorum_bps = 0,
            |p| p.quorum_bps = 10_001,
            |p| p.min_votes_required = 0,
            |p| p.name = "  ".to_string(),
            |p| p.name = "x".repeat(101),
            |p| p.duration_days = u64::MAX,
        ];
        for mutate in mutations {
            let mut p = params();
            mutate(&mut p);
            let result = Pool::create(PoolId::new(0), p, NOW);
            assert!(
                matches!(result, Err(LedgerError::InvalidPoolParameters(_))),
                "{result:?}"
            );
        }
    }

    #[test]
    fn create_accepts_boundaries() {
        let mut p = params();
        p.registration_end_time = NOW;
        p.start_time = NOW;
        p.quorum_bps = 10_000;
        assert!(Pool::create(PoolId::new(0), p, NOW).is_ok());
    }

    // ── Membership ──

    #[test]
    fn join_until_registration_end_inclusive() {
        let mut pool = pool_with(params());
        assert_eq!(pool.check_join(&addr(1), REG_END), Ok(Amount::new(10)));
        let _ = pool.apply_join(addr(1), REG_END);
        assert_eq!(pool.escrow(), Amount::new(10));
        assert_eq!(
            pool.check_join(&addr(2), REG_END + 1),
            Err(LedgerError::PoolCanceled(PoolId::new(0)))
        );
    }

    #[test]
    fn join_after_close_on_healthy_pool_is_window_error() {
        let mut pool = active_pool();
        assert_eq!(
            pool.check_join(&addr(9), day_start(0)),
            Err(LedgerError::RegistrationClosed(PoolId::new(0)))
        );
        let before = pool.clone();
        let _ = pool.check_join(&addr(9), day_start(0));
        assert_eq!(pool, before);
    }

    #[test]
    fn double_join_rejected() {
        let mut pool = pool_with(params());
        join(&mut pool, addr(1), NOW);
        assert_eq!(
            pool.check_join(&addr(1), NOW),
            Err(LedgerError::AlreadyJoined(PoolId::new(0)))
        );
    }

    #[test]
    fn escrow_grows_by_stake_per_join() {
        let pool = active_pool();
        assert_eq!(pool.escrow(), Amount::new(30));
        assert_eq!(pool.participants(), &[addr(1), addr(2), addr(3)]);
        assert!(pool.progress(&addr(2)).has_joined);
    }

    #[test]
    fn too_few_joiners_cancels_and_refunds() {
        let mut pool = pool_with(params());
        join(&mut pool, addr(1), NOW);
        let later = REG_END + 1;
        assert_eq!(pool.phase(later), PoolPhase::Canceled);
        assert!(pool.state(later).refund_state);

        assert_eq!(
            pool.submit_proof(addr(1), "ipfs://x".to_string(), later),
            Err(LedgerError::PoolInactive(PoolId::new(0)))
        );

        let Ok(payout) = pool.check_withdraw(&addr(1), later) else {
            panic!("refund rejected");
        };
        assert_eq!(payout.amount, Amount::new(10));
        assert!(payout.refund);
        let events = pool.apply_withdraw(addr(1), payout, later);
        assert_eq!(events.first().map(LedgerEvent::event_type_str), Some("pool_canceled"));
        assert_eq!(pool.escrow(), Amount::ZERO);
        assert_eq!(
            pool.check_withdraw(&addr(1), later),
            Err(LedgerError::AlreadyWithdrawn(PoolId::new(0)))
        );
    }

    // ── Proofs ──

    #[test]
    fn proof_requires_membership_and_active_window() {
        let mut pool = active_pool();
        assert_eq!(
            pool.submit_proof(addr(9), "p".to_string(), day_start(0)),
            Err(LedgerError::NotJoined(PoolId::new(0)))
        );
        assert_eq!(
            pool.submit_proof(addr(1), "p".to_string(), NOW),
            Err(LedgerError::ProofWindowClosed(PoolId::new(0)))
        );
        assert_eq!(
            pool.submit_proof(addr(1), "p".to_string(), day_start(3)),
            Err(LedgerError::ProofWindowClosed(PoolId::new(0)))
        );
        assert_eq!(
            pool.submit_proof(addr(1), " ".to_string(), day_start(0)),
            Err(LedgerError::InvalidProofRef)
        );
    }

    #[test]
    fn proof_lands_on_current_day() {
        let mut pool = active_pool();
        let Ok((day, _)) = pool.submit_proof(addr(1), "ipfs://day1".to_string(), day_start(1))
        else {
            panic!("submission failed");
        };
        assert_eq!(day, 1);
        let Some(view) = pool.submission(1, &addr(1)) else {
            panic!("submission missing");
        };
        assert_eq!(view.proof_ref, "ipfs://day1");
        assert_eq!(view.timestamp, day_start(1));
        assert!(!view.is_verified);
    }

    #[test]
    fn proof_overwrite_allowed_until_first_vote() {
        let mut pool = active_pool();
        let t = day_start(0);
        assert!(pool.submit_proof(addr(1), "a".to_string(), t).is_ok());
        assert!(pool.submit_proof(addr(1), "b".to_string(), t + 10).is_ok());
        assert!(pool.vote(addr(2), 0, addr(1), true, t + 20).is_ok());
        assert_eq!(
            pool.submit_proof(addr(1), "c".to_string(), t + 30),
            Err(LedgerError::DuplicateSubmission { day: 0 })
        );
        assert_eq!(
            pool.submission(0, &addr(1)).map(|s| s.proof_ref),
            Some("b".to_string())
        );
    }

    // ── Votes ──

    #[test]
    fn vote_rules() {
        let mut pool = active_pool();
        let t = day_start(0);
        let _ = pool.submit_proof(addr(1), "a".to_string(), t);

        assert_eq!(
            pool.vote(addr(1), 0, addr(1), true, t),
            Err(LedgerError::SelfVote)
        );
        assert_eq!(
            pool.vote(addr(9), 0, addr(1), true, t),
            Err(LedgerError::NotJoined(PoolId::new(0)))
        );
        assert_eq!(
            pool.vote(addr(2), 1, addr(1), true, t),
            Err(LedgerError::FutureDay { day: 1 })
        );
        assert_eq!(
            pool.vote(addr(2), 0, addr(3), true, t),
            Err(LedgerError::NoSubmission { day: 0 })
        );
        assert!(pool.vote(addr(2), 0, addr(1), true, t).is_ok());
        assert_eq!(
            pool.vote(addr(2), 0, addr(1), false, t),
            Err(LedgerError::DuplicateVote { day: 0 })
        );
        let Some(view) = pool.submission(0, &addr(1)) else {
            panic!("submission missing");
        };
        assert_eq!((view.yes_votes, view.no_votes), (1, 0));
        assert_eq!(pool.progress(&addr(2)).votes_cast, 1);
    }

    #[test]
    fn failed_vote_leaves_pool_untouched() {
        let mut pool = active_pool();
        let t = day_start(0);
        let _ = pool.submit_proof(addr(1), "a".to_string(), t);
        let _ = pool.vote(addr(2), 0, addr(1), true, t);
        let before = pool.clone();
        let _ = pool.vote(addr(2), 0, addr(1), true, t + 5);
        assert_eq!(pool, before);
    }

    #[test]
    fn late_vote_verifies_finalized_day_once() {
        let mut pool = active_pool();
        // last second of day 0
        let _ = pool.submit_proof(addr(1), "a".to_string(), day_start(1) - 2);
        let _ = pool.submit_proof(addr(2), "b".to_string(), day_start(1));
        assert_eq!(pool.finalized_days(), 1);
        assert_eq!(pool.progress(&addr(1)).verified_days, 0);

        let Ok((view, _)) = pool.vote(addr(2), 0, addr(1), true, day_start(1) + 1) else {
            panic!("late vote rejected");
        };
        assert!(view.is_verified);
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);

        // later finalization and settlement must not count day 0 again
        let _ = pool.submit_proof(addr(3), "c".to_string(), day_start(2));
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);
        let Ok((settlement, _)) = pool.process_results(day_start(3)) else {
            panic!("settlement failed");
        };
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);
        assert_eq!(settlement.qualifying_count, 1);
        assert_eq!(
            pool.vote(addr(3), 0, addr(1), true, day_start(3)),
            Err(LedgerError::PoolInactive(PoolId::new(0)))
        );
    }

    #[test]
    fn late_no_vote_withdraws_credit() {
        let mut pool = active_pool();
        let _ = pool.submit_proof(addr(1), "a".to_string(), day_start(0));
        let _ = pool.vote(addr(2), 0, addr(1), true, day_start(0));
        let _ = pool.submit_proof(addr(2), "b".to_string(), day_start(1));
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);

        let Ok((view, _)) = pool.vote(addr(3), 0, addr(1), false, day_start(1) + 5) else {
            panic!("late vote rejected");
        };
        // one yes, one no: no longer a majority
        assert!(!view.is_verified);
        assert_eq!(pool.progress(&addr(1)).verified_days, 0);
    }

    #[test]
    fn votes_for_days_past_duration_are_closed() {
        let mut pool = active_pool();
        assert_eq!(
            pool.vote(addr(2), 3, addr(1), true, day_start(3)),
            Err(LedgerError::VotingClosed { day: 3 })
        );
    }

    #[test]
    fn verification_needs_quorum_and_majority() {
        let mut pool = active_pool();
        let t = day_start(0);
        let _ = pool.submit_proof(addr(1), "a".to_string(), t);
        let Ok((view, _)) = pool.vote(addr(2), 0, addr(1), false, t) else {
            panic!("vote failed");
        };
        assert!(!view.is_verified);
        let Ok((view, _)) = pool.vote(addr(3), 0, addr(1), true, t) else {
            panic!("vote failed");
        };
        // one yes, one no: quorum met but no majority
        assert!(!view.is_verified);
    }

    // ── Finalization ──

    #[test]
    fn days_finalize_once_as_time_passes() {
        let mut pool = active_pool();
        let t = day_start(0);
        let _ = pool.submit_proof(addr(1), "a".to_string(), t);
        let _ = pool.vote(addr(2), 0, addr(1), true, t);
        assert_eq!(pool.progress(&addr(1)).verified_days, 0);

        let Ok((_, events)) = pool.submit_proof(addr(2), "b".to_string(), day_start(1)) else {
            panic!("submission failed");
        };
        assert_eq!(events.first().map(LedgerEvent::event_type_str), Some("day_finalized"));
        assert_eq!(pool.finalized_days(), 1);
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);

        let _ = pool.submit_proof(addr(3), "c".to_string(), day_start(1) + 60);
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);
    }

    // ── Settlement ──

    #[test]
    fn settlement_scenario_two_winners_one_no_show() {
        let mut pool = active_pool();
        let t = day_start(0);
        let _ = pool.submit_proof(addr(1), "a".to_string(), t);
        let _ = pool.submit_proof(addr(2), "b".to_string(), t);
        let _ = pool.vote(addr(2), 0, addr(1), true, t);
        let _ = pool.vote(addr(3), 0, addr(2), true, t);

        let end = day_start(3);
        assert_eq!(
            pool.process_results(end - 2),
            Err(LedgerError::NotSettleable(PoolId::new(0)))
        );
        let Ok((settlement, _)) = pool.process_results(end) else {
            panic!("settlement failed");
        };
        assert_eq!(settlement.reward_per_winner, Amount::new(5));
        assert_eq!(settlement.entitlement_of(&addr(1)), Amount::new(15));
        assert_eq!(settlement.entitlement_of(&addr(2)), Amount::new(15));
        assert_eq!(settlement.entitlement_of(&addr(3)), Amount::ZERO);
        assert_eq!(pool.progress(&addr(1)).verified_days, 1);
        assert_eq!(pool.finalized_days(), 3);
        assert_eq!(
            pool.process_results(end),
            Err(LedgerError::AlreadySettled(PoolId::new(0)))
        );
        let state = pool.state(end);
        assert!(state.settled);
        assert!(!state.refund_state);
        assert_eq!(state.qualifying_count, 2);
    }

    #[test]
    fn final_day_is_finalized_at_settlement() {
        let mut pool = active_pool();
        let last = day_start(2);
        let _ = pool.submit_proof(addr(3), "z".to_string(), last);
        let _ = pool.vote(addr(1), 2, addr(3), true, last);
        let Ok((settlement, _)) = pool.process_results(day_start(3)) else {
            panic!("settlement failed");
        };
        assert_eq!(settlement.qualifying_count, 1);
        assert_eq!(settlement.entitlement_of(&addr(3)), Amount::new(30));
    }

    #[test]
    fn withdrawals_are_single_and_order_independent() {
        let mut pool = active_pool();
        let t = day_start(0);
        let _ = pool.submit_proof(addr(1), "a".to_string(), t);
        let _ = pool.vote(addr(2), 0, addr(1), true, t);
        let end = day_start(3);
        assert_eq!(
            pool.check_withdraw(&addr(1), end),
            Err(LedgerError::NotSettled(PoolId::new(0)))
        );
        let _ = pool.process_results(end);

        for who in [addr(3), addr(1), addr(2)] {
            let Ok(payout) = pool.check_withdraw(&who, end) else {
                panic!("withdraw rejected");
            };
            let _ = pool.apply_withdraw(who, payout, end);
        }
        assert_eq!(pool.escrow(), Amount::ZERO);
        assert_eq!(
            pool.check_withdraw(&addr(1), end),
            Err(LedgerError::AlreadyWithdrawn(PoolId::new(0)))
        );
    }

    #[test]
    fn dust_is_kept_until_swept() {
        let mut p = params();
        p.min_contributors = 4;
        let mut pool = pool_with(p);
        for b in 1..=4 {
            join(&mut pool, addr(b), NOW);
        }
        let t = day_start(0);
        for b in 1..=3 {
            let _ = pool.submit_proof(addr(b), "x".to_string(), t);
        }
        for (voter, target) in [(2, 1), (3, 1), (1, 2), (3, 2), (1, 3), (2, 3)] {
            let _ = pool.vote(addr(voter), 0, addr(target), true, t);
        }
        let end = day_start(3);
        assert_eq!(
            pool.check_sweep(end),
            Err(LedgerError::NotSettled(PoolId::new(0)))
        );
        let Ok((settlement, _)) = pool.process_results(end) else {
            panic!("settlement failed");
        };
        assert_eq!(settlement.reward_per_winner, Amount::new(3));
        assert_eq!(settlement.dust, Amount::new(1));
        assert_eq!(pool.check_sweep(end), Ok(Amount::new(1)));

        let _ = pool.apply_sweep(addr(99), end);
        assert_eq!(pool.escrow(), Amount::new(39));
        assert_eq!(pool.check_sweep(end), Err(LedgerError::NoDust(PoolId::new(0))));
    }

    #[test]
    fn nobody_verified_means_refund_state() {
        let mut pool = active_pool();
        let end = day_start(3);
        let Ok((settlement, _)) = pool.process_results(end) else {
            panic!("settlement failed");
        };
        assert!(settlement.refund_only);
        assert!(pool.state(end).refund_state);
        let Ok(payout) = pool.check_withdraw(&addr(2), end) else {
            panic!("withdraw rejected");
        };
        assert_eq!(payout.amount, Amount::new(10));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut pool = active_pool();
        let _ = pool.submit_proof(addr(1), "a".to_string(), day_start(0));
        let _ = pool.vote(addr(2), 0, addr(1), true, day_start(0));
        let json = serde_json::to_value(&pool).unwrap_or_default();
        let Ok(restored) = serde_json::from_value::<Pool>(json) else {
            panic!("snapshot deserialization failed");
        };
        assert_eq!(restored, pool);
    }
}
