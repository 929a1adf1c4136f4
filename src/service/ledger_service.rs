//! Ledger service: orchestrates pool operations, custody and events.

use std::sync::Arc;

use crate::domain::clock::ledger_time;
use crate::domain::{
    Address, Amount, Clock, Custody, EventBus, LedgerEvent, Participant, Payout, Pool,
    PoolDetails, PoolId, PoolParams, PoolRegistry, PoolState, PoolSummary, Settlement,
    SubmissionView,
};
use crate::error::LedgerError;
use crate::persistence::SnapshotSink;

/// Orchestration layer for all ledger operations.
///
/// Stateless coordinator: owns references to [`PoolRegistry`] for state,
/// a [`Custody`] for funds, a [`Clock`] for time and an [`EventBus`] for
/// event emission. Every mutation follows the pattern: acquire the pool
/// write lock → validate → move funds → mutate → write the snapshot
/// through → release the lock → emit events.
#[derive(Debug, Clone)]
pub struct LedgerService {
    registry: Arc<PoolRegistry>,
    custody: Arc<dyn Custody>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    operator: Option<Address>,
    snapshots: Option<Arc<dyn SnapshotSink>>,
}

impl LedgerService {
    /// Creates a new `LedgerService` without an operator account.
    #[must_use]
    pub fn new(
        registry: Arc<PoolRegistry>,
        custody: Arc<dyn Custody>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            custody,
            clock,
            event_bus,
            operator: None,
            snapshots: None,
        }
    }

    /// Sets the operator account allowed to sweep settlement dust.
    #[must_use]
    pub fn with_operator(mut self, operator: Option<Address>) -> Self {
        self.operator = operator;
        self
    }

    /// Writes every mutated pool through to `sink` before the mutation
    /// returns.
    #[must_use]
    pub fn with_snapshots(mut self, sink: Option<Arc<dyn SnapshotSink>>) -> Self {
        self.snapshots = sink;
        self
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PoolRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Returns the current ledger time.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Saves `pool` through the snapshot sink, if any. Failures are logged;
    /// the periodic snapshot task writes the pool again later.
    async fn write_through(&self, pool: &Pool) {
        let Some(sink) = &self.snapshots else {
            return;
        };
        if let Err(e) = sink.save(pool).await {
            tracing::error!(pool_id = %pool.id(), error = %e, "write-through snapshot failed");
        }
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Creates a pool with the next sequential id. No funds move.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPoolParameters`] on invalid parameters.
    pub async fn create_pool(&self, params: PoolParams) -> Result<PoolDetails, LedgerError> {
        let now = self.clock.now();
        let pool = self.registry.create(params, now).await?;
        let details = pool.details();
        let pool_id = details.pool_id;

        let pool_lock = self.registry.get(pool_id).await?;
        self.write_through(&*pool_lock.read().await).await;

        self.event_bus.publish(LedgerEvent::PoolCreated {
            pool_id,
            name: details.params.name.clone(),
            stake_amount: details.params.stake_amount,
            duration_days: details.params.duration_days,
            timestamp: ledger_time(now),
        });

        tracing::info!(
            %pool_id,
            name = %details.params.name,
            stake = %details.params.stake_amount,
            duration_days = details.params.duration_days,
            "pool created"
        );
        Ok(details)
    }

    /// Escrows the stake of `caller` and records them as a participant.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`], any join rule failure of
    /// [`Pool::check_join`], or [`LedgerError::InsufficientStake`] from
    /// custody.
    pub async fn join_pool(&self, pool_id: PoolId, caller: Address) -> Result<PoolState, LedgerError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let now = self.clock.now();

        let stake = pool.check_join(&caller, now)?;
        self.custody.debit(&caller, stake)?;
        let events = pool.apply_join(caller, now);
        let state = pool.state(now);
        self.write_through(&pool).await;

        drop(pool);

        self.event_bus.publish_all(events);
        tracing::info!(%pool_id, %caller, %stake, participants = state.participant_count, "participant joined");
        Ok(state)
    }

    /// Records today's proof for `caller`.
    ///
    /// Returns the day index and the stored submission.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] or any rule failure of
    /// [`Pool::submit_proof`].
    pub async fn submit_proof(
        &self,
        pool_id: PoolId,
        caller: Address,
        proof_ref: String,
    ) -> Result<(u64, SubmissionView), LedgerError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let now = self.clock.now();

        let (day, events) = pool.submit_proof(caller, proof_ref, now)?;
        let view = pool
            .submission(day, &caller)
            .ok_or(LedgerError::SubmissionNotFound { day })?;
        self.write_through(&pool).await;

        drop(pool);

        self.event_bus.publish_all(events);
        tracing::info!(%pool_id, %caller, day, "proof submitted");
        Ok((day, view))
    }

    /// Counts a vote by `caller` on `target`'s proof for `day`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] or any rule failure of
    /// [`Pool::vote`].
    pub async fn vote(
        &self,
        pool_id: PoolId,
        caller: Address,
        day: u64,
        target: Address,
        approve: bool,
    ) -> Result<SubmissionView, LedgerError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let now = self.clock.now();

        let (view, events) = pool.vote(caller, day, target, approve, now)?;
        self.write_through(&pool).await;

        drop(pool);

        self.event_bus.publish_all(events);
        tracing::info!(
            %pool_id,
            voter = %caller,
            %target,
            day,
            approve,
            verified = view.is_verified,
            "vote cast"
        );
        Ok(view)
    }

    /// Settles a pool whose duration elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] or any rule failure of
    /// [`Pool::process_results`].
    pub async fn process_pool_results(&self, pool_id: PoolId) -> Result<Settlement, LedgerError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let now = self.clock.now();

        let (settlement, events) = pool.process_results(now)?;
        self.write_through(&pool).await;

        drop(pool);

        self.event_bus.publish_all(events);
        tracing::info!(
            %pool_id,
            winners = settlement.qualifying_count,
            reward = %settlement.reward_per_winner,
            dust = %settlement.dust,
            refund_only = settlement.refund_only,
            "pool settled"
        );
        Ok(settlement)
    }

    /// Pays out the entitlement (or refund) of `caller`.
    ///
    /// A zero entitlement succeeds without a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`], any rule failure of
    /// [`Pool::check_withdraw`], or a custody failure.
    pub async fn withdraw_reward(&self, pool_id: PoolId, caller: Address) -> Result<Payout, LedgerError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let now = self.clock.now();

        let payout = pool.check_withdraw(&caller, now)?;
        if !payout.amount.is_zero() {
            self.custody.credit(&caller, payout.amount)?;
        }
        let events = pool.apply_withdraw(caller, payout, now);
        self.write_through(&pool).await;

        drop(pool);

        self.event_bus.publish_all(events);
        tracing::info!(%pool_id, %caller, amount = %payout.amount, refund = payout.refund, "reward withdrawn");
        Ok(payout)
    }

    /// Moves the settlement dust of a pool to the operator account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] unless `caller` is the
    /// configured operator, [`LedgerError::PoolNotFound`],
    /// [`LedgerError::NotSettled`] or [`LedgerError::NoDust`].
    pub async fn sweep_dust(&self, pool_id: PoolId, caller: Address) -> Result<Amount, LedgerError> {
        let operator = self
            .operator
            .ok_or_else(|| LedgerError::Unauthorized("no operator configured".to_string()))?;
        if caller != operator {
            return Err(LedgerError::Unauthorized(format!(
                "{caller} is not the operator"
            )));
        }

        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let now = self.clock.now();

        let dust = pool.check_sweep(now)?;
        self.custody.credit(&operator, dust)?;
        let events = pool.apply_sweep(operator, now);
        self.write_through(&pool).await;

        drop(pool);

        self.event_bus.publish_all(events);
        tracing::info!(%pool_id, %operator, amount = %dust, "dust swept");
        Ok(dust)
    }

    // ── Views ───────────────────────────────────────────────────────────

    async fn read<T>(&self, pool_id: PoolId, f: impl FnOnce(&Pool, i64) -> T) -> Result<T, LedgerError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let pool = pool_lock.read().await;
        Ok(f(&pool, self.clock.now()))
    }

    /// Static pool facts.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
    pub async fn pool_details(&self, pool_id: PoolId) -> Result<PoolDetails, LedgerError> {
        self.read(pool_id, |pool, _| pool.details()).await
    }

    /// Economic state of a pool at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
    pub async fn pool_state(&self, pool_id: PoolId) -> Result<PoolState, LedgerError> {
        self.read(pool_id, |pool, now| pool.state(now)).await
    }

    /// Participant addresses in join order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
    pub async fn participants(&self, pool_id: PoolId) -> Result<Vec<Address>, LedgerError> {
        self.read(pool_id, |pool, _| pool.participants().to_vec()).await
    }

    /// Progress of `user`; zeroed with `has_joined == false` for strangers.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] if the pool does not exist.
    pub async fn user_progress(&self, pool_id: PoolId, user: Address) -> Result<Participant, LedgerError> {
        self.read(pool_id, |pool, _| pool.progress(&user)).await
    }

    /// Submission of `user` for `day`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PoolNotFound`] or
    /// [`LedgerError::SubmissionNotFound`].
    pub async fn submission(
        &self,
        pool_id: PoolId,
        day: u64,
        user: Address,
    ) -> Result<SubmissionView, LedgerError> {
        self.read(pool_id, |pool, _| pool.submission(day, &user))
            .await?
            .ok_or(LedgerError::SubmissionNotFound { day })
    }

    /// Number of pool ids allocated so far.
    pub async fn pool_count(&self) -> u64 {
        self.registry.pool_count().await
    }

    /// Summaries of every pool in id order.
    pub async fn list_pools(&self) -> Vec<PoolSummary> {
        self.registry.list(self.clock.now()).await
    }

    // ── Custody ─────────────────────────────────────────────────────────

    /// Custody balance of `account`.
    ///
    /// # Errors
    ///
    /// Propagates custody failures.
    pub fn balance_of(&self, account: &Address) -> Result<Amount, LedgerError> {
        self.custody.balance_of(account)
    }

    /// Credits `amount` to `account` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Propagates custody failures.
    pub fn deposit(&self, account: &Address, amount: Amount) -> Result<Amount, LedgerError> {
        self.custody.credit(account, amount)?;
        tracing::info!(%account, %amount, "faucet deposit");
        self.custody.balance_of(account)
    }
}
