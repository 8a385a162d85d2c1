use chrono::{DateTime, Utc};
use common::AccountId;

use crate::aggregate::{Aggregate, AggregateRoot};
use crate::error::DomainError;
use crate::projection::{DecisionProjection, Mutator, ProjectionData};

use super::{
    AccountBlockedData, AccountError, AccountEvent, AccountEventKind, AccountOpenedData,
    AccountUnblockedData, AmountData, BLOCK_COUNTDOWN, BLOCK_DURATION, Money,
};

const IS_OPENED: &str = "isOpened";
const BALANCE: &str = "balance";
const BLOCK_COUNTDOWN_KEY: &str = "blockCountdown";
const BLOCKED_UNTIL: &str = "blockedUntil";

/// A bank account that freezes after repeated overdraft attempts.
///
/// Each refused debit decrements `blockCountdown`. Once it reaches zero the
/// next refused debit blocks the account for [`BLOCK_DURATION`]; the first
/// debit attempted after the block expires lifts it and resets the
/// countdown.
pub struct Account {
    id: AccountId,
    root: AggregateRoot<AccountEvent>,
}

impl Aggregate for Account {
    type Id = AccountId;
    type Event = AccountEvent;

    fn register(projection: &mut DecisionProjection<AccountEvent>) {
        for kind in AccountEventKind::ALL {
            let mutator: Mutator<AccountEvent> = match kind {
                AccountEventKind::AccountOpened => on_opened,
                AccountEventKind::AccountCredited => on_credited,
                AccountEventKind::AccountDebited => on_debited,
                AccountEventKind::DebitRejected => on_debit_rejected,
                AccountEventKind::AccountBlocked => on_blocked,
                AccountEventKind::AccountUnblocked => on_unblocked,
            };
            projection.register(kind, mutator);
        }
    }

    fn from_root(id: AccountId, root: AggregateRoot<AccountEvent>) -> Self {
        Self { id, root }
    }

    fn root(&self) -> &AggregateRoot<AccountEvent> {
        &self.root
    }
}

fn on_opened(data: &mut ProjectionData, _event: &AccountEvent) {
    data.set(IS_OPENED, true);
    data.set(BALANCE, Money::zero());
    data.set(BLOCK_COUNTDOWN_KEY, BLOCK_COUNTDOWN);
}

fn on_credited(data: &mut ProjectionData, event: &AccountEvent) {
    if let AccountEvent::AccountCredited(d) = event {
        data.increment(BALANCE, d.amount.cents());
    }
}

fn on_debited(data: &mut ProjectionData, event: &AccountEvent) {
    if let AccountEvent::AccountDebited(d) = event {
        data.increment(BALANCE, -d.amount.cents());
    }
}

fn on_debit_rejected(data: &mut ProjectionData, _event: &AccountEvent) {
    data.increment(BLOCK_COUNTDOWN_KEY, -1);
}

fn on_blocked(data: &mut ProjectionData, event: &AccountEvent) {
    if let AccountEvent::AccountBlocked(d) = event {
        data.set(BLOCKED_UNTIL, d.until);
    }
}

fn on_unblocked(data: &mut ProjectionData, _event: &AccountEvent) {
    data.remove(BLOCKED_UNTIL);
    data.set(BLOCK_COUNTDOWN_KEY, BLOCK_COUNTDOWN);
}

impl Account {
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn is_opened(&self) -> bool {
        self.root.state().flag(IS_OPENED)
    }

    /// Returns the current balance.
    pub fn balance(&self) -> Money {
        Money::from_cents(self.root.state().int(BALANCE))
    }

    /// Returns how many more refused debits are tolerated before blocking.
    pub fn block_countdown(&self) -> i64 {
        self.root.state().int(BLOCK_COUNTDOWN_KEY)
    }

    /// Returns the end of the current block, if the account was blocked and
    /// has not been unblocked since.
    pub fn blocked_until(&self) -> Option<DateTime<Utc>> {
        self.root.state().read(BLOCKED_UNTIL)
    }

    pub fn is_blocked_at(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until().is_some_and(|until| now < until)
    }

    /// Opens the account with a zero balance.
    pub async fn open(&mut self) -> Result<(), DomainError> {
        if self.is_opened() {
            return Err(AccountError::AlreadyOpened.into());
        }

        let event = AccountEvent::AccountOpened(AccountOpenedData {
            opened_at: Utc::now(),
        });
        self.root.emit(event).await
    }

    /// Deposits `amount`.
    pub async fn credit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.ensure_opened()?;
        if !amount.is_positive() {
            return Err(AccountError::InvalidAmount { amount }.into());
        }
        let balance = self.balance();
        if balance.checked_add(amount).is_none() {
            return Err(AccountError::BalanceOverflow { balance, amount }.into());
        }

        self.root
            .emit(AccountEvent::AccountCredited(AmountData { amount }))
            .await
    }

    /// Withdraws `amount`.
    pub async fn debit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.debit_at(amount, Utc::now()).await
    }

    /// Withdraws `amount`, judging blocks against `now`.
    ///
    /// Unlike other commands this one may record an event and still fail: a
    /// refused debit is stored as `DebitRejected` or `AccountBlocked` before
    /// the error is returned.
    pub async fn debit_at(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_opened()?;
        if !amount.is_positive() {
            return Err(AccountError::InvalidAmount { amount }.into());
        }

        if let Some(until) = self.blocked_until() {
            if now < until {
                return Err(AccountError::Blocked { until }.into());
            }
            tracing::info!(account_id = %self.id, %until, "block expired, unblocking account");
            let event = AccountEvent::AccountUnblocked(AccountUnblockedData { unblocked_at: now });
            self.root.emit(event).await?;
        }

        let balance = self.balance();
        if balance < amount {
            if self.block_countdown() > 0 {
                self.root
                    .emit(AccountEvent::DebitRejected(AmountData { amount }))
                    .await?;
                return Err(AccountError::InsufficientBalance { balance, amount }.into());
            }

            let until = now + BLOCK_DURATION;
            tracing::warn!(account_id = %self.id, %until, "blocking account");
            self.root
                .emit(AccountEvent::AccountBlocked(AccountBlockedData { until }))
                .await?;
            return Err(AccountError::Blocked { until }.into());
        }

        self.root
            .emit(AccountEvent::AccountDebited(AmountData { amount }))
            .await
    }

    fn ensure_opened(&self) -> Result<(), AccountError> {
        if !self.is_opened() {
            return Err(AccountError::NotOpened);
        }
        Ok(())
    }
}
