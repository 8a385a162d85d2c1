//! Bank account aggregate.

mod aggregate;
mod events;
mod money;

pub use aggregate::Account;
pub use events::{
    AccountBlockedData, AccountEvent, AccountEventKind, AccountOpenedData, AccountUnblockedData,
    AmountData,
};
pub use money::Money;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// Refused debits tolerated before the account is blocked.
pub const BLOCK_COUNTDOWN: i64 = 3;

/// How long a block lasts.
pub const BLOCK_DURATION: TimeDelta = TimeDelta::hours(1);

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account not opened")]
    NotOpened,

    #[error("Account already opened")]
    AlreadyOpened,

    #[error("Invalid amount: {amount} (must be greater than 0)")]
    InvalidAmount { amount: Money },

    #[error("Insufficient balance: {balance} available, {amount} requested")]
    InsufficientBalance { balance: Money, amount: Money },

    #[error("Account blocked until {until}")]
    Blocked { until: DateTime<Utc> },

    #[error("Crediting {amount} would overflow the balance of {balance}")]
    BalanceOverflow { balance: Money, amount: Money },
}
