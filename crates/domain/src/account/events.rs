//! Account domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventKind};

use super::Money;

/// Events that can occur on a bank account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AccountEvent {
    /// Account was opened with a zero balance.
    AccountOpened(AccountOpenedData),

    /// Money was deposited.
    AccountCredited(AmountData),

    /// Money was withdrawn.
    AccountDebited(AmountData),

    /// A withdrawal was refused for lack of funds.
    DebitRejected(AmountData),

    /// Too many refused withdrawals; the account is frozen for a while.
    AccountBlocked(AccountBlockedData),

    /// The freeze expired.
    AccountUnblocked(AccountUnblockedData),
}

/// Discriminator of [`AccountEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountEventKind {
    AccountOpened,
    AccountCredited,
    AccountDebited,
    DebitRejected,
    AccountBlocked,
    AccountUnblocked,
}

impl AccountEventKind {
    /// Every account event kind.
    pub const ALL: [AccountEventKind; 6] = [
        AccountEventKind::AccountOpened,
        AccountEventKind::AccountCredited,
        AccountEventKind::AccountDebited,
        AccountEventKind::DebitRejected,
        AccountEventKind::AccountBlocked,
        AccountEventKind::AccountUnblocked,
    ];
}

impl EventKind for AccountEventKind {
    fn as_str(&self) -> &'static str {
        match self {
            AccountEventKind::AccountOpened => "AccountOpened",
            AccountEventKind::AccountCredited => "AccountCredited",
            AccountEventKind::AccountDebited => "AccountDebited",
            AccountEventKind::DebitRejected => "DebitRejected",
            AccountEventKind::AccountBlocked => "AccountBlocked",
            AccountEventKind::AccountUnblocked => "AccountUnblocked",
        }
    }
}

impl DomainEvent for AccountEvent {
    type Kind = AccountEventKind;

    fn kind(&self) -> AccountEventKind {
        match self {
            AccountEvent::AccountOpened(_) => AccountEventKind::AccountOpened,
            AccountEvent::AccountCredited(_) => AccountEventKind::AccountCredited,
            AccountEvent::AccountDebited(_) => AccountEventKind::AccountDebited,
            AccountEvent::DebitRejected(_) => AccountEventKind::DebitRejected,
            AccountEvent::AccountBlocked(_) => AccountEventKind::AccountBlocked,
            AccountEvent::AccountUnblocked(_) => AccountEventKind::AccountUnblocked,
        }
    }
}

/// Data for AccountOpened event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOpenedData {
    pub opened_at: DateTime<Utc>,
}

/// Amount carried by credit, debit and rejected debit events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountData {
    pub amount: Money,
}

/// Data for AccountBlocked event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBlockedData {
    /// Debits are refused until this instant.
    pub until: DateTime<Utc>,
}

/// Data for AccountUnblocked event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUnblockedData {
    pub unblocked_at: DateTime<Utc>,
}
