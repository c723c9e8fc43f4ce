use chrono::{DateTime, Utc};
use rand::Rng;

use super::{fixture_key, CURRENCY};
use crate::entity::{Domain, Entity, Scalar};
use crate::sampling::{round_to_thousand, sample_recent_timestamp};

const UPDATE_LOOK_BACK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Savings,
    Checking,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Checking => "checking",
        }
    }

    /// Inclusive balance range in COP.
    pub fn balance_range(self) -> (i64, i64) {
        match self {
            Self::Savings => (1_000_000, 50_000_000),
            Self::Checking => (500_000, 15_000_000),
        }
    }
}

const BOTH: &[AccountKind] = &[AccountKind::Savings, AccountKind::Checking];
const SAVINGS_ONLY: &[AccountKind] = &[AccountKind::Savings];
const CHECKING_ONLY: &[AccountKind] = &[AccountKind::Checking];

pub const USER_ACCOUNTS: &[(&str, &[AccountKind])] = &[
    ("santi", BOTH),
    ("moni", BOTH),
    ("jero", BOTH),
    ("joachim", BOTH),
    ("fabi", SAVINGS_ONLY),
    ("chucho", BOTH),
    ("herb", BOTH),
    ("vale", CHECKING_ONLY),
    ("naz", BOTH),
    ("javi", BOTH),
    ("elkin", SAVINGS_ONLY),
];

pub fn accounts_for_user(username: &str) -> &'static [AccountKind] {
    USER_ACCOUNTS
        .iter()
        .find(|(name, _)| *name == username)
        .map(|(_, kinds)| *kinds)
        .unwrap_or(&[])
}

pub fn generate_balances<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<Entity> {
    let mut balances = Vec::new();
    for (username, kinds) in USER_ACCOUNTS {
        balances.extend(generate_user_balances(rng, now, username, kinds));
    }
    balances
}

pub(crate) fn generate_user_balances<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    username: &str,
    kinds: &[AccountKind],
) -> Vec<Entity> {
    kinds
        .iter()
        .map(|kind| {
            let (min_balance, max_balance) = kind.balance_range();
            let balance = round_to_thousand(rng.gen_range(min_balance..=max_balance) as f64);

            Entity::new(fixture_key(Domain::Balances, username, &[kind.as_str()]))
                .with("username", username)
                .with("account_type", kind.as_str())
                .with("balance", Scalar::integer(balance))
                .with("currency", CURRENCY)
                .with(
                    "last_updated",
                    sample_recent_timestamp(rng, now, UPDATE_LOOK_BACK_DAYS),
                )
        })
        .collect()
}
