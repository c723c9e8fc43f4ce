#![allow(dead_code)]

use bank_store_core::entity::Domain;
use bank_store_core::generators::{generate_dataset, DomainDataset};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generation clock shared by every scenario so seeded datasets line up.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-02-14T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub fn seeded_dataset(domain: Domain, seed: u64) -> DomainDataset {
    generate_dataset(domain, &mut StdRng::seed_from_u64(seed), fixed_now())
}
