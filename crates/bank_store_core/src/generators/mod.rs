//! Synthetic dataset generators, one per domain.
//!
//! Generators are shaped deterministically (fixed rosters, fixed counts and
//! value ranges) but populated randomly from an injected RNG, so a seeded RNG
//! and a fixed `now` reproduce the same dataset.

mod atms;
mod balances;
mod devices;
mod investments;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::entity::{Domain, Entity};
use crate::keys::{make_key, EntityKey};
use crate::sampling::BoundingBox;

pub use atms::{generate_atms, DEFAULT_ATM_COUNT};
pub use balances::{accounts_for_user, generate_balances, AccountKind, USER_ACCOUNTS};
pub use devices::{generate_devices, DEFAULT_DEVICE_COUNT};
pub use investments::{
    current_value, generate_investments, ProductSpec, INVESTMENT_USERS, NO_MATURITY, PRODUCTS,
};

/// ISO 4217 code every monetary attribute is expressed in.
pub const CURRENCY: &str = "COP";

/// Geographic group the city-scoped domains are spread across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum City {
    Medellin,
    Bogota,
}

impl City {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Medellin => "medellin",
            Self::Bogota => "bogota",
        }
    }

    pub fn bounds(self) -> BoundingBox {
        match self {
            Self::Medellin => BoundingBox {
                lat_min: 6.2,
                lat_max: 6.3,
                lng_min: -75.6,
                lng_max: -75.5,
            },
            Self::Bogota => BoundingBox {
                lat_min: 4.6,
                lat_max: 4.7,
                lng_min: -74.1,
                lng_max: -74.0,
            },
        }
    }
}

/// Splits `count` across the two cities; Medellín takes the odd remainder.
pub fn split_by_city(count: usize) -> [(City, usize); 2] {
    let bogota = count / 2;
    [(City::Medellin, count - bogota), (City::Bogota, bogota)]
}

/// Builds a key from fixture-controlled parts.
pub(crate) fn fixture_key(domain: Domain, grouping_value: &str, segments: &[&str]) -> EntityKey {
    make_key(domain, grouping_value, segments)
        .expect("fixture grouping values and generated ids are never empty")
}

/// Every entity generated for one domain in one seeding run.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainDataset {
    domain: Domain,
    entities: Vec<Entity>,
}

impl DomainDataset {
    pub fn new(domain: Domain, entities: Vec<Entity>) -> Self {
        Self { domain, entities }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity counts per value of the domain's summary attribute.
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let attribute = self.domain.summary_attribute();
        let mut counts = BTreeMap::new();
        for entity in &self.entities {
            let group = entity.str_attribute(attribute).unwrap_or("unknown");
            *counts.entry(group.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Generates the default-sized dataset for `domain`.
pub fn generate_dataset<R: Rng>(domain: Domain, rng: &mut R, now: DateTime<Utc>) -> DomainDataset {
    let entities = match domain {
        Domain::Atms => generate_atms(rng, now, DEFAULT_ATM_COUNT),
        Domain::Devices => generate_devices(rng, now, DEFAULT_DEVICE_COUNT),
        Domain::Balances => generate_balances(rng, now),
        Domain::Investments => generate_investments(rng, now),
    };
    DomainDataset::new(domain, entities)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};

    pub fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-14T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }
}
