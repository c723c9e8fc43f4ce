use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::{fixture_key, CURRENCY};
use crate::entity::{Domain, Entity, Scalar};
use crate::sampling::{round_to_places, round_to_thousand, short_id, WeightedChoice};

/// Maturity placeholder for products without a fixed term.
pub const NO_MATURITY: &str = "N/A";

const MIN_PRODUCTS_PER_USER: usize = 2;
const MAX_PRODUCTS_PER_USER: usize = 5;
const START_LOOK_BACK_DAYS: (i64, i64) = (30, 365);
const DAYS_PER_MONTH: i64 = 30;

pub const INVESTMENT_USERS: &[&str] = &[
    "santi", "moni", "jero", "joachim", "fabi", "chucho", "herb", "vale", "naz", "javi", "elkin",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductSpec {
    pub product_type: &'static str,
    pub names: &'static [&'static str],
    pub amount_range: (i64, i64),
    /// Annual return in percent; may be negative.
    pub rate_range: (f64, f64),
    /// Term in months, `None` for open-ended products.
    pub maturity_months: Option<(i64, i64)>,
}

pub const PRODUCTS: &[ProductSpec] = &[
    ProductSpec {
        product_type: "Fiduciaria",
        names: &[
            "Fiducuenta Bancolombia",
            "Fidurenta",
            "Fiduciaria Davivienda",
            "Plan Semilla",
        ],
        amount_range: (5_000_000, 200_000_000),
        rate_range: (6.0, 12.0),
        maturity_months: Some((6, 36)),
    },
    ProductSpec {
        product_type: "CDT",
        names: &["CDT 90 días", "CDT 180 días", "CDT 360 días", "CDT Digital"],
        amount_range: (1_000_000, 100_000_000),
        rate_range: (8.0, 14.5),
        maturity_months: Some((3, 12)),
    },
    ProductSpec {
        product_type: "Crypto",
        names: &[
            "Bitcoin (BTC)",
            "Ethereum (ETH)",
            "Solana (SOL)",
            "USDT Staking",
        ],
        amount_range: (500_000, 50_000_000),
        rate_range: (-20.0, 45.0),
        maturity_months: None,
    },
    ProductSpec {
        product_type: "Bono",
        names: &[
            "Bono Bancolombia 2026",
            "Bono Ecopetrol",
            "Bono ISA",
            "Bono Grupo Argos",
        ],
        amount_range: (10_000_000, 500_000_000),
        rate_range: (9.0, 13.0),
        maturity_months: Some((12, 60)),
    },
    ProductSpec {
        product_type: "TES",
        names: &[
            "TES Tasa Fija 2026",
            "TES Tasa Fija 2028",
            "TES UVR 2027",
            "TES Corto Plazo",
        ],
        amount_range: (5_000_000, 300_000_000),
        rate_range: (7.5, 12.5),
        maturity_months: Some((12, 48)),
    },
    ProductSpec {
        product_type: "Cuenta Global",
        names: &[
            "Cuenta USD Bancolombia",
            "Cuenta EUR Davivienda",
            "Global Account BBVA",
            "Multi-Currency Scotiabank",
        ],
        amount_range: (2_000_000, 80_000_000),
        rate_range: (1.0, 5.0),
        maturity_months: None,
    },
    ProductSpec {
        product_type: "Acciones",
        names: &[
            "Bancolombia (CIB)",
            "Ecopetrol (EC)",
            "Grupo Argos (GRUPOARGOS)",
            "ISA (ISA)",
            "Nutresa (NUTRESA)",
        ],
        amount_range: (1_000_000, 150_000_000),
        rate_range: (-15.0, 35.0),
        maturity_months: None,
    },
];

const STATUSES: &[(&str, f64)] = &[("active", 0.75), ("matured", 0.15), ("pending", 0.10)];

/// Position value after applying `rate_percent`, rounded to the nearest thousand.
pub fn current_value(invested: i64, rate_percent: f64) -> i64 {
    round_to_thousand(invested as f64 * (1.0 + rate_percent / 100.0))
}

pub fn generate_investments<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<Entity> {
    let statuses = WeightedChoice::new(STATUSES);
    let mut investments = Vec::new();

    for username in INVESTMENT_USERS {
        let product_count = rng
            .gen_range(MIN_PRODUCTS_PER_USER..=MAX_PRODUCTS_PER_USER)
            .min(PRODUCTS.len());
        let chosen: Vec<&ProductSpec> = PRODUCTS.choose_multiple(rng, product_count).collect();

        for product in chosen {
            let product_name = product
                .names
                .choose(rng)
                .copied()
                .unwrap_or(product.product_type);
            let (min_amount, max_amount) = product.amount_range;
            let invested = round_to_thousand(rng.gen_range(min_amount..=max_amount) as f64);
            let (min_rate, max_rate) = product.rate_range;
            let rate = round_to_places(rng.gen_range(min_rate..=max_rate), 2);
            let value = current_value(invested, rate);
            let (start_date, maturity_date) = sample_term(rng, now, product.maturity_months);
            let status = statuses.sample(rng).unwrap_or("active");
            let product_id = short_id(rng);

            investments.push(
                Entity::new(fixture_key(
                    Domain::Investments,
                    username,
                    &[product.product_type, product_id.as_str()],
                ))
                .with("username", *username)
                .with("product_type", product.product_type)
                .with("product_name", product_name)
                .with("invested_amount", Scalar::integer(invested))
                .with("current_value", Scalar::integer(value))
                .with("currency", CURRENCY)
                .with("return_rate", Scalar::decimal(rate))
                .with("start_date", start_date)
                .with("maturity_date", maturity_date)
                .with("status", status),
            );
        }
    }

    investments
}

fn sample_term<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    maturity_months: Option<(i64, i64)>,
) -> (String, String) {
    let (min_days_ago, max_days_ago) = START_LOOK_BACK_DAYS;
    let start = now - Duration::days(rng.gen_range(min_days_ago..=max_days_ago));

    let maturity = match maturity_months {
        Some((min_months, max_months)) => {
            let term_days =
                rng.gen_range(min_months * DAYS_PER_MONTH..=max_months * DAYS_PER_MONTH);
            (start + Duration::days(term_days))
                .format("%Y-%m-%d")
                .to_string()
        }
        None => NO_MATURITY.to_string(),
    };

    (start.format("%Y-%m-%d").to_string(), maturity)
}
