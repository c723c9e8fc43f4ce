use chrono::{DateTime, Utc};
use rand::Rng;

use super::{fixture_key, split_by_city, City};
use crate::entity::{Domain, Entity, Scalar};
use crate::sampling::{random_uuid, sample_recent_timestamp, WeightedChoice};

pub const DEFAULT_ATM_COUNT: usize = 25;

const SERVICE_LOOK_BACK_DAYS: i64 = 90;

const LOCATIONS_MEDELLIN: &[&str] = &[
    "Bancolombia El Poblado - Cra 43A #1-50, El Poblado",
    "Banco de Bogotá Laureles - Cra 70 #44-30, Laureles",
    "BBVA Centro Comercial Santafé - Calle 7 Sur #43A-200, El Poblado",
    "Davivienda Unicentro - Cra 66B #34A-76, Laureles",
    "Bancolombia Oviedo - Cra 43A #6 Sur-15, El Poblado",
    "Banco Popular Estación Poblado - Calle 10 #43E-31, El Poblado",
    "Scotiabank Colpatria La 70 - Cra 70 #48-20, Estadio",
    "Bancolombia Centro - Calle 52 #49-40, Centro",
    "Davivienda Belén - Calle 33 #76-20, Belén",
    "BBVA Envigado - Cra 43A #38 Sur-15, Envigado",
    "Banco de Bogotá La América - Cra 80 #32A-45, La América",
    "Bancolombia Suramericana - Cra 65 #48-10, Suramericana",
    "Nequi Punto ATM Provenza - Calle 10A #35-20, Provenza",
];

const LOCATIONS_BOGOTA: &[&str] = &[
    "Bancolombia Usaquén - Calle 116 #18-30, Usaquén",
    "Banco de Bogotá Zona Rosa - Calle 85 #15-10, Zona Rosa",
    "BBVA Centro Comercial Andino - Cra 11 #82-71, Zona T",
    "Davivienda Chapinero - Cra 7 #71-52, Chapinero",
    "Bancolombia Chicó - Cra 15 #93-20, Chicó",
    "Scotiabank Colpatria Calle 72 - Calle 72 #10-15, Centro Internacional",
    "Banco Popular Kennedy - Cra 68 #24-10, Kennedy",
    "Bancolombia Cedritos - Calle 140 #11-20, Cedritos",
    "Davivienda Galerías - Calle 53 #13-40, Galerías",
    "BBVA Suba - Cra 68 #80-20, Suba",
    "Banco de Bogotá Teusaquillo - Cra 30 #45-15, Teusaquillo",
    "Bancolombia Santa Bárbara - Calle 122 #15-40, Santa Bárbara",
];

const STATUSES: &[(&str, f64)] = &[
    ("online", 0.5),
    ("offline", 0.15),
    ("low_cash", 0.2),
    ("maintenance", 0.15),
];

const CASH_LEVELS: &[(&str, f64)] = &[
    ("high", 0.3),
    ("medium", 0.35),
    ("low", 0.25),
    ("empty", 0.1),
];

fn locations(city: City) -> &'static [&'static str] {
    match city {
        City::Medellin => LOCATIONS_MEDELLIN,
        City::Bogota => LOCATIONS_BOGOTA,
    }
}

pub fn generate_atms<R: Rng>(rng: &mut R, now: DateTime<Utc>, count: usize) -> Vec<Entity> {
    let statuses = WeightedChoice::new(STATUSES);
    let cash_levels = WeightedChoice::new(CASH_LEVELS);
    let mut atms = Vec::with_capacity(count);

    for (city, city_count) in split_by_city(count) {
        let addresses = locations(city);
        for i in 0..city_count {
            let atm_id = random_uuid(rng).to_string();
            let (latitude, longitude) = city.bounds().sample(rng);
            let status = statuses.sample(rng).unwrap_or("online");
            let cash_level = cash_levels.sample(rng).unwrap_or("medium");

            atms.push(
                Entity::new(fixture_key(Domain::Atms, city.slug(), &[atm_id.as_str()]))
                    .with("atm_id", atm_id.as_str())
                    .with("address", addresses[i % addresses.len()])
                    .with("latitude", Scalar::decimal(latitude))
                    .with("longitude", Scalar::decimal(longitude))
                    .with("status", status)
                    .with("cash_level", cash_level)
                    .with(
                        "last_service",
                        sample_recent_timestamp(rng, now, SERVICE_LOOK_BACK_DAYS),
                    )
                    .with("city", city.slug()),
            );
        }
    }

    atms
}
