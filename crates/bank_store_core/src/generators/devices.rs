use chrono::{DateTime, Utc};
use rand::Rng;

use super::{fixture_key, split_by_city, City};
use crate::entity::{Domain, Entity, Scalar};
use crate::sampling::{random_uuid, sample_recent_timestamp, WeightedChoice};

pub const DEFAULT_DEVICE_COUNT: usize = 100;

const TRANSACTION_LOOK_BACK_DAYS: i64 = 30;

const MERCHANTS_MEDELLIN: &[&str] = &[
    "Tienda Don Pedro",
    "Farmacia La Salud",
    "Panadería El Trigal",
    "Restaurante El Arriero",
    "Café Velvet",
    "Minimercado La Esquina",
    "Droguería Pasteur",
    "Carnicería El Novillo",
    "Frutería Tropical",
    "Papelería El Estudiante",
    "Ferretería El Maestro",
    "Peluquería Estilo",
    "Lavandería Express",
    "Heladería Mimo's",
    "Supermercado Euro",
    "Café Pergamino",
    "Restaurante Hatoviejo",
    "Barbería Clásica",
];

const MERCHANTS_BOGOTA: &[&str] = &[
    "Tienda Doña Rosa",
    "Farmacia Cruz Verde",
    "Panadería La Floresta",
    "Restaurante Andrés Carne de Res",
    "Café Juan Valdez Usaquén",
    "Minimercado El Vecino",
    "Droguería Cafam",
    "Carnicería Santa Fe",
    "Frutería El Paraíso",
    "Ferretería El Constructor",
    "Peluquería Color",
    "Lavandería Lavamatic",
    "Restaurante La Puerta Falsa",
    "Heladería San Jerónimo",
    "Supermercado Jumbo",
    "Café Azahar",
    "Panadería Masa",
    "Barbería Bogotana",
];

const ADDRESSES_MEDELLIN: &[&str] = &[
    "Cra 43A #1-50, El Poblado",
    "Calle 10 #32-15, La Candelaria",
    "Cra 70 #44-30, Laureles",
    "Calle 33 #76-20, Belén",
    "Cra 80 #32A-45, La América",
    "Calle 52 #43-100, Centro",
    "Cra 65 #48-10, Suramericana",
    "Calle 44 #70-55, San Juan",
    "Cra 43A #14-50, Manila",
    "Calle 10A #35-20, Provenza",
    "Cra 48 #10-45, Patio Bonito",
    "Calle 7 #43-80, Astorga",
    "Cra 35 #8-20, El Tesoro",
    "Cra 76 #48-30, Estadio",
    "Calle 49 #50-10, Ayacucho",
    "Cra 81 #33-45, Los Colores",
];

const ADDRESSES_BOGOTA: &[&str] = &[
    "Cra 7 #71-52, Chapinero",
    "Calle 85 #15-10, Zona Rosa",
    "Cra 15 #93-20, Chicó",
    "Calle 116 #18-30, Usaquén",
    "Cra 11 #82-45, Zona G",
    "Calle 72 #10-15, Centro Internacional",
    "Cra 13 #63-20, Chapinero Central",
    "Calle 53 #13-40, Galerías",
    "Cra 68 #24-10, Zona Industrial",
    "Calle 140 #11-20, Cedritos",
    "Cra 9 #69-30, Quinta Camacho",
    "Calle 26 #13-15, Centro",
    "Cra 19 #84-20, Antiguo Country",
    "Calle 100 #19-45, Chicó Norte",
    "Cra 30 #45-15, Teusaquillo",
    "Calle 19 #4-20, La Candelaria",
];

const STATUSES: &[(&str, f64)] = &[("active", 0.7), ("inactive", 0.15), ("maintenance", 0.15)];

fn merchants(city: City) -> &'static [&'static str] {
    match city {
        City::Medellin => MERCHANTS_MEDELLIN,
        City::Bogota => MERCHANTS_BOGOTA,
    }
}

fn addresses(city: City) -> &'static [&'static str] {
    match city {
        City::Medellin => ADDRESSES_MEDELLIN,
        City::Bogota => ADDRESSES_BOGOTA,
    }
}

/// Point-of-sale terminals ("datáfonos") spread across both cities.
pub fn generate_devices<R: Rng>(rng: &mut R, now: DateTime<Utc>, count: usize) -> Vec<Entity> {
    let statuses = WeightedChoice::new(STATUSES);
    let mut devices = Vec::with_capacity(count);

    for (city, city_count) in split_by_city(count) {
        let merchant_names = merchants(city);
        let street_addresses = addresses(city);
        for i in 0..city_count {
            let device_id = random_uuid(rng).to_string();
            let (latitude, longitude) = city.bounds().sample(rng);
            let status = statuses.sample(rng).unwrap_or("active");
            let key = fixture_key(Domain::Devices, city.slug(), &[device_id.as_str()]);

            devices.push(
                Entity::new(key)
                    .with("device_id", device_id.as_str())
                    .with("merchant_name", merchant_names[i % merchant_names.len()])
                    .with("address", street_addresses[i % street_addresses.len()])
                    .with("latitude", Scalar::decimal(latitude))
                    .with("longitude", Scalar::decimal(longitude))
                    .with("status", status)
                    .with(
                        "last_transaction",
                        sample_recent_timestamp(rng, now, TRANSACTION_LOOK_BACK_DAYS),
                    )
                    .with("city", city.slug()),
            );
        }
    }

    devices
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::generators::test_support::fixed_now;

    #[test]
    fn default_fleet_is_split_evenly() {
        let mut rng = StdRng::seed_from_u64(3);
        let devices = generate_devices(&mut rng, fixed_now(), DEFAULT_DEVICE_COUNT);

        assert_eq!(devices.len(), 100);
        let bogota = devices
            .iter()
            .filter(|device| device.partition_key() == "CITY#bogota")
            .count();
        assert_eq!(bogota, 50);
    }

    #[test]
    fn devices_carry_merchant_and_recent_transaction() {
        let now = fixed_now();
        let devices = generate_devices(&mut StdRng::seed_from_u64(12), now, 10);
        let window = chrono::Duration::days(TRANSACTION_LOOK_BACK_DAYS + 1);
        for device in &devices {
            assert!(device.sort_key().starts_with("DATAFONO#"));
            assert!(device.str_attribute("merchant_name").is_some());

            let status = device.str_attribute("status").expect("status");
            assert!(["active", "inactive", "maintenance"].contains(&status));

            let stamp = device
                .str_attribute("last_transaction")
                .expect("last transaction");
            let parsed = DateTime::parse_from_rfc3339(stamp)
                .expect("timestamp should parse")
                .with_timezone(&Utc);
            assert!(now - parsed <= window);
        }
    }
}
