//! Random sampling primitives used by the dataset generators.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use uuid::Uuid;

/// Discrete distribution over labels, sampled by cumulative weight.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    labels: Vec<T>,
    cumulative: Vec<f64>,
}

impl<T: Clone> WeightedChoice<T> {
    /// Non-positive weights are kept but can never be drawn.
    pub fn new(pairs: &[(T, f64)]) -> Self {
        let mut labels = Vec::with_capacity(pairs.len());
        let mut cumulative = Vec::with_capacity(pairs.len());
        let mut total = 0.0;
        for (label, weight) in pairs {
            total += weight.max(0.0);
            labels.push(label.clone());
            cumulative.push(total);
        }
        Self { labels, cumulative }
    }

    pub fn total_weight(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<T> {
        let total = self.total_weight();
        if self.labels.is_empty() || total <= 0.0 {
            return None;
        }
        let r: f64 = rng.gen_range(0.0..total);
        let idx = self
            .cumulative
            .partition_point(|&w| w <= r)
            .min(self.labels.len() - 1);
        Some(self.labels[idx].clone())
    }
}

/// Latitude/longitude rectangle coordinates are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl BoundingBox {
    /// Uniform point inside the box, rounded to 6 decimal places.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> (f64, f64) {
        let lat = round_to_places(rng.gen_range(self.lat_min..=self.lat_max), 6);
        let lng = round_to_places(rng.gen_range(self.lng_min..=self.lng_max), 6);
        (lat, lng)
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lng_min..=self.lng_max).contains(&lng)
    }
}

/// Timestamp uniformly within the last `max_days` days (plus up to a day of
/// hours, minutes and seconds), formatted as RFC 3339 UTC.
pub fn sample_recent_timestamp<R: Rng>(rng: &mut R, now: DateTime<Utc>, max_days: i64) -> String {
    let delta = Duration::days(rng.gen_range(0..=max_days))
        + Duration::hours(rng.gen_range(0..=23))
        + Duration::minutes(rng.gen_range(0..=59))
        + Duration::seconds(rng.gen_range(0..=59));
    (now - delta).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Random v4 UUID drawn from the supplied RNG.
pub fn random_uuid<R: Rng>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// First eight hex digits of a random UUID.
pub fn short_id<R: Rng>(rng: &mut R) -> String {
    random_uuid(rng).simple().to_string()[..8].to_string()
}

pub fn round_to_thousand(value: f64) -> i64 {
    ((value / 1_000.0).round() * 1_000.0) as i64
}

pub fn round_to_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
