//! The kitchen ticker: smoke levels and tandoor temperature.

use rand::{Rng as _, SeedableRng as _};

use super::main::{Event, FeedHandle};

/// The smoke level never drops below this.
const MIN_SMOKE_LEVEL: f32 = 20.0;

/// The smoke level never rises above this.
const MAX_SMOKE_LEVEL: f32 = 100.0;

/// The most that the smoke level can change by in one update, in either direction.
const MAX_SMOKE_DRIFT: f32 = 5.0;

/// A reading from the kitchen.
#[derive(serde::Serialize, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct KitchenStatus {
    /// Percentage, between 20 and 100.
    pub smoke_level: f32,
    /// Tandoor temperature in Celsius.
    pub temperature: u16,
    /// How many chefs are working.
    pub active_chefs: u8,
    /// When the last order came in.
    pub last_order_time: String,
}

impl Default for KitchenStatus {
    fn default() -> Self {
        Self {
            smoke_level: 45.0,
            temperature: 320,
            active_chefs: 8,
            last_order_time: "Just now".to_owned(),
        }
    }
}

impl std::fmt::Display for KitchenStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "Jimbu smoke {:.0}% | Tandoor {}°C",
            self.smoke_level, self.temperature
        )
    }
}

impl KitchenStatus {
    /// The next reading: the smoke drifts a little and the temperature jumps around.
    #[must_use]
    pub fn next(&self, rng: &mut rand::rngs::StdRng) -> Self {
        let drift = rng.gen_range(-MAX_SMOKE_DRIFT..=MAX_SMOKE_DRIFT);
        Self {
            smoke_level: (self.smoke_level + drift).clamp(MIN_SMOKE_LEVEL, MAX_SMOKE_LEVEL),
            temperature: rng.gen_range(300..350),
            active_chefs: self.active_chefs,
            last_order_time: self.last_order_time.clone(),
        }
    }
}

/// Start the feed. A new reading arrives every `period`.
pub fn start(period: std::time::Duration, output: tokio::sync::mpsc::Sender<Event>) -> FeedHandle {
    let mut rng = rand::rngs::StdRng::from_entropy();
    let mut status = KitchenStatus::default();

    FeedHandle::spawn("kitchen status", period, output, move || {
        status = status.next(&mut rng);
        tracing::trace!("Kitchen status: {status}");
        Some(Event::KitchenStatus(status.clone()))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn readings_stay_in_range() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);
        let mut status = KitchenStatus::default();
        for _ in 0..1000 {
            let next = status.next(&mut rng);
            assert!((MIN_SMOKE_LEVEL..=MAX_SMOKE_LEVEL).contains(&next.smoke_level));
            assert!((next.smoke_level - status.smoke_level).abs() <= MAX_SMOKE_DRIFT + 0.001);
            assert!((300..350).contains(&next.temperature));
            assert_eq!(next.active_chefs, 8);
            status = next;
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            KitchenStatus::default().to_string(),
            "Jimbu smoke 45% | Tandoor 320°C"
        );
    }

    #[tokio::test]
    async fn sends_readings() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(16);
        let handle = start(std::time::Duration::from_millis(1), tx);

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, Event::KitchenStatus(_)));

        handle.stop().await.unwrap();
    }
}
