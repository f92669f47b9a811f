//! The guest log: prayer flags left by (made up) guests.

use rand::seq::SliceRandom as _;
use rand::{Rng as _, SeedableRng as _};

use super::main::{Event, FeedHandle};

/// Names to pick from.
const MOCK_NAMES: [&str; 8] = [
    "Aarav", "Sarah", "Priya", "John", "Nima", "Grace", "Pasang", "David",
];

/// Messages to pick from.
const MESSAGES: [&str; 6] = [
    "Namaste!",
    "So excited!",
    "Annapurna forever",
    "Cant wait",
    "Love from UK",
    "Yum!",
];

/// The colours of a prayer flag, one for each of the five elements.
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FlagColour {
    /// Sky
    Blue,
    /// Air
    White,
    /// Fire
    Red,
    /// Water
    Green,
    /// Earth
    Yellow,
}

impl FlagColour {
    /// All the colours in the order they're hung.
    pub const ALL: [Self; 5] = [
        Self::Blue,
        Self::White,
        Self::Red,
        Self::Green,
        Self::Yellow,
    ];

    /// The colour for the given position in a line of flags.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index % 5 {
            0 => Self::Blue,
            1 => Self::White,
            2 => Self::Red,
            3 => Self::Green,
            _ => Self::Yellow,
        }
    }

    /// The colour for rendering.
    #[must_use]
    pub const fn rgba(self) -> ambient_protocol::Colour {
        match self {
            Self::Blue => (0.0, 0.45, 0.8, 1.0),
            Self::White => (0.95, 0.95, 0.95, 1.0),
            Self::Red => (0.85, 0.15, 0.15, 1.0),
            Self::Green => (0.1, 0.6, 0.3, 1.0),
            Self::Yellow => (1.0, 0.8, 0.0, 1.0),
        }
    }
}

/// A single entry in the guest log.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GuestFlag {
    /// Unique enough identifier.
    pub id: String,
    /// Who left the flag.
    pub name: String,
    /// What they wrote on it.
    pub message: String,
    /// The colour of the flag.
    pub colour: FlagColour,
}

impl std::fmt::Display for GuestFlag {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}: {}", self.name, self.message)
    }
}

/// The flags that are already hanging when the page loads.
#[must_use]
pub fn initial_flags() -> Vec<GuestFlag> {
    (0..12usize)
        .map(|index| GuestFlag {
            id: index.to_string(),
            name: MOCK_NAMES
                .get(index % MOCK_NAMES.len())
                .copied()
                .unwrap_or_default()
                .to_owned(),
            message: "Blessings".to_owned(),
            colour: FlagColour::from_index(index),
        })
        .collect()
}

/// A completely random flag.
fn random_flag(rng: &mut rand::rngs::StdRng) -> GuestFlag {
    let name = MOCK_NAMES.choose(rng).copied().unwrap_or_default();
    let message = MESSAGES.choose(rng).copied().unwrap_or_default();
    let colour = FlagColour::ALL.choose(rng).copied().unwrap_or(FlagColour::Blue);
    GuestFlag {
        id: format!("{:016x}", rng.gen::<u64>()),
        name: name.to_owned(),
        message: message.to_owned(),
        colour,
    }
}

/// Start the feed. Every `period` there's a `chance` that a new flag arrives.
pub fn start(
    period: std::time::Duration,
    chance: f64,
    output: tokio::sync::mpsc::Sender<Event>,
) -> FeedHandle {
    let chance = if chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut rng = rand::rngs::StdRng::from_entropy();

    FeedHandle::spawn("guest flags", period, output, move || {
        if !rng.gen_bool(chance) {
            return None;
        }
        let flag = random_flag(&mut rng);
        tracing::trace!("New guest flag: {flag}");
        Some(Event::GuestFlag(flag))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn initial_flags_are_deterministic() {
        let flags = initial_flags();
        assert_eq!(flags.len(), 12);
        assert_eq!(flags[0].name, "Aarav");
        assert_eq!(flags[8].name, "Aarav");
        assert_eq!(flags[11].name, "John");
        assert_eq!(flags[5].colour, FlagColour::Blue);
        assert_eq!(flags[7].colour, FlagColour::Red);
        assert!(flags.iter().all(|flag| flag.message == "Blessings"));
        assert_eq!(flags[3].id, "3");
    }

    #[test]
    fn random_flags_come_from_the_mock_lists() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let flag = random_flag(&mut rng);
            assert!(MOCK_NAMES.contains(&flag.name.as_str()));
            assert!(MESSAGES.contains(&flag.message.as_str()));
            assert_eq!(flag.id.len(), 16);
        }
    }

    #[test]
    fn display() {
        let flag = GuestFlag {
            id: "1".to_owned(),
            name: "Nima".to_owned(),
            message: "Yum!".to_owned(),
            colour: FlagColour::Green,
        };
        assert_eq!(flag.to_string(), "Nima: Yum!");
    }

    #[tokio::test]
    async fn certain_chance_always_sends() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(16);
        let handle = start(std::time::Duration::from_millis(1), 1.0, tx);

        for _ in 0..3 {
            let event = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(event, Event::GuestFlag(_)));
        }

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn zero_chance_never_sends() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(16);
        let handle = start(std::time::Duration::from_millis(1), 0.0, tx);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        handle.stop().await.unwrap();
        assert!(rx.recv().await.is_none());
    }
}
