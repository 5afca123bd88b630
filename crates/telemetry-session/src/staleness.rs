//! Per-category recency tracking.

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// A group of values that arrive together and go stale together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Telemetry,
    Status,
    Damage,
    Lap,
    Session,
    Weather,
    Participants,
    Events,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Telemetry,
        Self::Status,
        Self::Damage,
        Self::Lap,
        Self::Session,
        Self::Weather,
        Self::Participants,
        Self::Events,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::Status => "status",
            Self::Damage => "damage",
            Self::Lap => "lap",
            Self::Session => "session",
            Self::Weather => "weather",
            Self::Participants => "participants",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recency of one category. A category that has never been updated is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    last_update: Option<Instant>,
    stale: bool,
}

impl Default for Freshness {
    fn default() -> Self {
        Self {
            last_update: None,
            stale: true,
        }
    }
}

impl Freshness {
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Time since the last update, or `None` if there never was one.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.last_update
            .map(|at| now.saturating_duration_since(at))
    }

    fn touch(&mut self, now: Instant) {
        self.last_update = Some(now);
        self.stale = false;
    }

    /// Returns `true` when the stale flag flipped.
    fn evaluate(&mut self, now: Instant, threshold: Duration) -> bool {
        let stale = self.age(now).is_none_or(|age| age > threshold);
        let changed = stale != self.stale;
        self.stale = stale;
        changed
    }
}

/// One [`Freshness`] per [`Category`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreshnessMap {
    telemetry: Freshness,
    status: Freshness,
    damage: Freshness,
    lap: Freshness,
    session: Freshness,
    weather: Freshness,
    participants: Freshness,
    events: Freshness,
}

impl FreshnessMap {
    pub fn get(&self, category: Category) -> &Freshness {
        match category {
            Category::Telemetry => &self.telemetry,
            Category::Status => &self.status,
            Category::Damage => &self.damage,
            Category::Lap => &self.lap,
            Category::Session => &self.session,
            Category::Weather => &self.weather,
            Category::Participants => &self.participants,
            Category::Events => &self.events,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Freshness {
        match category {
            Category::Telemetry => &mut self.telemetry,
            Category::Status => &mut self.status,
            Category::Damage => &mut self.damage,
            Category::Lap => &mut self.lap,
            Category::Session => &mut self.session,
            Category::Weather => &mut self.weather,
            Category::Participants => &mut self.participants,
            Category::Events => &mut self.events,
        }
    }

    pub fn is_stale(&self, category: Category) -> bool {
        self.get(category).is_stale()
    }

    pub fn stale_categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|category| self.is_stale(*category))
    }

    pub(crate) fn touch(&mut self, category: Category, now: Instant) {
        self.get_mut(category).touch(now);
    }

    /// Re-evaluates one category; returns `true` when its flag flipped.
    pub(crate) fn evaluate(&mut self, category: Category, now: Instant, threshold: Duration) -> bool {
        self.get_mut(category).evaluate(now, threshold)
    }

    /// Re-evaluates every category; returns `true` when any flag flipped.
    pub(crate) fn evaluate_all(&mut self, now: Instant, threshold: Duration) -> bool {
        Category::ALL
            .into_iter()
            .fold(false, |changed, category| {
                self.evaluate(category, now, threshold) || changed
            })
    }
}
