use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phases of an election's lifecycle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Not started yet.
    #[default]
    Upcoming,
    /// Voting is open. Some older documents call this `ongoing`.
    #[serde(alias = "ongoing")]
    Active,
    /// Voting has closed.
    Completed,
    /// Called off by an administrator.
    Cancelled,
}

impl ElectionStatus {
    pub const ALL: [ElectionStatus; 4] = [
        Self::Upcoming,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Resolve the status an election with this recorded status should be
    /// treated as having at time `now`.
    ///
    /// When both dates are known they decide: before `start` the election is
    /// upcoming, from `start` to `end` inclusive it is active, and after `end`
    /// it is completed. This applies even over a recorded `Cancelled`.
    /// Otherwise the recorded status stands.
    pub fn effective(
        self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => {
                if now < start {
                    Self::Upcoming
                } else if now <= end {
                    Self::Active
                } else {
                    Self::Completed
                }
            }
            _ => self,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// How the dashboard should draw this status.
    pub fn badge(&self) -> Badge {
        match self {
            Self::Upcoming => Badge {
                label: "Upcoming",
                tone: BadgeTone::Success,
                icon: "clock",
            },
            Self::Active => Badge {
                label: "Active",
                tone: BadgeTone::Success,
                icon: "play",
            },
            Self::Completed => Badge {
                label: "Completed",
                tone: BadgeTone::Secondary,
                icon: "check-circle",
            },
            Self::Cancelled => Badge {
                label: "Cancelled",
                tone: BadgeTone::Danger,
                icon: "times-circle",
            },
        }
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown election status \"{0}\"")]
pub struct UnknownStatus(pub String);

impl FromStr for ElectionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

/// Colour family of a status badge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Success,
    Secondary,
    Danger,
}

/// Presentation of a status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub tone: BadgeTone,
    pub icon: &'static str,
}

/// How many elections are in each phase. Cancelled elections only count
/// towards the total.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: u64,
    pub active: u64,
    pub upcoming: u64,
    pub completed: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: ElectionStatus) {
        self.total += 1;
        match status {
            ElectionStatus::Active => self.active += 1,
            ElectionStatus::Upcoming => self.upcoming += 1,
            ElectionStatus::Completed => self.completed += 1,
            ElectionStatus::Cancelled => {}
        }
    }
}

impl FromIterator<ElectionStatus> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = ElectionStatus>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.add(status);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn dates_decide_the_phase() {
        let t = now();
        let second = Duration::seconds(1);
        let stored = ElectionStatus::Upcoming;

        assert_eq!(
            stored.effective(Some(t - second), Some(t + second), t),
            ElectionStatus::Active
        );
        assert_eq!(
            stored.effective(Some(t - second * 10), Some(t - second), t),
            ElectionStatus::Completed
        );
        assert_eq!(
            ElectionStatus::Active.effective(Some(t + second), Some(t + second * 10), t),
            ElectionStatus::Upcoming
        );
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let t = now();
        let stored = ElectionStatus::Completed;
        assert_eq!(stored.effective(Some(t), Some(t), t), ElectionStatus::Active);
    }

    #[test]
    fn missing_dates_keep_recorded_status() {
        let t = now();
        for stored in ElectionStatus::ALL {
            assert_eq!(stored.effective(None, None, t), stored);
            assert_eq!(stored.effective(Some(t), None, t), stored);
            assert_eq!(stored.effective(None, Some(t), t), stored);
        }
    }

    #[test]
    fn dates_override_cancellation() {
        let t = now();
        let day = Duration::days(1);
        assert_eq!(
            ElectionStatus::Cancelled.effective(Some(t - day), Some(t + day), t),
            ElectionStatus::Active
        );
    }

    #[test]
    fn inverted_window_is_completed_once_started() {
        let t = now();
        let day = Duration::days(1);
        assert_eq!(
            ElectionStatus::Active.effective(Some(t - day), Some(t - day * 2), t),
            ElectionStatus::Completed
        );
        assert_eq!(
            ElectionStatus::Active.effective(Some(t + day), Some(t - day), t),
            ElectionStatus::Upcoming
        );
    }

    #[test]
    fn parse_and_display() {
        for status in ElectionStatus::ALL {
            assert_eq!(status.to_string().parse::<ElectionStatus>(), Ok(status));
        }
        assert_eq!("Active".parse::<ElectionStatus>(), Ok(ElectionStatus::Active));
        assert_eq!(
            "ongoing".parse::<ElectionStatus>(),
            Err(UnknownStatus("ongoing".to_string()))
        );
        assert_eq!(Bson::from(ElectionStatus::Cancelled), Bson::String("cancelled".into()));
    }

    #[test]
    fn badges() {
        assert_eq!(ElectionStatus::Active.badge().tone, BadgeTone::Success);
        assert_eq!(ElectionStatus::Completed.badge().label, "Completed");
        assert_eq!(ElectionStatus::Cancelled.badge().tone, BadgeTone::Danger);
    }

    #[test]
    fn count_statuses() {
        let counts: StatusCounts = [
            ElectionStatus::Active,
            ElectionStatus::Upcoming,
            ElectionStatus::Upcoming,
            ElectionStatus::Completed,
            ElectionStatus::Cancelled,
        ]
        .into_iter()
        .collect();
        assert_eq!(
            counts,
            StatusCounts {
                total: 5,
                active: 1,
                upcoming: 2,
                completed: 1,
            }
        );
    }
}
