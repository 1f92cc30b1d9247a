//! Turnout arithmetic for the reports dashboard.
//!
//! Everything here is a pure function of counts already read from the
//! database, so it can be tested without one.

use chrono::{DateTime, Utc};

use crate::model::{common::election::ElectionStatus, db::election::Election, mongodb::Id};

/// Percentage of `total_users` that `count` represents, rounded to the
/// nearest whole number with halves rounding up.
///
/// Zero when there are no users at all.
pub fn turnout(count: u64, total_users: u64) -> u64 {
    if total_users == 0 {
        return 0;
    }
    (count as f64 / total_users as f64 * 100.0).round() as u64
}

/// Collection sizes at the time of the report.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Totals {
    pub elections: u64,
    pub votes: u64,
    pub users: u64,
}

/// The figures reported for a single election.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionTurnout {
    pub id: Id,
    pub name: String,
    /// Effective status at report time.
    pub status: ElectionStatus,
    pub votes: u64,
    pub turnout: u64,
}

impl ElectionTurnout {
    pub fn new(election: &Election, votes: u64, total_users: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: election.id,
            name: election.title.clone(),
            status: election.effective_status(now),
            votes,
            turnout: turnout(votes, total_users),
        }
    }
}

/// The whole report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub totals: Totals,
    /// Users with at least one vote in any election.
    pub voted: u64,
    /// Users without a vote. Signed, since the vote records are not
    /// guaranteed to reference existing users.
    pub not_voted: i64,
    pub voter_turnout: u64,
    pub elections: Vec<ElectionTurnout>,
}

impl Report {
    /// Assemble the report from raw counts.
    ///
    /// `elections` pairs every election with the number of votes referencing it.
    pub fn compute<'a>(
        totals: Totals,
        elections: impl IntoIterator<Item = (&'a Election, u64)>,
        distinct_voters: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let elections = elections
            .into_iter()
            .map(|(election, votes)| ElectionTurnout::new(election, votes, totals.users, now))
            .collect();
        Self {
            totals,
            voted: distinct_voters,
            not_voted: totals.users as i64 - distinct_voters as i64,
            voter_turnout: turnout(distinct_voters, totals.users),
            elections,
        }
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
    fn turnout_rounds_half_up() {
        assert_eq!(turnout(1, 3), 33);
        assert_eq!(turnout(2, 3), 67);
        assert_eq!(turnout(1, 8), 13); // 12.5
        assert_eq!(turnout(3, 8), 38); // 37.5
        assert_eq!(turnout(5, 5), 100);
        assert_eq!(turnout(0, 5), 0);
    }

    #[test]
    fn no_users_means_zero_turnout() {
        assert_eq!(turnout(0, 0), 0);
        assert_eq!(turnout(12, 0), 0);

        let election = Election::example_without_dates();
        let report = Report::compute(
            Totals {
                elections: 1,
                votes: 4,
                users: 0,
            },
            [(&election, 4)],
            2,
            now(),
        );
        assert_eq!(report.voter_turnout, 0);
        assert_eq!(report.elections[0].turnout, 0);
        assert_eq!(report.voted as i64 + report.not_voted, 0);
    }

    #[test]
    fn turnout_stays_in_bounds() {
        for users in 1..=40 {
            for votes in 0..=users {
                let t = turnout(votes, users);
                assert!(t <= 100, "{votes}/{users} gave {t}");
            }
        }
    }

    #[test]
    fn voted_and_not_voted_cover_all_users() {
        for (users, voted) in [(0, 0), (10, 0), (10, 6), (10, 10), (3, 5)] {
            let report = Report::compute(
                Totals {
                    elections: 0,
                    votes: voted,
                    users,
                },
                Vec::<(&Election, u64)>::new(),
                voted,
                now(),
            );
            assert_eq!(report.voted as i64 + report.not_voted, users as i64);
        }
    }

    #[test]
    fn two_elections_ten_users() {
        let first = Election::example_without_dates();
        let second = Election::example_without_dates();
        let report = Report::compute(
            Totals {
                elections: 2,
                votes: 10,
                users: 10,
            },
            [(&first, 3), (&second, 7)],
            6,
            now(),
        );

        let turnouts: Vec<_> = report.elections.iter().map(|e| e.turnout).collect();
        assert_eq!(turnouts, vec![30, 70]);
        assert_eq!(report.totals.votes, 10);
        assert_eq!(report.totals.elections, 2);
        assert_eq!(report.voted, 6);
        assert_eq!(report.not_voted, 4);
        assert_eq!(report.voter_turnout, 60);
        assert_eq!(report.elections[0].id, first.id);
        assert_eq!(report.elections[1].name, second.title);
    }

    #[test]
    fn report_uses_effective_status() {
        let t = now();
        let mut election = Election::example_without_dates();
        election.status = ElectionStatus::Upcoming;
        election.start_date = Some(t - Duration::days(2));
        election.end_date = Some(t - Duration::days(1));

        let report = Report::compute(
            Totals {
                elections: 1,
                votes: 0,
                users: 4,
            },
            [(&election, 0)],
            0,
            t,
        );
        assert_eq!(report.elections[0].status, ElectionStatus::Completed);
    }
}
