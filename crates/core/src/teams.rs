//! Per-team projection of round records.
//!
//! Each slot's `"HOME-AWAY"` label is split once on `-`. Both sides that
//! belong to [`TEAM_ROSTER`] receive one observation, so a team collects up
//! to two entries per round. The resulting sequences feed the same streak
//! engine used for positions.

use std::collections::BTreeMap;

use crate::round::{Outcome, RoundRecord};
use crate::streak::{compute_streaks, trailing_run, StreakInput, StreakStats};

/// The fixed league roster.
pub const TEAM_ROSTER: [&str; 12] = [
    "ATA", "BOL", "CAG", "FIO", "GEN", "INT", "JUV", "LAZ", "MIL", "NAP", "ROM", "TOR",
];

/// Looks a label up in the roster (trimmed, case-insensitive).
#[must_use]
pub fn roster_code(label: &str) -> Option<&'static str> {
    let wanted = label.trim().to_uppercase();
    TEAM_ROSTER.iter().copied().find(|code| *code == wanted)
}

/// Splits a `"HOME-AWAY"` label into its two trimmed sides.
#[must_use]
pub fn split_pair(label: &str) -> Option<(&str, &str)> {
    let (home, away) = label.split_once('-')?;
    Some((home.trim(), away.trim()))
}

/// One appearance of a team in a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamObservation {
    pub outcome: Option<Outcome>,
    pub round_label: String,
    pub round_number: Option<u32>,
    pub observation_time: String,
    /// Opponent code, upper-cased even when outside the roster.
    pub opponent: String,
    /// Slot the match occupied.
    pub position: usize,
    pub home: bool,
}

impl StreakInput for TeamObservation {
    fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    fn round_number(&self) -> Option<u32> {
        self.round_number
    }

    fn round_label(&self) -> &str {
        &self.round_label
    }
}

/// Team code -> observations in record order. Teams never seen are absent.
pub type TeamSequences = BTreeMap<&'static str, Vec<TeamObservation>>;

/// Re-keys `records` by team.
pub fn aggregate_by_team<'a, I>(records: I) -> TeamSequences
where
    I: IntoIterator<Item = &'a RoundRecord>,
{
    let mut teams = TeamSequences::new();

    for record in records {
        let round_number = record.round_number();
        for (position, slot) in record.positions.iter().enumerate() {
            let Some((home, away)) = slot.teams.as_deref().and_then(split_pair) else {
                continue;
            };
            for (side, opponent, is_home) in [(home, away, true), (away, home, false)] {
                let Some(code) = roster_code(side) else {
                    continue;
                };
                teams.entry(code).or_default().push(TeamObservation {
                    outcome: slot.outcome,
                    round_label: record.round_label.clone(),
                    round_number,
                    observation_time: record.observation_time.clone(),
                    opponent: opponent.to_uppercase(),
                    position,
                    home: is_home,
                });
            }
        }
    }

    teams
}

/// Team codes in roster order, each with its streak statistics.
#[must_use]
pub fn team_streaks(teams: &TeamSequences, target: Outcome) -> Vec<(&'static str, StreakStats)> {
    teams
        .iter()
        .filter(|(_, obs)| !obs.is_empty())
        .map(|(code, obs)| (*code, compute_streaks(obs, target)))
        .collect()
}

/// Team codes in roster order, each with its trailing run of `target`.
#[must_use]
pub fn team_trailing(teams: &TeamSequences, target: Outcome) -> Vec<(&'static str, u32)> {
    teams
        .iter()
        .filter(|(_, obs)| !obs.is_empty())
        .map(|(code, obs)| (*code, trailing_run(obs, target)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::PositionSlot;

    fn slot(tag: &str, teams: &str) -> PositionSlot {
        PositionSlot {
            outcome: Outcome::from_tag(tag),
            teams: Some(teams.to_string()),
        }
    }

    fn record(round: &str, slots: Vec<PositionSlot>) -> RoundRecord {
        RoundRecord {
            observation_date: "01/04/2026".to_string(),
            observation_time: format!("10:{round:0>2}"),
            round_label: round.to_string(),
            positions: slots,
            insertion_order: 0,
        }
    }

    #[test]
    fn test_roster_lookup() {
        assert_eq!(roster_code(" juv "), Some("JUV"));
        assert_eq!(roster_code("XYZ"), None);
        assert_eq!(TEAM_ROSTER.len(), 12);
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("JUV - INT"), Some(("JUV", "INT")));
        assert_eq!(split_pair("JUV"), None);
    }

    #[test]
    fn test_home_and_away_appearances() {
        let records = vec![
            record("3", vec![slot("NG", "JUV-INT")]),
            record("4", vec![slot("G", "MIL-NAP"), slot("NG", "ROM-juv")]),
        ];
        let teams = aggregate_by_team(&records);
        let juv = &teams["JUV"];
        assert_eq!(juv.len(), 2);
        assert_eq!(juv[0].opponent, "INT");
        assert!(juv[0].home);
        assert_eq!(juv[0].round_label, "3");
        assert_eq!(juv[1].opponent, "ROM");
        assert!(!juv[1].home);
        assert_eq!(juv[1].position, 1);
        assert_eq!(juv[1].observation_time, "10:04");
    }

    #[test]
    fn test_unknown_teams_excluded() {
        let records = vec![record("1", vec![slot("NG", "ABC-JUV"), slot("NG", "nolabel")])];
        let teams = aggregate_by_team(&records);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams["JUV"][0].opponent, "ABC");
        assert!(!teams.contains_key("ABC"));
    }

    #[test]
    fn test_team_streaks_roster_order() {
        let records = vec![
            record("1", vec![slot("NG", "TOR-ATA")]),
            record("2", vec![slot("NG", "TOR-ATA")]),
            record("3", vec![slot("G", "ATA-TOR")]),
        ];
        let teams = aggregate_by_team(&records);
        let streaks = team_streaks(&teams, Outcome::NoGoal);
        assert_eq!(streaks.len(), 2);
        assert_eq!(streaks[0].0, "ATA");
        assert_eq!(streaks[0].1.max, 2);
        assert_eq!(streaks[1].0, "TOR");
        assert_eq!(streaks[1].1.current, 0);

        let trailing = team_trailing(&teams, Outcome::Goal);
        assert_eq!(trailing, vec![("ATA", 1), ("TOR", 1)]);
    }

    #[test]
    fn test_double_appearance_in_one_round_is_not_adjacent() {
        let records = vec![record(
            "5",
            vec![slot("NG", "JUV-INT"), slot("NG", "MIL-JUV")],
        )];
        let teams = aggregate_by_team(&records);
        let stats = team_streaks(&teams, Outcome::NoGoal)
            .into_iter()
            .find(|(code, _)| *code == "JUV")
            .map(|(_, s)| s)
            .unwrap();
        assert_eq!(stats.max, 1);
        assert_eq!(stats.current, 1);
        assert_eq!(trailing_run(&teams["JUV"], Outcome::NoGoal), 2);
    }
}
