//! Text reports delivered to the chat front end.
//!
//! Every renderer is a pure function of the records it is handed (already in
//! chronological order), the alert threshold and a [`ReportContext`]. With
//! `raw_data_only` set only the data rows are produced, ready to be spliced
//! into a caller template through [`render_templated`].

#![allow(clippy::format_push_string)]

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::round::{pad_round, Outcome, RoundRecord, POSITIONS};
use crate::sequencer::{for_date, most_recent};
use crate::streak::{position_streaks, trailing_position_count, StreakStats, STREAK_FLOOR};
use crate::teams::{aggregate_by_team, team_streaks, team_trailing, TEAM_ROSTER};
use crate::template::apply_template;

/// Text returned when the historical collection is empty.
pub const NO_DATA: &str = "Nessun dato.";

pub const ICON_ALERT: &str = "🚨";
pub const ICON_ACTIVE: &str = "🔴";
pub const ICON_CLEAN: &str = "🟢";

/// Records shown by the history report unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 15;

/// Report selectable from the chat menu or the render endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    History,
    Info,
    Stats,
    Streak,
    StreakDaily,
}

impl ReportKind {
    pub const ALL: [Self; 5] = [
        Self::History,
        Self::Info,
        Self::Stats,
        Self::Streak,
        Self::StreakDaily,
    ];

    /// Name used in callback data, routes and template keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Info => "info",
            Self::Stats => "stats",
            Self::Streak => "streak",
            Self::StreakDaily => "streak_daily",
        }
    }

    /// Parses callback data such as `"streak"` or `"streak_daily:team"`.
    #[must_use]
    pub fn from_callback(data: &str) -> Option<(Self, ReportView)> {
        let (kind, view) = match data.split_once(':') {
            Some((kind, view)) => (kind, view.parse().ok()?),
            None => (data, ReportView::Position),
        };
        Some((kind.parse().ok()?, view))
    }

    /// Callback data for this kind and view.
    #[must_use]
    pub fn callback_data(self, view: ReportView) -> String {
        match view {
            ReportView::Position => self.as_str().to_string(),
            ReportView::Team => format!("{}:{}", self.as_str(), view.as_str()),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown report: {s}"))
    }
}

/// Partition key of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportView {
    #[default]
    Position,
    Team,
}

impl ReportView {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Team => "team",
        }
    }
}

impl FromStr for ReportView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "position" | "pos" => Ok(Self::Position),
            "team" | "teams" => Ok(Self::Team),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

/// Everything a renderer needs besides the records.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Renderer clock, already in the display offset.
    pub now: DateTime<FixedOffset>,
    pub view: ReportView,
    pub raw_data_only: bool,
    /// Trailing NG count that switches the alert icon on.
    pub threshold: u32,
    pub history_limit: usize,
    /// Time of the last sync push, shown by the info report.
    pub last_sync: Option<DateTime<Utc>>,
}

impl ReportContext {
    #[must_use]
    pub fn new(now: DateTime<FixedOffset>, threshold: u32) -> Self {
        Self {
            now,
            view: ReportView::Position,
            raw_data_only: false,
            threshold,
            history_limit: DEFAULT_HISTORY_LIMIT,
            last_sync: None,
        }
    }

    #[must_use]
    pub const fn with_view(mut self, view: ReportView) -> Self {
        self.view = view;
        self
    }

    #[must_use]
    pub const fn raw(mut self, raw_data_only: bool) -> Self {
        self.raw_data_only = raw_data_only;
        self
    }

    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_last_sync(mut self, last_sync: Option<DateTime<Utc>>) -> Self {
        self.last_sync = last_sync;
        self
    }

    /// `DD/MM/YYYY HH:MM` of the renderer clock.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.now.format("%d/%m/%Y %H:%M").to_string()
    }

    /// `DD/MM/YYYY` of the renderer clock.
    #[must_use]
    pub fn today(&self) -> String {
        self.now.format("%d/%m/%Y").to_string()
    }

    fn footer(&self) -> String {
        format!("🕐 {}", self.timestamp())
    }
}

/// Icon of a trailing NG count.
#[must_use]
pub fn stats_icon(consecutive_ng: u32, threshold: u32) -> &'static str {
    if consecutive_ng >= threshold {
        ICON_ALERT
    } else if consecutive_ng > 0 {
        ICON_ACTIVE
    } else {
        ICON_CLEAN
    }
}

fn outcome_icon(outcome: Option<Outcome>) -> &'static str {
    if outcome == Some(Outcome::Goal) {
        ICON_CLEAN
    } else {
        ICON_ACTIVE
    }
}

/// Renders `kind` over `records`, which must be in chronological order.
#[must_use]
pub fn render(kind: ReportKind, records: &[RoundRecord], ctx: &ReportContext) -> String {
    match kind {
        ReportKind::History => render_history(records, ctx),
        ReportKind::Info => render_info(records, ctx),
        ReportKind::Stats => render_stats(records, ctx),
        ReportKind::Streak => render_streak(records, ctx),
        ReportKind::StreakDaily => render_streak_daily(records, ctx),
    }
}

/// Renders the data rows of `kind` and splices them into `template`.
#[must_use]
pub fn render_templated(
    kind: ReportKind,
    records: &[RoundRecord],
    ctx: &ReportContext,
    template: &str,
) -> String {
    let raw_ctx = ctx.clone().raw(true);
    let data = render(kind, records, &raw_ctx);
    apply_template(template, &data, &ctx.timestamp())
}

fn finish(ctx: &ReportContext, header: String, rows: &str) -> String {
    if ctx.raw_data_only {
        rows.trim().to_string()
    } else {
        format!("{header}{rows}\n{}", ctx.footer())
    }
}

/// Latest rounds by ingestion order, shown oldest first.
#[must_use]
pub fn render_history(records: &[RoundRecord], ctx: &ReportContext) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }
    let mut recent = most_recent(records, ctx.history_limit);
    recent.reverse();

    let mut rows = String::new();
    for record in &recent {
        let cells: Vec<String> = match ctx.view {
            ReportView::Position => record
                .positions
                .iter()
                .map(|slot| outcome_icon(slot.outcome).to_string())
                .collect(),
            ReportView::Team => record
                .positions
                .iter()
                .map(|slot| {
                    format!(
                        "{}{}",
                        slot.teams.as_deref().unwrap_or("?"),
                        outcome_icon(slot.outcome)
                    )
                })
                .collect(),
        };
        let separator = match ctx.view {
            ReportView::Position => " ",
            ReportView::Team => " | ",
        };
        rows.push_str(&format!(
            "G<b>{}</b> {}  {}\n",
            record.padded_round(),
            record.observation_time,
            cells.join(separator)
        ));
    }

    let header = format!(
        "📋 <b>STORICO FAS - ULTIME {}</b> (di {})\n\n",
        recent.len(),
        records.len()
    );
    finish(ctx, header, &rows)
}

/// Trailing NG counts with alert icons.
#[must_use]
pub fn render_stats(records: &[RoundRecord], ctx: &ReportContext) -> String {
    let Some(last) = records.last() else {
        return NO_DATA.to_string();
    };

    let mut rows = String::new();
    match ctx.view {
        ReportView::Position => {
            for pos in 0..POSITIONS {
                let count = trailing_position_count(records, pos, Outcome::NoGoal);
                rows.push_str(&format!(
                    "{} Serie {}: {} NG\n",
                    stats_icon(count, ctx.threshold),
                    pos + 1,
                    count
                ));
            }
        }
        ReportView::Team => {
            let teams = aggregate_by_team(records);
            for (code, count) in team_trailing(&teams, Outcome::NoGoal) {
                rows.push_str(&format!(
                    "{} {}: {} NG\n",
                    stats_icon(count, ctx.threshold),
                    code,
                    count
                ));
            }
            if rows.is_empty() {
                rows.push_str("Nessuna squadra riconosciuta\n");
            }
        }
    }

    if ctx.raw_data_only {
        return rows.trim().to_string();
    }
    format!(
        "📊 <b>STATISTICHE FAS</b>\n📅 <b>{}</b> - Giornata {}\n\n{rows}\n📊 Totale: {} giornate\n{}",
        last.observation_date,
        pad_round(&last.round_label),
        records.len(),
        ctx.footer()
    )
}

/// Collection overview.
#[must_use]
pub fn render_info(records: &[RoundRecord], ctx: &ReportContext) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }
    let days: BTreeSet<&str> = records.iter().map(|r| r.observation_date.as_str()).collect();

    let mut rows = format!(
        "📊 Giornate: {}\n📅 Giorni: {}\n🔔 Soglia: {} NG\n",
        records.len(),
        days.len(),
        ctx.threshold
    );
    if ctx.view == ReportView::Team {
        let teams = aggregate_by_team(records);
        rows.push_str(&format!(
            "👥 Squadre: {}/{}\n",
            teams.len(),
            TEAM_ROSTER.len()
        ));
    }
    if let Some(last_sync) = ctx.last_sync {
        let local = last_sync.with_timezone(ctx.now.offset());
        rows.push_str(&format!("🔄 Ultimo sync: {}\n", local.format("%d/%m/%Y %H:%M")));
    }

    if ctx.raw_data_only {
        return rows.trim().to_string();
    }
    format!("ℹ️ <b>FAS MONITOR</b>\n\n{rows}{}", ctx.footer())
}

fn streak_line(label: &str, stats: &StreakStats, threshold: u32) -> String {
    let icon = if stats.current >= threshold {
        ICON_ALERT
    } else {
        "📍"
    };
    let mut line = format!("{icon} {label}: max <b>{}</b> NG", stats.max);
    if stats.current > 0 {
        line.push_str(&format!(" · in corso {}", stats.current));
        if let Some(start) = &stats.start_marker {
            line.push_str(&format!(" da G{}", pad_round(start)));
        }
    }
    line.push('\n');
    if !stats.histogram.is_empty() {
        let runs: Vec<String> = stats
            .histogram
            .iter()
            .map(|(len, count)| format!("{len}x{count}"))
            .collect();
        line.push_str(&format!("   serie: {}\n", runs.join(", ")));
    }
    line
}

/// Labelled streak statistics for the requested view.
fn streak_rows(records: &[&RoundRecord], view: ReportView) -> Vec<(String, StreakStats)> {
    match view {
        ReportView::Position => (0..POSITIONS)
            .map(|pos| {
                (
                    format!("Pos {}", pos + 1),
                    position_streaks(records.iter().copied(), pos, Outcome::NoGoal),
                )
            })
            .collect(),
        ReportView::Team => {
            let teams = aggregate_by_team(records.iter().copied());
            team_streaks(&teams, Outcome::NoGoal)
                .into_iter()
                .map(|(code, stats)| (code.to_string(), stats))
                .collect()
        }
    }
}

/// Streaks over the whole history; entries below the floor are omitted.
#[must_use]
pub fn render_streak(records: &[RoundRecord], ctx: &ReportContext) -> String {
    if records.is_empty() {
        return NO_DATA.to_string();
    }
    let all: Vec<&RoundRecord> = records.iter().collect();

    let mut rows = String::new();
    for (label, stats) in streak_rows(&all, ctx.view) {
        if stats.qualifies() {
            rows.push_str(&streak_line(&label, &stats, ctx.threshold));
        }
    }
    if rows.is_empty() {
        rows = format!("Nessuna serie ≥{STREAK_FLOOR} NG\n");
    }

    let header = format!(
        "📈 <b>STREAK TOTALE NG (≥{STREAK_FLOOR})</b>\n📊 {} giornate\n\n",
        records.len()
    );
    finish(ctx, header, &rows)
}

/// Streaks over today's rounds; every entry is shown.
#[must_use]
pub fn render_streak_daily(records: &[RoundRecord], ctx: &ReportContext) -> String {
    let today = ctx.today();
    let day = for_date(records, &today);
    if day.is_empty() {
        let empty = format!("Nessun dato per {today}");
        return if ctx.raw_data_only {
            empty
        } else {
            format!("📊 <b>STREAK GIORNALIERO</b>\n\n{empty}")
        };
    }

    let mut rows = String::new();
    for (label, stats) in streak_rows(&day, ctx.view) {
        rows.push_str(&streak_line(&label, &stats, ctx.threshold));
    }
    if rows.is_empty() {
        rows.push_str("Nessuna squadra riconosciuta\n");
    }

    let header = format!(
        "📊 <b>STREAK GIORNALIERO</b>\n📅 {today} ({} giornate)\n\n",
        day.len()
    );
    finish(ctx, header, &rows)
}
