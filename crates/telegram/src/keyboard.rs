//! The report menu attached to every bot message.

use fas_monitor_core::{ReportKind, ReportView};

use crate::types::{InlineButton, InlineKeyboard};

/// Body of the stand-alone menu message sent to the channel.
pub const MENU_TEXT: &str = "⚽ <b>FAS MONITOR</b>\n\nSeleziona:";

fn button(label: &str, kind: ReportKind, view: ReportView) -> InlineButton {
    InlineButton::callback(label, kind.callback_data(view))
}

/// Inline keyboard with every report, by position and by team.
#[must_use]
pub fn report_menu() -> InlineKeyboard {
    use ReportKind::{History, Info, Stats, Streak, StreakDaily};
    use ReportView::{Position, Team};

    InlineKeyboard::new(vec![
        vec![
            button("📈 Streak Totale", Streak, Position),
            button("📊 Streak Giornaliero", StreakDaily, Position),
        ],
        vec![
            button("📋 Storico Ultime 15", History, Position),
            button("ℹ️ Info", Info, Position),
        ],
        vec![button("🔥 Stats NG", Stats, Position)],
        vec![
            button("🏟 Streak Squadre", Streak, Team),
            button("🏟 Giornaliero Squadre", StreakDaily, Team),
        ],
        vec![
            button("🏟 Storico Squadre", History, Team),
            button("🏟 Stats Squadre", Stats, Team),
        ],
    ])
}

impl InlineKeyboard {
    /// Shorthand for [`report_menu`].
    #[must_use]
    pub fn report_menu() -> Self {
        report_menu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callbacks(keyboard: &InlineKeyboard) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.callback_data.clone())
            .collect()
    }

    #[test]
    fn test_every_callback_parses_back() {
        let keyboard = InlineKeyboard::report_menu();
        let data = callbacks(&keyboard);
        assert_eq!(data.len(), 9);
        for entry in &data {
            assert!(ReportKind::from_callback(entry).is_some(), "{entry}");
        }
    }

    #[test]
    fn test_position_buttons_lead_the_menu() {
        let data = callbacks(&report_menu());
        assert_eq!(&data[..4], &["streak", "streak_daily", "history", "info"]);
        assert!(data.contains(&"streak:team".to_string()));
    }
}
