//! Ingest-to-report scenarios: incoming JSON is normalized, ordered and fed
//! through the streak engine and renderers exactly as the server does.

use chrono::{FixedOffset, TimeZone};
use fas_monitor_core::report::{render_stats, render_streak};
use fas_monitor_core::sequencer::chronological;
use fas_monitor_core::streak::position_streaks;
use fas_monitor_core::template::apply_template;
use fas_monitor_core::{
    aggregate_by_team, render_templated, IncomingRound, Outcome, ReportContext, ReportKind,
    RoundRecord,
};
use serde_json::json;

/// Rounds pushed in order, one minute apart, every slot tagged `tag`.
fn batch(rounds: &[u32], tag: &str) -> Vec<IncomingRound> {
    rounds
        .iter()
        .enumerate()
        .map(|(i, giornata)| {
            serde_json::from_value(json!({
                "id": i,
                "dataRicerca": "01/04/2026",
                "giornata": giornata,
                "ora": format!("10:{i:02}"),
                "matches": (0..6).map(|_| json!({"result": tag, "teams": "JUV-INT"})).collect::<Vec<_>>(),
            }))
            .unwrap()
        })
        .collect()
}

fn normalize(batch: &[IncomingRound]) -> Vec<RoundRecord> {
    chronological(
        batch
            .iter()
            .enumerate()
            .map(|(i, item)| item.to_stored(i).to_record())
            .collect(),
    )
}

fn ctx() -> ReportContext {
    let now = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2026, 4, 1, 12, 0, 0)
        .unwrap();
    ReportContext::new(now, 6)
}

#[test]
fn gap_in_round_numbers_splits_the_run() {
    let records = normalize(&batch(&[1, 2, 3, 4, 5, 9, 10, 11, 12, 13], "NG"));
    let stats = position_streaks(&records, 0, Outcome::NoGoal);

    assert_eq!(stats.max, 5);
    assert_eq!(stats.current, 5);
    assert_eq!(stats.histogram.get(&5), Some(&2));
    assert!(!stats.histogram.contains_key(&10));
}

#[test]
fn round_22_wraps_to_round_1() {
    let records = normalize(&batch(&[19, 20, 21, 22, 1, 2], "NG"));
    let stats = position_streaks(&records, 0, Outcome::NoGoal);
    assert_eq!(stats.max, 6);
    assert_eq!(stats.current, 6);
    assert_eq!(stats.start_marker.as_deref(), Some("19"));

    let records = normalize(&batch(&[19, 20, 21, 22, 2, 3], "NG"));
    let stats = position_streaks(&records, 0, Outcome::NoGoal);
    assert_eq!(stats.max, 4);
    assert_eq!(stats.current, 2);
}

#[test]
fn current_never_exceeds_max() {
    let sequences: [&[u32]; 4] = [&[1, 2, 3], &[5, 4, 3, 2, 1], &[22, 1, 7, 8], &[]];
    for rounds in sequences {
        for tag in ["NG", "G"] {
            let records = normalize(&batch(rounds, tag));
            for pos in 0..6 {
                let stats = position_streaks(&records, pos, Outcome::NoGoal);
                assert!(stats.current <= stats.max, "{rounds:?} {tag}");
            }
        }
    }
}

#[test]
fn team_collects_home_and_away_appearances() {
    let batch: Vec<IncomingRound> = serde_json::from_value(json!([
        {"id": 1, "dataRicerca": "01/04/2026", "giornata": 1, "ora": "10:00",
         "matches": [{"result": "NG", "teams": "JUV-INT"}]},
        {"id": 2, "dataRicerca": "01/04/2026", "giornata": 2, "ora": "10:05",
         "matches": [{"result": "G", "match": "GEN-NAP"}, {"result": "NG", "squadre": "MIL-JUV"}]}
    ]))
    .unwrap();
    let records = normalize(&batch);
    let teams = aggregate_by_team(&records);

    let juv = &teams["JUV"];
    assert_eq!(juv.len(), 2);
    assert_eq!((juv[0].opponent.as_str(), juv[0].round_label.as_str()), ("INT", "1"));
    assert_eq!((juv[1].opponent.as_str(), juv[1].round_label.as_str()), ("MIL", "2"));
    assert_eq!(teams["NAP"].len(), 1);
}

#[test]
fn raw_rows_splice_into_template() {
    let records = normalize(&batch(&[1, 2, 3, 4, 5, 6], "NG"));
    let raw = render_stats(&records, &ctx().raw(true));

    let out = render_templated(ReportKind::Stats, &records, &ctx(), "HEAD\n{data}\n@ {timestamp}");
    assert_eq!(out, format!("HEAD\n{raw}\n@ 01/04/2026 12:00"));
    assert_eq!(out, apply_template("HEAD\n{data}\n@ {timestamp}", &raw, &ctx().timestamp()));
    assert!(!raw.contains("STATISTICHE"));
}

#[test]
fn out_of_order_push_is_sequenced_before_streaks() {
    let mut pushed = batch(&[1, 2, 3, 4, 5], "NG");
    pushed.reverse();
    let records = normalize(&pushed);
    let text = render_streak(&records, &ctx().raw(true));
    assert!(text.contains("Pos 1: max <b>5</b> NG · in corso 5 da G01"), "{text}");
}
