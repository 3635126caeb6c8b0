// crates/gamelog-core/src/runtime/ranking.rs
// ============================================================================
// Module: Score Ranking
// Description: Deterministic leaderboard ordering and truncation.
// Purpose: Share one ordering between the in-memory and relational backends.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Leaderboards order by score descending, then timestamp descending (the
//! most recent of equal scores first), then id ascending so that equal
//! `(score, timestamp)` pairs still have a stable order.

use std::cmp::Ordering;

use crate::core::GameName;
use crate::core::ScoreRecord;

/// Number of records returned by leaderboard queries.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Compares two records by leaderboard rank (higher rank sorts first).
#[must_use]
pub fn compare_rank(left: &ScoreRecord, right: &ScoreRecord) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| right.timestamp.cmp(&left.timestamp))
        .then_with(|| left.id.cmp(&right.id))
}

/// Selects the top `limit` records for `game_name` from an unordered set.
#[must_use]
pub fn top_scores<'a, I>(records: I, game_name: &GameName, limit: usize) -> Vec<ScoreRecord>
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let mut selected: Vec<ScoreRecord> =
        records.into_iter().filter(|record| &record.game_name == game_name).cloned().collect();
    selected.sort_by(compare_rank);
    selected.truncate(limit);
    selected
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use time::macros::datetime;

    use super::*;
    use crate::core::ScoreId;
    use crate::core::Timestamp;

    fn record(id: &str, game: &str, score: i64, minute: u8) -> ScoreRecord {
        let base = Timestamp::new(datetime!(2024-01-01 00:00 UTC)).as_offset_date_time();
        ScoreRecord {
            id: ScoreId::new(id),
            game_name: GameName::parse(game).unwrap(),
            timestamp: Timestamp::new(base + time::Duration::minutes(i64::from(minute))),
            player_id: "p".to_string(),
            score,
        }
    }

    #[test]
    fn equal_score_and_time_fall_back_to_id() {
        let records = [record("b", "g", 5, 1), record("a", "g", 5, 1)];
        let top = top_scores(&records, &GameName::parse("g").unwrap(), 10);
        let ids: Vec<&str> = top.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn truncates_to_limit_after_sorting() {
        let records: Vec<ScoreRecord> =
            (0 .. 15).map(|i| record(&format!("r{i:02}"), "g", i, 0)).collect();
        let top = top_scores(&records, &GameName::parse("g").unwrap(), DEFAULT_LIST_LIMIT);
        assert_eq!(top.len(), DEFAULT_LIST_LIMIT);
        assert_eq!(top[0].score, 14);
        assert_eq!(top[9].score, 5);
    }
}
