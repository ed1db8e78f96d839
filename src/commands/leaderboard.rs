//! Chat leaderboards.
//!
//! [`aggregate`] ranks the members of a chat from a snapshot of their records.
//! It does no I/O; [`collect_records`] builds the snapshot from a
//! [`PlayerStore`] beforehand.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{
    servers::{Mode, PlayerRecord, RankedEntry},
    storage::PlayerStore,
};

/// Maximum number of entries in a leaderboard.
pub const PAGE_SIZE: usize = 15;

/// Ranks players from their records.
///
/// 1. Each distinct id is looked up once, ids without record are dropped
/// 2. Records sharing a server player id are kept once, first one wins
/// 3. Unranked records, with a zero rank or no performance, are dropped
/// 4. Entries are sorted by rank, ties keep their input order
/// 5. At most [`PAGE_SIZE`] entries are kept
///
/// # Arguments
///
/// * `player_ids` - Ids to rank, in encounter order
/// * `mode` - Mode of the records
/// * `lookup` - Returns the record of an id in a mode, if known
///
/// # Examples
///
/// ```
/// # use scorebot::commands::leaderboard::aggregate;
/// # use scorebot::servers::Mode;
/// let entries = aggregate(&["42".to_owned()], Mode::Standard, |_, _| None);
/// assert!(entries.is_empty());
/// ```
pub fn aggregate<F>(player_ids: &[String], mode: Mode, lookup: F) -> Vec<RankedEntry>
where
    F: Fn(&str, Mode) -> Option<PlayerRecord>,
{
    let mut seen_ids = HashSet::new();
    let records = player_ids
        .iter()
        .filter(|id| seen_ids.insert(id.as_str()))
        .filter_map(|id| lookup(id.as_str(), mode));

    let mut seen_players = HashSet::new();
    let entries: Vec<RankedEntry> = records
        .filter(|record| seen_players.insert(record.player_id.clone()))
        .map(|record| RankedEntry::from(&record))
        .collect();

    rank(entries)
}

/// Drops unranked entries, sorts the others by rank and keeps a page.
///
/// The sort is stable, entries with the same rank keep their order.
pub fn rank(entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = entries
        .into_iter()
        .filter(|entry| entry.rank > 0 && entry.performance > 0.0)
        .collect();

    entries.sort_by_key(|entry| entry.rank);
    entries.truncate(PAGE_SIZE);
    entries
}

/// Reads the records of `player_ids` in `mode` from `store`, one at a time.
///
/// Returns a snapshot suitable for the `lookup` argument of [`aggregate`].
pub async fn collect_records(
    store: &PlayerStore,
    player_ids: &[String],
    mode: Mode,
) -> HashMap<String, PlayerRecord> {
    let mut records = HashMap::new();

    for player_id in player_ids {
        if records.contains_key(player_id) {
            continue;
        }
        if let Some(record) = store.get_record(player_id, mode).await {
            records.insert(player_id.clone(), record);
        }
    }

    debug!("collected {} of {} records", records.len(), player_ids.len());

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(player_id: &str, rank: u64, performance: f64) -> PlayerRecord {
        PlayerRecord {
            player_id: player_id.to_owned(),
            nickname: format!("player-{}", player_id),
            mode: Mode::Standard,
            rank,
            performance,
            accuracy: 98.0,
            play_count: 100,
            country: None,
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn lookup_in(records: &HashMap<String, PlayerRecord>) -> impl Fn(&str, Mode) -> Option<PlayerRecord> {
        move |id: &str, _: Mode| records.get(id).cloned()
    }

    #[test]
    fn test_aggregate_drops_unranked_and_duplicates() {
        // a and c are two members linked to the same server player
        let records = HashMap::from([
            ("a".to_owned(), create_test_record("p1", 5, 100.0)),
            ("b".to_owned(), create_test_record("p2", 0, 0.0)),
            ("c".to_owned(), create_test_record("p1", 5, 100.0)),
        ]);

        let entries = aggregate(&ids(&["a", "b", "c"]), Mode::Standard, lookup_in(&records));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_id, "p1");
    }

    #[test]
    fn test_aggregate_drops_missing_records() {
        let records = HashMap::from([("a".to_owned(), create_test_record("p1", 3, 50.0))]);

        let entries = aggregate(&ids(&["missing", "a"]), Mode::Standard, lookup_in(&records));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rank, 3);
    }

    #[test]
    fn test_aggregate_filters_zero_rank_or_performance() {
        let records = HashMap::from([
            ("a".to_owned(), create_test_record("p1", 0, 100.0)),
            ("b".to_owned(), create_test_record("p2", 10, 0.0)),
            ("c".to_owned(), create_test_record("p3", 10, 1.0)),
        ]);

        let entries = aggregate(&ids(&["a", "b", "c"]), Mode::Standard, lookup_in(&records));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_id, "p3");
    }

    #[test]
    fn test_aggregate_sorted_and_stable() {
        let records = HashMap::from([
            ("a".to_owned(), create_test_record("p1", 30, 10.0)),
            ("b".to_owned(), create_test_record("p2", 10, 10.0)),
            ("c".to_owned(), create_test_record("p3", 20, 10.0)),
            ("d".to_owned(), create_test_record("p4", 10, 10.0)),
        ]);
        let player_ids = ids(&["a", "b", "c", "d"]);

        let entries = aggregate(&player_ids, Mode::Standard, lookup_in(&records));
        let order: Vec<&str> = entries.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p4", "p3", "p1"]);

        for pair in entries.windows(2) {
            assert!(pair[0].rank <= pair[1].rank);
        }

        let again = aggregate(&player_ids, Mode::Standard, lookup_in(&records));
        assert_eq!(entries, again);
    }

    #[test]
    fn test_aggregate_page_size() {
        let records: HashMap<String, PlayerRecord> = (1..=40)
            .map(|i| (i.to_string(), create_test_record(&format!("p{}", i), 41 - i, 10.0)))
            .collect();
        let player_ids: Vec<String> = (1..=40).map(|i| i.to_string()).collect();

        let entries = aggregate(&player_ids, Mode::Standard, lookup_in(&records));

        assert_eq!(entries.len(), PAGE_SIZE);
        assert_eq!(entries[0].rank, 1);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[], Mode::Taiko, |_, _| None).is_empty());
    }

    #[tokio::test]
    async fn test_collect_records() {
        let store = PlayerStore::in_memory();
        store.put_record(create_test_record("42", 5, 100.0)).await;

        let records = collect_records(&store, &ids(&["42", "43", "42"]), Mode::Standard).await;

        assert_eq!(records.len(), 1);
        assert!(records.contains_key("42"));
        assert!(collect_records(&store, &ids(&["42"]), Mode::Taiko).await.is_empty());
    }
}
