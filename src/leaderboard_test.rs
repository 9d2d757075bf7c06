use super::*;
use crate::test_helpers::{addr, stats};

fn sample() -> Vec<UserStats> {
    vec![
        stats(addr('a').as_str(), 300, 30),
        stats(addr('b').as_str(), 200, 20),
        stats(addr('c').as_str(), 100, 10),
        stats(addr('d').as_str(), 50, 5),
    ]
}

#[test]
fn tiers_by_rank() {
    assert_eq!(RankTier::for_rank(1), RankTier::Gold);
    assert_eq!(RankTier::for_rank(2), RankTier::Silver);
    assert_eq!(RankTier::for_rank(3), RankTier::Bronze);
    assert_eq!(RankTier::for_rank(4), RankTier::Standard);
    assert_eq!(RankTier::for_rank(0), RankTier::Standard);
}

#[test]
fn shorten_keeps_head_and_tail() {
    assert_eq!(shorten_address("0x5255eF6956a77143D3F18978555c6cdCd4F2aA0A"), "0x5255...aA0A");
    assert_eq!(shorten_address("0x12345678"), "0x12345678");
    assert_eq!(shorten_address(""), "");
}

#[test]
fn rows_follow_backend_order() {
    let mut board = Leaderboard::new();
    board.replace(sample());
    let rows = board.rows();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].tier, RankTier::Gold);
    assert_eq!(rows[0].points, 300);
    assert_eq!(rows[3].tier, RankTier::Standard);
    assert_eq!(rows[3].pixels_painted, 5);
    assert!(rows.iter().all(|r| !r.is_current));
}

#[test]
fn current_user_highlighted_case_insensitively() {
    let mut board = Leaderboard::new();
    let mut entries = sample();
    entries[1].wallet_address = entries[1].wallet_address.to_ascii_uppercase().replacen("0X", "0x", 1);
    board.replace(entries);
    board.set_user(Some(addr('b')));

    let current: Vec<usize> = board.rows().iter().filter(|r| r.is_current).map(|r| r.rank).collect();
    assert_eq!(current, [2]);
    assert_eq!(board.user_stats().map(|s| s.points), Some(200));
}

#[test]
fn push_update_refreshes_user_stats() {
    let mut board = Leaderboard::new();
    board.set_user(Some(addr('d')));
    assert!(board.user_stats().is_none());

    board.replace(sample());
    assert_eq!(board.user_stats().map(|s| s.pixels_painted), Some(5));

    board.replace(vec![stats(addr('d').as_str(), 60, 6)]);
    assert_eq!(board.user_stats().map(|s| s.pixels_painted), Some(6));
}

#[test]
fn user_dropping_off_board_keeps_last_stats() {
    let mut board = Leaderboard::new();
    board.set_user(Some(addr('d')));
    board.replace(sample());
    board.replace(vec![stats(addr('a').as_str(), 1, 1)]);
    assert_eq!(board.user_stats().map(|s| s.points), Some(50));
}

#[test]
fn stats_for_other_wallet_ignored() {
    let mut board = Leaderboard::new();
    board.set_user(Some(addr('a')));
    board.set_user_stats(stats(addr('b').as_str(), 1, 1));
    assert!(board.user_stats().is_none());

    board.set_user_stats(stats(addr('a').as_str(), 9, 3));
    assert_eq!(board.user_stats().map(|s| s.points), Some(9));
}

#[test]
fn switching_user_drops_previous_stats() {
    let mut board = Leaderboard::new();
    board.set_user(Some(addr('e')));
    board.set_user_stats(stats(addr('e').as_str(), 9, 3));

    board.set_user(None);
    assert!(board.user_stats().is_none());
}
