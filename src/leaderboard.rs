//! Leaderboard view model.

#[cfg(test)]
#[path = "leaderboard_test.rs"]
mod leaderboard_test;

use frames::UserStats;

use crate::wallet::Address;

/// Highlight tier for a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Gold,
    Silver,
    Bronze,
    Standard,
}

impl RankTier {
    /// Tier for a 1-based rank.
    #[must_use]
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            _ => Self::Standard,
        }
    }
}

/// One rendered leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub tier: RankTier,
    pub short_address: String,
    pub pixels_painted: u64,
    pub points: u64,
    /// Row belongs to the connected wallet.
    pub is_current: bool,
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    entries: Vec<UserStats>,
    user: Option<Address>,
    user_stats: Option<UserStats>,
}

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ranking (initial fetch or push update). Refreshes the
    /// current user's stats if they appear in it.
    pub fn replace(&mut self, entries: Vec<UserStats>) {
        if let Some(user) = &self.user {
            if let Some(found) = entries.iter().find(|e| user.matches(&e.wallet_address)) {
                self.user_stats = Some(found.clone());
            }
        }
        self.entries = entries;
    }

    /// Track a different wallet (or none). Stats for the previous one are dropped.
    pub fn set_user(&mut self, user: Option<Address>) {
        if self.user == user {
            return;
        }
        self.user_stats = user
            .as_ref()
            .and_then(|u| self.entries.iter().find(|e| u.matches(&e.wallet_address)).cloned());
        self.user = user;
    }

    /// Stats fetched for the current user. Ignored if they belong to someone else.
    pub fn set_user_stats(&mut self, stats: UserStats) {
        if self.user.as_ref().is_some_and(|u| u.matches(&stats.wallet_address)) {
            self.user_stats = Some(stats);
        }
    }

    #[must_use]
    pub fn user_stats(&self) -> Option<&UserStats> {
        self.user_stats.as_ref()
    }

    #[must_use]
    pub fn entries(&self) -> &[UserStats] {
        &self.entries
    }

    #[must_use]
    pub fn rows(&self) -> Vec<LeaderboardRow> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                tier: RankTier::for_rank(i + 1),
                short_address: shorten_address(&entry.wallet_address),
                pixels_painted: entry.pixels_painted,
                points: entry.points,
                is_current: self.user.as_ref().is_some_and(|u| u.matches(&entry.wallet_address)),
            })
            .collect()
    }
}

/// `0x1234...abcd`: first six and last four characters.
#[must_use]
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_owned();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
