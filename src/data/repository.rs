//! Read-only player lookups used by prediction

use chrono::NaiveDate;

use super::models::{Player, RankingEntry};
use crate::{PlayerId, PlayerSnapshot, Result, DEFAULT_AGE, DEFAULT_HEIGHT_CM, UNRANKED};

/// Source of player bios and rankings
pub trait PlayerRepository {
    fn player(&self, id: &PlayerId) -> Result<Option<Player>>;

    /// Most recent ranking entry for a player
    fn latest_ranking(&self, id: &PlayerId) -> Result<Option<RankingEntry>>;

    /// Player joined with their latest ranking as of `today`, with documented defaults applied
    fn latest_snapshot(&self, id: &PlayerId, today: NaiveDate) -> Result<Option<PlayerSnapshot>> {
        let Some(player) = self.player(id)? else {
            return Ok(None);
        };
        let ranking = self.latest_ranking(id)?;
        Ok(Some(snapshot_of(&player, ranking.as_ref(), today)))
    }
}

/// Combine a player with an optional ranking entry
pub fn snapshot_of(player: &Player, ranking: Option<&RankingEntry>, today: NaiveDate) -> PlayerSnapshot {
    PlayerSnapshot {
        rank: ranking.and_then(|r| r.rank).unwrap_or(UNRANKED),
        points: ranking.and_then(|r| r.points).unwrap_or(0),
        height_cm: player.bio.height_cm.unwrap_or(DEFAULT_HEIGHT_CM),
        age: player.age_on(today).unwrap_or(DEFAULT_AGE),
        hand: player.hand(),
        seed: 0,
    }
}
