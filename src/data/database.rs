//! SQLite storage for players, statistics and ranking snapshots

use chrono::NaiveDate;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use super::models::{
    Player, PlayerBio, PlayerRecord, PlayerStats, RankedPlayer, Ranking, RankingEntry, Season,
};
use super::repository::PlayerRepository;
use crate::{PlayerId, Result, TennisError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ID_LEN: usize = 5;

const PLAYER_COLUMNS: &str = "p.id, p.name, p.url, p.birth_date, p.country, p.birthplace, p.plays, \
     p.coach, p.turned_pro, p.weight_lbs, p.weight_kg, p.height_cm, p.height_feet, \
     p.height_inches, p.career_high_rank, p.career_high_rank_date";
/// Number of columns in [`PLAYER_COLUMNS`]
const PLAYER_COLUMN_COUNT: usize = 16;

const RANKING_COLUMNS: &str = "r.rank, r.rank_change, r.age, r.points, r.earn_drop, \
     r.tournaments, r.dropping, r.next_best, r.country";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS players (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                url TEXT,
                birth_date TEXT,
                country TEXT,
                birthplace TEXT,
                plays TEXT,
                coach TEXT,
                turned_pro INTEGER,
                weight_lbs INTEGER,
                weight_kg INTEGER,
                height_cm INTEGER,
                height_feet INTEGER,
                height_inches INTEGER,
                career_high_rank INTEGER,
                career_high_rank_date TEXT
            );

            CREATE TABLE IF NOT EXISTS player_stats (
                player_id TEXT PRIMARY KEY REFERENCES players(id) ON DELETE CASCADE,
                aces INTEGER,
                double_faults INTEGER,
                first_serve_pct REAL,
                first_serve_points_won REAL,
                second_serve_points_won REAL,
                break_points_faced INTEGER,
                break_points_saved REAL,
                service_games_played INTEGER,
                service_games_won REAL,
                total_service_points_won REAL,
                first_serve_return_points_won REAL,
                second_serve_return_points_won REAL,
                break_points_opportunities INTEGER,
                break_points_converted REAL,
                return_games_played INTEGER,
                return_games_won REAL,
                return_points_won REAL,
                total_points_won REAL
            );

            CREATE TABLE IF NOT EXISTS player_records (
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                season TEXT NOT NULL,
                rank INTEGER,
                move TEXT,
                wl_record TEXT,
                titles INTEGER,
                prize_money TEXT,
                UNIQUE(player_id, season)
            );

            CREATE TABLE IF NOT EXISTS rankings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                rank INTEGER,
                rank_change TEXT,
                age INTEGER,
                points INTEGER,
                earn_drop TEXT,
                tournaments INTEGER,
                dropping TEXT,
                next_best TEXT,
                country TEXT,
                UNIQUE(player_id, date)
            );

            CREATE INDEX IF NOT EXISTS idx_rankings_date ON rankings(date, rank);
            CREATE INDEX IF NOT EXISTS idx_rankings_player ON rankings(player_id, date);
            "#,
        )?;
        Ok(())
    }

    /// Run `f` inside a transaction, rolling back if it fails
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Delete every player, record, statistic and ranking
    pub fn clear(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM rankings; DELETE FROM player_records; \
             DELETE FROM player_stats; DELETE FROM players;",
        )?;
        Ok(())
    }

    // ==================== Player Operations ====================

    /// Pick a random id not yet used by any player
    fn generate_player_id(&self) -> Result<PlayerId> {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
                .collect();
            let taken: bool = self.conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM players WHERE id = ?1)",
                params![&id],
                |row| row.get(0),
            )?;
            if !taken {
                return Ok(PlayerId(id));
            }
        }
    }

    /// Insert a player or overwrite the bio of the player with the same name
    pub fn upsert_player(&self, bio: &PlayerBio) -> Result<Player> {
        let id = match self.find_player_by_exact_name(&bio.name)? {
            Some(existing) => existing.id,
            None => {
                let id = self.generate_player_id()?;
                self.conn.execute(
                    "INSERT INTO players (id, name) VALUES (?1, ?2)",
                    params![id.0, bio.name],
                )?;
                id
            }
        };

        self.conn.execute(
            r#"
            UPDATE players SET
                url = ?2, birth_date = ?3, country = ?4, birthplace = ?5, plays = ?6,
                coach = ?7, turned_pro = ?8, weight_lbs = ?9, weight_kg = ?10,
                height_cm = ?11, height_feet = ?12, height_inches = ?13,
                career_high_rank = ?14, career_high_rank_date = ?15
            WHERE id = ?1
            "#,
            params![
                id.0,
                bio.url,
                bio.birth_date.map(format_date),
                bio.country,
                bio.birthplace,
                bio.plays,
                bio.coach,
                bio.turned_pro,
                bio.weight_lbs,
                bio.weight_kg,
                bio.height_cm,
                bio.height_feet,
                bio.height_inches,
                bio.career_high_rank,
                bio.career_high_rank_date.map(format_date),
            ],
        )?;

        Ok(Player {
            id,
            bio: bio.clone(),
        })
    }

    /// Get a player by exact name, creating a bare entry if missing
    pub fn get_or_create_player(&self, name: &str, country: Option<&str>) -> Result<Player> {
        if let Some(player) = self.find_player_by_exact_name(name)? {
            return Ok(player);
        }

        let id = self.generate_player_id()?;
        self.conn.execute(
            "INSERT INTO players (id, name, country) VALUES (?1, ?2, ?3)",
            params![id.0, name, country],
        )?;
        log::debug!("Created player {} ({})", name, id);

        Ok(Player {
            id,
            bio: PlayerBio {
                country: country.map(str::to_string),
                ..PlayerBio::named(name)
            },
        })
    }

    fn find_player_by_exact_name(&self, name: &str) -> Result<Option<Player>> {
        let sql = format!("SELECT {} FROM players p WHERE p.name = ?1", PLAYER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![name], Self::row_to_player)
            .optional()?)
    }

    /// Find a player by name, ignoring case
    pub fn find_player_by_name(&self, name: &str) -> Result<Option<Player>> {
        let sql = format!(
            "SELECT {} FROM players p WHERE LOWER(p.name) = LOWER(?1)",
            PLAYER_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![name.trim()], Self::row_to_player)
            .optional()?)
    }

    pub fn find_player(&self, id: &PlayerId) -> Result<Option<Player>> {
        let sql = format!("SELECT {} FROM players p WHERE p.id = ?1", PLAYER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id.0], Self::row_to_player)
            .optional()?)
    }

    /// Get player by ID
    pub fn get_player(&self, id: &PlayerId) -> Result<Player> {
        self.find_player(id)?
            .ok_or_else(|| TennisError::PlayerNotFound(id.clone()))
    }

    /// Resolve a player from an id or a name
    pub fn resolve_player(&self, key: &str) -> Result<Player> {
        if let Some(player) = self.find_player(&PlayerId(key.trim().to_uppercase()))? {
            return Ok(player);
        }
        self.find_player_by_name(key)?
            .ok_or_else(|| TennisError::UnknownPlayer(key.to_string()))
    }

    /// Get all players ordered by name
    pub fn get_all_players(&self) -> Result<Vec<Player>> {
        let sql = format!("SELECT {} FROM players p ORDER BY p.name", PLAYER_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let players = stmt
            .query_map([], Self::row_to_player)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(players)
    }

    fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
        let birth_date: Option<String> = row.get(3)?;
        let high_date: Option<String> = row.get(15)?;
        Ok(Player {
            id: PlayerId(row.get(0)?),
            bio: PlayerBio {
                name: row.get(1)?,
                url: row.get(2)?,
                birth_date: birth_date.as_deref().and_then(parse_date),
                country: row.get(4)?,
                birthplace: row.get(5)?,
                plays: row.get(6)?,
                coach: row.get(7)?,
                turned_pro: row.get(8)?,
                weight_lbs: row.get(9)?,
                weight_kg: row.get(10)?,
                height_cm: row.get(11)?,
                height_feet: row.get(12)?,
                height_inches: row.get(13)?,
                career_high_rank: row.get(14)?,
                career_high_rank_date: high_date.as_deref().and_then(parse_date),
            },
        })
    }

    // ==================== Stats & Records ====================

    pub fn upsert_stats(&self, player_id: &PlayerId, stats: &PlayerStats) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO player_stats (
                player_id, aces, double_faults, first_serve_pct, first_serve_points_won,
                second_serve_points_won, break_points_faced, break_points_saved,
                service_games_played, service_games_won, total_service_points_won,
                first_serve_return_points_won, second_serve_return_points_won,
                break_points_opportunities, break_points_converted, return_games_played,
                return_games_won, return_points_won, total_points_won)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                player_id.0,
                stats.aces,
                stats.double_faults,
                stats.first_serve_pct,
                stats.first_serve_points_won,
                stats.second_serve_points_won,
                stats.break_points_faced,
                stats.break_points_saved,
                stats.service_games_played,
                stats.service_games_won,
                stats.total_service_points_won,
                stats.first_serve_return_points_won,
                stats.second_serve_return_points_won,
                stats.break_points_opportunities,
                stats.break_points_converted,
                stats.return_games_played,
                stats.return_games_won,
                stats.return_points_won,
                stats.total_points_won,
            ],
        )?;
        Ok(())
    }

    pub fn get_stats_for(&self, player_id: &PlayerId) -> Result<Option<PlayerStats>> {
        Ok(self
            .conn
            .query_row(
                "SELECT aces, double_faults, first_serve_pct, first_serve_points_won,
                        second_serve_points_won, break_points_faced, break_points_saved,
                        service_games_played, service_games_won, total_service_points_won,
                        first_serve_return_points_won, second_serve_return_points_won,
                        break_points_opportunities, break_points_converted, return_games_played,
                        return_games_won, return_points_won, total_points_won
                 FROM player_stats WHERE player_id = ?1",
                params![player_id.0],
                |row| {
                    Ok(PlayerStats {
                        aces: row.get(0)?,
                        double_faults: row.get(1)?,
                        first_serve_pct: row.get(2)?,
                        first_serve_points_won: row.get(3)?,
                        second_serve_points_won: row.get(4)?,
                        break_points_faced: row.get(5)?,
                        break_points_saved: row.get(6)?,
                        service_games_played: row.get(7)?,
                        service_games_won: row.get(8)?,
                        total_service_points_won: row.get(9)?,
                        first_serve_return_points_won: row.get(10)?,
                        second_serve_return_points_won: row.get(11)?,
                        break_points_opportunities: row.get(12)?,
                        break_points_converted: row.get(13)?,
                        return_games_played: row.get(14)?,
                        return_games_won: row.get(15)?,
                        return_points_won: row.get(16)?,
                        total_points_won: row.get(17)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn upsert_record(&self, player_id: &PlayerId, record: &PlayerRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO player_records (player_id, season, rank, move, wl_record, titles, prize_money)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(player_id, season) DO UPDATE SET
                rank = excluded.rank,
                move = excluded.move,
                wl_record = excluded.wl_record,
                titles = excluded.titles,
                prize_money = excluded.prize_money
            "#,
            params![
                player_id.0,
                record.season.code(),
                record.rank,
                record.movement,
                record.wl_record,
                record.titles,
                record.prize_money,
            ],
        )?;
        Ok(())
    }

    pub fn get_record(&self, player_id: &PlayerId, season: Season) -> Result<Option<PlayerRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT rank, move, wl_record, titles, prize_money
                 FROM player_records WHERE player_id = ?1 AND season = ?2",
                params![player_id.0, season.code()],
                |row| {
                    Ok(PlayerRecord {
                        season,
                        rank: row.get(0)?,
                        movement: row.get(1)?,
                        wl_record: row.get(2)?,
                        titles: row.get(3)?,
                        prize_money: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    // ==================== Ranking Operations ====================

    /// Insert or replace a player's entry in the snapshot for `date`
    pub fn upsert_ranking(
        &self,
        player_id: &PlayerId,
        date: NaiveDate,
        entry: &RankingEntry,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO rankings (player_id, date, rank, rank_change, age, points, earn_drop,
                                  tournaments, dropping, next_best, country)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(player_id, date) DO UPDATE SET
                rank = excluded.rank,
                rank_change = excluded.rank_change,
                age = excluded.age,
                points = excluded.points,
                earn_drop = excluded.earn_drop,
                tournaments = excluded.tournaments,
                dropping = excluded.dropping,
                next_best = excluded.next_best,
                country = excluded.country
            "#,
            params![
                player_id.0,
                format_date(date),
                entry.rank,
                entry.rank_change,
                entry.age,
                entry.points,
                entry.earn_drop,
                entry.tournaments,
                entry.dropping,
                entry.next_best,
                entry.country,
            ],
        )?;
        Ok(())
    }

    /// Most recent ranking entry for a player
    pub fn latest_ranking(&self, player_id: &PlayerId) -> Result<Option<RankingEntry>> {
        let sql = format!(
            "SELECT {} FROM rankings r WHERE r.player_id = ?1 ORDER BY r.date DESC LIMIT 1",
            RANKING_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![player_id.0], |row| Self::row_to_entry(row, 0))
            .optional()?)
    }

    /// Snapshot dates, newest first
    pub fn ranking_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT date FROM rankings ORDER BY date DESC")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(dates.iter().filter_map(|d| parse_date(d)).collect())
    }

    /// Rankings of one snapshot ordered by rank (latest snapshot when `date` is None)
    pub fn rankings_on(
        &self,
        date: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Result<Vec<(Player, Ranking)>> {
        let date = match date {
            Some(d) => d,
            None => match self.ranking_dates()?.first() {
                Some(&latest) => latest,
                None => return Ok(vec![]),
            },
        };

        let sql = format!(
            "SELECT {}, {} FROM rankings r JOIN players p ON p.id = r.player_id
             WHERE r.date = ?1
             ORDER BY r.rank IS NULL, r.rank, p.name
             LIMIT ?2",
            PLAYER_COLUMNS, RANKING_COLUMNS
        );
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![format_date(date), limit], |row| {
                let player = Self::row_to_player(row)?;
                let entry = Self::row_to_entry(row, PLAYER_COLUMN_COUNT)?;
                Ok((
                    player.clone(),
                    Ranking {
                        player_id: player.id,
                        date,
                        entry,
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Players whose latest rank is at most `max_rank`, ordered by name
    pub fn ranked_players(&self, max_rank: u32) -> Result<Vec<RankedPlayer>> {
        let sql = format!(
            "SELECT {}, r.rank, r.points FROM players p
             JOIN rankings r ON r.player_id = p.id
             WHERE r.date = (SELECT MAX(date) FROM rankings WHERE player_id = p.id)
               AND r.rank IS NOT NULL AND r.rank <= ?1
             ORDER BY p.name",
            PLAYER_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let players = stmt
            .query_map(params![max_rank], |row| {
                Ok(RankedPlayer {
                    player: Self::row_to_player(row)?,
                    rank: row.get(PLAYER_COLUMN_COUNT)?,
                    points: row.get(PLAYER_COLUMN_COUNT + 1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(players)
    }

    fn row_to_entry(row: &Row, offset: usize) -> rusqlite::Result<RankingEntry> {
        Ok(RankingEntry {
            rank: row.get(offset)?,
            rank_change: row.get(offset + 1)?,
            age: row.get(offset + 2)?,
            points: row.get(offset + 3)?,
            earn_drop: row.get(offset + 4)?,
            tournaments: row.get(offset + 5)?,
            dropping: row.get(offset + 6)?,
            next_best: row.get(offset + 7)?,
            country: row.get(offset + 8)?,
        })
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        let (min_date, max_date): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM rankings",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(DatabaseStats {
            player_count: count("SELECT COUNT(*) FROM players")?,
            ranking_count: count("SELECT COUNT(*) FROM rankings")?,
            snapshot_count: count("SELECT COUNT(DISTINCT date) FROM rankings")?,
            stats_count: count("SELECT COUNT(*) FROM player_stats")?,
            earliest_ranking: min_date.as_deref().and_then(parse_date),
            latest_ranking: max_date.as_deref().and_then(parse_date),
        })
    }
}

impl PlayerRepository for Database {
    fn player(&self, id: &PlayerId) -> Result<Option<Player>> {
        self.find_player(id)
    }

    fn latest_ranking(&self, id: &PlayerId) -> Result<Option<RankingEntry>> {
        Database::latest_ranking(self, id)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub player_count: usize,
    pub ranking_count: usize,
    pub snapshot_count: usize,
    pub stats_count: usize,
    pub earliest_ranking: Option<NaiveDate>,
    pub latest_ranking: Option<NaiveDate>,
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
