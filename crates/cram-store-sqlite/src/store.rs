//! [`SqliteStore`] — the SQLite implementation of [`TrackerStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use cram_core::{
  completion::{CompletionRecord, DayStatus, WeeklyCounts, week_window},
  store::TrackerStore,
  streak::{self, StreakState, StreakTransition},
  user::{User, UserId},
};

use crate::{
  Error, Result,
  encode::{RawStreak, RawUser, decode_count, encode_date, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cram tracker store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised onto the connection's thread, and multi-statement updates
/// run inside a transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Carry a decode failure out of a `call` closure.
fn other(e: Error) -> tokio_rusqlite::Error { tokio_rusqlite::Error::Other(Box::new(e)) }

fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:    row.get(0)?,
    name:       row.get(1)?,
    created_at: row.get(2)?,
  })
}

fn read_streak(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStreak> {
  Ok(RawStreak {
    user_id:              row.get(0)?,
    current:              row.get(1)?,
    best:                 row.get(2)?,
    last_completion_date: row.get(3)?,
  })
}

// ─── TrackerStore impl ───────────────────────────────────────────────────────

impl TrackerStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, user_id: UserId, name: String, now: DateTime<Utc>) -> Result<User> {
    let at_str = encode_dt(now);

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO users (user_id, name, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (user_id) DO UPDATE SET name = excluded.name",
          rusqlite::params![user_id, name, at_str],
        )?;
        tx.execute(
          "INSERT OR IGNORE INTO streaks (user_id, current_streak, best_streak)
           VALUES (?1, 0, 0)",
          rusqlite::params![user_id],
        )?;
        let raw = tx.query_row(
          "SELECT user_id, name, created_at FROM users WHERE user_id = ?1",
          rusqlite::params![user_id],
          read_user,
        )?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_user()
  }

  async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, name, created_at FROM users WHERE user_id = ?1",
              rusqlite::params![user_id],
              read_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT user_id, name, created_at FROM users ORDER BY seq")?;
        let rows = stmt
          .query_map([], read_user)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Completions ───────────────────────────────────────────────────────────

  async fn set_completion(&self, record: CompletionRecord) -> Result<CompletionRecord> {
    let user_id   = record.user_id;
    let date_str  = encode_date(record.date);
    let task_id   = record.task_id.clone();
    let completed = record.completed;
    let at_str    = record.completed_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO completions (user_id, date, task_id, completed, completed_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (user_id, date, task_id) DO UPDATE SET
             completed    = excluded.completed,
             completed_at = excluded.completed_at",
          rusqlite::params![user_id, date_str, task_id, completed, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::trace!(user_id, date = %record.date, task = %record.task_id, completed, "completion stored");
    Ok(record)
  }

  async fn get_status(&self, user_id: UserId, date: NaiveDate) -> Result<DayStatus> {
    let date_str = encode_date(date);

    let status = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT task_id, completed FROM completions WHERE user_id = ?1 AND date = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, date_str], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
          })?
          .collect::<rusqlite::Result<DayStatus>>()?;
        Ok(rows)
      })
      .await?;

    Ok(status)
  }

  async fn count_completed(&self, user_id: UserId, date: NaiveDate) -> Result<usize> {
    let date_str = encode_date(date);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM completions
           WHERE user_id = ?1 AND date = ?2 AND completed = 1",
          rusqlite::params![user_id, date_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    decode_count(n)
  }

  async fn weekly_counts(&self, user_id: UserId, reference: NaiveDate) -> Result<WeeklyCounts> {
    let (from, to) = week_window(reference);
    let from_str = encode_date(from);
    let to_str   = encode_date(to);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT task_id, COUNT(*)
           FROM completions
           WHERE user_id = ?1
             AND date BETWEEN ?2 AND ?3
             AND completed = 1
           GROUP BY task_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, from_str, to_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(task, n)| decode_count::<u32>(n).map(|n| (task, n)))
      .collect()
  }

  async fn prune_completions(&self, cutoff: NaiveDate) -> Result<usize> {
    let cutoff_str = encode_date(cutoff);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM completions WHERE date < ?1",
          rusqlite::params![cutoff_str],
        )?)
      })
      .await?;

    Ok(removed)
  }

  // ── Streaks ───────────────────────────────────────────────────────────────

  async fn get_streak(&self, user_id: UserId) -> Result<Option<StreakState>> {
    let raw: Option<RawStreak> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, current_streak, best_streak, last_completion_date
               FROM streaks WHERE user_id = ?1",
              rusqlite::params![user_id],
              read_streak,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStreak::into_state).transpose()
  }

  async fn recompute_streak(
    &self,
    user_id:  UserId,
    date:     NaiveDate,
    expected: usize,
  ) -> Result<(Option<StreakTransition>, StreakState)> {
    let date_str = encode_date(date);

    let result = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock up front so a second writer on the
        // same file cannot interleave between the read and the update.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let completed: i64 = tx.query_row(
          "SELECT COUNT(*) FROM completions
           WHERE user_id = ?1 AND date = ?2 AND completed = 1",
          rusqlite::params![user_id, date_str],
          |row| row.get(0),
        )?;
        let completed: usize = decode_count(completed).map_err(other)?;

        let raw = tx
          .query_row(
            "SELECT user_id, current_streak, best_streak, last_completion_date
             FROM streaks WHERE user_id = ?1",
            rusqlite::params![user_id],
            read_streak,
          )
          .optional()?;
        let existed = raw.is_some();
        let mut state = match raw {
          Some(raw) => raw.into_state().map_err(other)?,
          None => StreakState::new(user_id),
        };

        let transition = streak::recompute(&mut state, date, completed, expected);

        if transition.is_some() || !existed {
          tx.execute(
            "INSERT INTO streaks (user_id, current_streak, best_streak, last_completion_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id) DO UPDATE SET
               current_streak       = excluded.current_streak,
               best_streak          = excluded.best_streak,
               last_completion_date = excluded.last_completion_date",
            rusqlite::params![
              user_id,
              state.current,
              state.best,
              state.last_completion_date.map(encode_date),
            ],
          )?;
        }

        tx.commit()?;
        Ok((transition, state))
      })
      .await?;

    Ok(result)
  }
}
