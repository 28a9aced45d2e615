use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, Round};
use sqlx::{Row, SqlitePool};

use crate::error::StoreError;
use crate::traits::{ChainStore, Cursor};

fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// SQL backend implementing the abstract schema of spec §6: one
/// `beacons(id,name)` row per beacon and one `beacon_details` row per
/// round. Cursor positioning is done by counting rounds below a target
/// rather than a window-function rank, per spec §4.2.
pub struct SqliteStore {
    pool: SqlitePool,
    beacon_row_id: i64,
}

impl SqliteStore {
    pub async fn connect(url: &str, beacon_name: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(url).await.map_err(backend_err)?;
        Self::with_pool(pool, beacon_name).await
    }

    pub async fn with_pool(pool: SqlitePool, beacon_name: &str) -> Result<Self, StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS beacons (id INTEGER PRIMARY KEY, name TEXT UNIQUE NOT NULL)",
        )
        .execute(&pool)
        .await
        .map_err(backend_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS beacon_details (
                beacon_id INTEGER NOT NULL,
                round INTEGER NOT NULL,
                previous_sig BLOB NOT NULL,
                signature BLOB NOT NULL,
                PRIMARY KEY (beacon_id, round)
            )",
        )
        .execute(&pool)
        .await
        .map_err(backend_err)?;

        sqlx::query("INSERT OR IGNORE INTO beacons (name) VALUES (?)")
            .bind(beacon_name)
            .execute(&pool)
            .await
            .map_err(backend_err)?;

        let row = sqlx::query("SELECT id FROM beacons WHERE name = ?")
            .bind(beacon_name)
            .fetch_one(&pool)
            .await
            .map_err(backend_err)?;
        let beacon_row_id: i64 = row.try_get("id").map_err(backend_err)?;

        Ok(SqliteStore {
            pool,
            beacon_row_id,
        })
    }

    async fn fetch_at_offset(&self, offset: i64) -> Result<BeaconRecord, sqlx::Error> {
        let row = sqlx::query(
            "SELECT round, previous_sig, signature FROM beacon_details
             WHERE beacon_id = ? ORDER BY round LIMIT 1 OFFSET ?",
        )
        .bind(self.beacon_row_id)
        .bind(offset)
        .fetch_one(&self.pool)
        .await?;
        row_to_record(row)
    }

    async fn count_below(&self, target: u64) -> Result<i64, sqlx::Error> {
        let round = target as i64;
        let row = sqlx::query(
            "SELECT COUNT(*) as c FROM beacon_details WHERE beacon_id = ? AND round < ?",
        )
        .bind(self.beacon_row_id)
        .bind(round)
        .fetch_one(&self.pool)
        .await?;
        row.try_get("c")
    }
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<BeaconRecord, sqlx::Error> {
    let round: i64 = row.try_get("round")?;
    let previous_signature: Vec<u8> = row.try_get("previous_sig")?;
    let signature: Vec<u8> = row.try_get("signature")?;
    Ok(BeaconRecord {
        round: Round(round as u64),
        previous_signature,
        signature,
    })
}

#[async_trait]
impl ChainStore for SqliteStore {
    async fn put(&self, record: BeaconRecord) -> Result<(), StoreError> {
        let existing = sqlx::query(
            "SELECT previous_sig, signature FROM beacon_details WHERE beacon_id = ? AND round = ?",
        )
        .bind(self.beacon_row_id)
        .bind(record.round.0 as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        if let Some(row) = existing {
            let prev: Vec<u8> = row.try_get("previous_sig").map_err(backend_err)?;
            let sig: Vec<u8> = row.try_get("signature").map_err(backend_err)?;
            return if prev == record.previous_signature && sig == record.signature {
                Ok(())
            } else {
                Err(StoreError::RoundOccupied {
                    round: record.round,
                })
            };
        }

        sqlx::query(
            "INSERT INTO beacon_details (beacon_id, round, previous_sig, signature)
             VALUES (?, ?, ?, ?)",
        )
        .bind(self.beacon_row_id)
        .bind(record.round.0 as i64)
        .bind(&record.previous_signature)
        .bind(&record.signature)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn get(&self, round: Round) -> Result<BeaconRecord, StoreError> {
        let row = sqlx::query(
            "SELECT round, previous_sig, signature FROM beacon_details
             WHERE beacon_id = ? AND round = ?",
        )
        .bind(self.beacon_row_id)
        .bind(round.0 as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?
        .ok_or(StoreError::NotFound(round))?;
        row_to_record(row).map_err(backend_err)
    }

    async fn last(&self) -> Result<BeaconRecord, StoreError> {
        let row = sqlx::query(
            "SELECT round, previous_sig, signature FROM beacon_details
             WHERE beacon_id = ? ORDER BY round DESC LIMIT 1",
        )
        .bind(self.beacon_row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?
        .ok_or(StoreError::Empty)?;
        row_to_record(row).map_err(backend_err)
    }

    async fn len(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as c FROM beacon_details WHERE beacon_id = ?")
            .bind(self.beacon_row_id)
            .fetch_one(&self.pool)
            .await
            .map_err(backend_err)?;
        let c: i64 = row.try_get("c").map_err(backend_err)?;
        Ok(c as u64)
    }

    async fn del(&self, round: Round) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM beacon_details WHERE beacon_id = ? AND round = ?")
            .bind(self.beacon_row_id)
            .bind(round.0 as i64)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            Err(StoreError::NotFound(round))
        } else {
            Ok(())
        }
    }

    async fn cursor(&self) -> Box<dyn Cursor + '_> {
        Box::new(SqliteCursor {
            store: self,
            offset: None,
        })
    }
}

struct SqliteCursor<'a> {
    store: &'a SqliteStore,
    offset: Option<i64>,
}

#[async_trait]
impl Cursor for SqliteCursor<'_> {
    async fn first(&mut self) -> Result<BeaconRecord, StoreError> {
        let record = self.store.fetch_at_offset(0).await.map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::Empty,
            other => backend_err(other),
        })?;
        self.offset = Some(0);
        Ok(record)
    }

    async fn next(&mut self) -> Result<BeaconRecord, StoreError> {
        let offset = self.offset.map(|o| o + 1).unwrap_or(0);
        let record = self.store.fetch_at_offset(offset).await.map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(Round(0)),
            other => backend_err(other),
        })?;
        self.offset = Some(offset);
        Ok(record)
    }

    async fn seek(&mut self, target: Round) -> Result<BeaconRecord, StoreError> {
        let offset = self.store.count_below(target.0).await.map_err(backend_err)?;
        let record = self.store.fetch_at_offset(offset).await.map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(target),
            other => backend_err(other),
        })?;
        self.offset = Some(offset);
        Ok(record)
    }

    async fn last(&mut self) -> Result<BeaconRecord, StoreError> {
        let total = self.store.len().await?;
        if total == 0 {
            return Err(StoreError::Empty);
        }
        let offset = total as i64 - 1;
        let record = self.store.fetch_at_offset(offset).await.map_err(backend_err)?;
        self.offset = Some(offset);
        Ok(record)
    }
}
