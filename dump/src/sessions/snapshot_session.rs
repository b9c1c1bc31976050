// Copyright 2021 Datafuse Labs.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;
use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use mysql_async::prelude::Queryable;
use mysql_async::Pool;
use mysql_async::Row;
use mysql_async::Transaction;
use mysql_async::TxOpts;

pub type SnapshotSessionRef = Arc<SnapshotSession>;

/// Pins every read connection to one logical timestamp.
///
/// Pool-returned connections do not carry session state, so the snapshot
/// variable is set inside a transaction on every borrow; the transaction
/// keeps the subsequent query on the same physical connection.
pub struct SnapshotSession {
    pool: Pool,
    token: String,
}

impl SnapshotSession {
    /// Resolve the snapshot token and wrap the pool. A user-supplied token
    /// wins; otherwise the server is asked for its current logical timestamp.
    pub async fn create(pool: Pool, configured_snapshot: &str) -> Result<SnapshotSessionRef> {
        let token = if configured_snapshot.is_empty() {
            Self::current_snapshot(&pool).await?
        } else {
            configured_snapshot.to_string()
        };
        tracing::info!("dumping with tidb_snapshot = '{}'", token);
        Ok(Arc::new(SnapshotSession { pool, token }))
    }

    /// The server reports its current logical timestamp in the second column
    /// of SHOW MASTER STATUS.
    async fn current_snapshot(pool: &Pool) -> Result<String> {
        let mut conn = pool.get_conn().await.map_err(|e| {
            ErrorCode::ConnectionError(format!(
                "could not connect to the server, check --mysql-connection: {}",
                e
            ))
        })?;
        let row: Option<Row> = conn
            .query_first("SHOW MASTER STATUS")
            .await
            .map_err(|e| ErrorCode::SnapshotUnavailable(format!("SHOW MASTER STATUS: {}", e)))?;
        let row = row.ok_or_else(|| {
            ErrorCode::SnapshotUnavailable("SHOW MASTER STATUS returned no rows")
        })?;
        match row.get_opt::<String, usize>(1) {
            Some(Ok(token)) => Ok(token),
            _ => Err(ErrorCode::SnapshotUnavailable(
                "SHOW MASTER STATUS did not return a snapshot token",
            )),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn hostname(&self) -> Result<String> {
        let mut conn = self.pool.get_conn().await?;
        let hostname: Option<String> = conn.query_first("SELECT @@hostname").await?;
        hostname.ok_or_else(|| ErrorCode::ConnectionError("server did not report @@hostname"))
    }

    /// Begin a transaction pinned to the run's snapshot. A rejected snapshot
    /// variable is logged and the read proceeds with the session default.
    pub async fn acquire(&self) -> Result<Transaction<'static>> {
        let mut tx = self
            .pool
            .start_transaction(TxOpts::default())
            .await
            .map_err(|e| {
                ErrorCode::ConnectionError(format!("could not begin a snapshot transaction: {}", e))
            })?;
        let set = format!(
            "SET tidb_snapshot = '{}', tidb_force_priority = 'low_priority'",
            self.token
        );
        if let Err(e) = tx.query_drop(set).await {
            tracing::warn!("could not set tidb_snapshot, this read may not be consistent: {}", e);
        }
        Ok(tx)
    }

    /// Commit to hand the connection back to the pool.
    pub async fn release(&self, tx: Transaction<'static>) -> Result<()> {
        tx.commit()
            .await
            .map_err(|e| ErrorCode::ConnectionError(format!("commit: {}", e)))?;
        Ok(())
    }
}

/// Derive the UTC date (YYYY-MM-DD) a snapshot token points at, for the
/// upload prefix. Numeric tokens are TSOs whose upper bits hold a physical
/// millisecond timestamp; anything else must parse as a MySQL datetime.
pub fn snapshot_date(token: &str) -> Result<String> {
    if let Ok(tso) = token.trim().parse::<u64>() {
        let millis = (tso >> 18) as i64;
        let date = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| {
                ErrorCode::BadArguments(format!("tidb_snapshot '{}' is out of range", token))
            })?;
        return Ok(date.format("%Y-%m-%d").to_string());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(token, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(datetime.format("%Y-%m-%d").to_string());
    }
    Err(ErrorCode::BadArguments(format!(
        "cannot derive a date from tidb_snapshot '{}'",
        token
    )))
}
