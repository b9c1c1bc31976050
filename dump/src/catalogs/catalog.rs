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

use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use mysql_async::prelude::Queryable;

use crate::sessions::SnapshotSessionRef;

/// Everything the planner and the writers need to know about one table.
/// Produced once by the catalog query, read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSpec {
    pub schema: String,
    pub table: String,
    /// Advisory, already normalized to 100 when the server reports 0.
    pub avg_row_length: u64,
    pub data_length: u64,
    /// The declared PRIMARY KEY column, or `_tidb_rowid` when there is none.
    pub likely_primary_key: String,
    /// Ordered, comma-joined column names, generated columns excluded.
    pub insertable_columns: String,
}

/// Enumerates user tables from information_schema.
///
/// The server does not reliably expose which primary-key form a table has,
/// so the catalog row only carries a guess; `discover_primary_key` settles
/// it with a probe query per table.
pub struct Catalog {
    session: SnapshotSessionRef,
}

impl Catalog {
    pub fn create(session: SnapshotSessionRef) -> Self {
        Catalog { session }
    }

    pub fn all_tables_query(regex: &str) -> String {
        let mut sql = String::from(
            "SELECT
 t.table_schema,
 t.table_name,
 if(AVG_ROW_LENGTH=0,100,AVG_ROW_LENGTH) as avg_row_length,
 t.data_length,
 IFNULL(pk.likely_primary_key,'_tidb_rowid'),
 c.insertable
FROM
 INFORMATION_SCHEMA.TABLES t
LEFT JOIN
 (SELECT table_schema, table_name, column_name as likely_primary_key FROM information_schema.key_column_usage WHERE constraint_name='PRIMARY' AND TABLE_SCHEMA NOT IN ('mysql', 'INFORMATION_SCHEMA', 'PERFORMANCE_SCHEMA') ) pk
 ON t.table_schema = pk.table_schema AND t.table_name=pk.table_name
LEFT JOIN
 (SELECT table_schema, table_name, GROUP_CONCAT(COLUMN_NAME) as insertable FROM information_schema.COLUMNS WHERE extra NOT LIKE '%GENERATED%' AND TABLE_SCHEMA NOT IN ('mysql', 'INFORMATION_SCHEMA', 'PERFORMANCE_SCHEMA') GROUP BY table_schema, table_name) c
 ON t.table_schema = c.table_schema AND t.table_name=c.table_name
WHERE
 t.TABLE_SCHEMA NOT IN ('mysql', 'INFORMATION_SCHEMA', 'PERFORMANCE_SCHEMA')",
        );

        if !regex.is_empty() {
            sql.push_str(&format!(
                " AND concat(t.table_schema, '.', t.table_name) RLIKE '{}'",
                regex
            ));
        }

        sql
    }

    /// One query over information_schema. Any failure here is fatal for the
    /// run: without the table list there is nothing to dump.
    pub async fn all_tables(&self, regex: &str) -> Result<Vec<TableSpec>> {
        let mut tx = self.session.acquire().await?;

        // The insertable column list is built with GROUP_CONCAT, whose
        // default limit truncates wide tables.
        tx.query_drop("SET group_concat_max_len = 1024 * 1024")
            .await
            .map_err(|e| ErrorCode::CatalogFailure(format!("{}", e)))?;

        let query = Self::all_tables_query(regex);
        tracing::debug!("{}", query);

        let rows: Vec<(String, String, u64, u64, String, Option<String>)> = tx
            .query(query)
            .await
            .map_err(|e| {
                ErrorCode::CatalogFailure(format!(
                    "could not read tables from information_schema: {}",
                    e
                ))
            })?;
        self.session.release(tx).await?;

        Ok(rows
            .into_iter()
            .map(
                |(schema, table, avg_row_length, data_length, likely_primary_key, insertable)| {
                    TableSpec {
                        schema,
                        table,
                        avg_row_length,
                        data_length,
                        likely_primary_key,
                        insertable_columns: insertable.unwrap_or_default(),
                    }
                },
            )
            .collect())
    }

    /// Probe for the internal row identifier. Tables without a declared
    /// PRIMARY KEY expose `_tidb_rowid`; when the probe fails the declared
    /// key from the catalog row is used instead.
    pub async fn discover_primary_key(&self, spec: &TableSpec) -> Result<String> {
        let query = format!(
            "SELECT _tidb_rowid FROM {}.{} LIMIT 1",
            spec.schema, spec.table
        );
        tracing::debug!("{}", query);

        let mut tx = self.session.acquire().await?;
        let primary_key = match tx.query_drop(query).await {
            Ok(()) => "_tidb_rowid".to_string(),
            Err(_) => spec.likely_primary_key.clone(),
        };
        self.session.release(tx).await?;

        Ok(primary_key)
    }
}
