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

use common_exception::Result;
use common_tracing::tracing;
use mysql_async::prelude::Queryable;

use crate::catalogs::TableSpec;
use crate::sessions::SnapshotSessionRef;

/// A primary-key interval assigned to one dump worker. The key domain is a
/// positive integer, so zero marks an unbounded endpoint: the first and last
/// chunks stay open because other backends may assign ids outside the
/// observed MIN/MAX between the two discovery queries.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeSpec {
    pub start: i64,
    pub end: i64,
}

impl RangeSpec {
    pub fn whole_table() -> Self {
        RangeSpec { start: 0, end: 0 }
    }
}

/// How many rows one file should hold, from the advisory row length.
pub fn rows_per_file(file_target_size: u64, avg_row_length: u64) -> i64 {
    let avg = if avg_row_length == 0 { 100 } else { avg_row_length };
    // A row longer than the whole file target would yield a zero step and a
    // planner that never advances.
    ((file_target_size / avg) as i64).max(1)
}

/// Chunk-split [min, max] into steps of `rows_per_file`, with the zero
/// sentinels on the open first and last endpoints.
pub fn plan_ranges(min: i64, max: i64, rows_per_file: i64) -> Vec<RangeSpec> {
    let step = rows_per_file.max(1);
    let mut ranges = Vec::new();

    let mut i = min;
    while i < max {
        let start = if i == min { 0 } else { i };
        let mut end = i + step - 1;
        if end > max {
            end = 0;
        }
        ranges.push(RangeSpec { start, end });
        i += step;
    }

    ranges
}

/// Splits a table into range work-items sized by the file target.
pub struct RangePlanner {
    session: SnapshotSessionRef,
    file_target_size: u64,
}

impl RangePlanner {
    pub fn create(session: SnapshotSessionRef, file_target_size: u64) -> Self {
        RangePlanner {
            session,
            file_target_size,
        }
    }

    /// Plan the files for one table. Small tables become a single
    /// whole-table range; empty tables produce no ranges at all (the schema
    /// file is still dumped by the caller).
    pub async fn plan(&self, table: &TableSpec, primary_key: &str) -> Result<Vec<RangeSpec>> {
        if table.data_length == 0 {
            return Ok(Vec::new());
        }
        if table.data_length < self.file_target_size {
            return Ok(vec![RangeSpec::whole_table()]);
        }

        let per_file = rows_per_file(self.file_target_size, table.avg_row_length);
        let (min, max) = self.table_min_max(table, primary_key).await;
        Ok(plan_ranges(min, max, per_file))
    }

    /// MIN/MAX of the chosen primary key under a fresh snapshot transaction.
    /// Failures degrade to an empty table rather than failing the run.
    async fn table_min_max(&self, table: &TableSpec, primary_key: &str) -> (i64, i64) {
        let query = format!(
            "SELECT MIN({}) as min, MAX({}) max FROM `{}`.`{}`",
            primary_key, primary_key, table.schema, table.table
        );
        tracing::debug!("{}", query);

        let mut tx = match self.session.acquire().await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!(
                    "could not plan ranges for {}.{}, treating as empty: {}",
                    table.schema,
                    table.table,
                    e
                );
                return (0, 0);
            }
        };

        let row: std::result::Result<Option<(Option<i64>, Option<i64>)>, _> =
            tx.query_first(query).await;
        if let Err(e) = self.session.release(tx).await {
            tracing::warn!("releasing planner transaction: {}", e);
        }

        match row {
            Ok(Some((Some(min), Some(max)))) => (min, max),
            Ok(_) => (0, 0),
            Err(e) => {
                tracing::warn!(
                    "MIN/MAX of {}.{} failed, treating as empty: {}",
                    table.schema,
                    table.table,
                    e
                );
                (0, 0)
            }
        }
    }
}
