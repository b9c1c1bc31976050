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

use std::path::PathBuf;

use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use mysql_async::prelude::Queryable;

use crate::contexts::DumpContextRef;
use crate::dumpers::DumpTable;
use crate::sessions::SnapshotSessionRef;

/// Emits one DDL file per table: the server's CREATE statement plus a
/// trailing semicolon-newline, uncompressed.
pub struct SchemaDumper {
    ctx: DumpContextRef,
    session: SnapshotSessionRef,
}

impl SchemaDumper {
    pub fn create(ctx: DumpContextRef, session: SnapshotSessionRef) -> Self {
        SchemaDumper { ctx, session }
    }

    pub async fn dump(&self, table: &DumpTable) -> Result<PathBuf> {
        let query = format!("SHOW CREATE TABLE `{}`.`{}`", table.schema, table.table);
        tracing::debug!("{}", query);

        let mut tx = self.session.acquire().await?;
        let row: Option<(String, String)> = tx.query_first(query).await.map_err(|e| {
            ErrorCode::QueryFailure(format!(
                "could not SHOW CREATE TABLE for {}.{}: {}",
                table.schema, table.table, e
            ))
        })?;
        self.session.release(tx).await?;

        let (_name, mut ddl) = row.ok_or_else(|| {
            ErrorCode::QueryFailure(format!(
                "SHOW CREATE TABLE returned nothing for {}.{}",
                table.schema, table.table
            ))
        })?;
        ddl.push_str(";\n");

        self.ctx.budget.await_capacity(ddl.len() as u64).await?;

        let path = self
            .ctx
            .tmp_dir
            .join(format!("{}.{}-schema.sql", table.schema, table.table));
        std::fs::write(&path, ddl.as_bytes()).map_err(|e| {
            ErrorCode::WriteFailure(format!(
                "could not create temporary file {}: {}",
                path.display(),
                e
            ))
        })?;

        // The DDL file is stored uncompressed, so it counts equally as
        // dumped and written bytes.
        self.ctx.progress.incr_bytes_dumped(ddl.len() as u64);
        self.ctx.progress.incr_bytes_written(ddl.len() as u64);
        self.ctx.progress.incr_files_dump_done();

        Ok(path)
    }
}
