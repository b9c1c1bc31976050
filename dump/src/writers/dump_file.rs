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

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use flate2::write::GzEncoder;
use flate2::Compression;
use mysql_async::consts::ColumnType;
use mysql_async::prelude::Queryable;
use mysql_async::Transaction;

use crate::contexts::DumpContextRef;
use crate::dumpers::DumpTable;
use crate::planners::RangeSpec;
use crate::sessions::SnapshotSessionRef;
use crate::writers::render_value;
use crate::writers::InsertBuffer;

/// The SELECT one range translates to. A zero sentinel in either endpoint
/// becomes the tautology `1=1` so the chunk stays open on that side.
pub fn build_select(table: &DumpTable, range: &RangeSpec) -> String {
    let start_sql = if range.start == 0 {
        "1=1".to_string()
    } else {
        format!("{} > {}", table.primary_key, range.start)
    };
    let end_sql = if range.end == 0 {
        "1=1".to_string()
    } else {
        format!("{} < {}", table.primary_key, range.end)
    };
    format!(
        "SELECT LOW_PRIORITY {} FROM `{}`.`{}` WHERE {} AND {}",
        table.insertable_columns, table.schema, table.table, start_sql, end_sql
    )
}

/// One range being written: an open gzip stream over the output file plus
/// the in-memory INSERT buffer. A DumpFile is written by exactly one worker,
/// then closed and queued for upload, then uploaded and deleted.
pub struct DumpFile {
    ctx: DumpContextRef,
    table: String,
    select: String,
    path: PathBuf,
    encoder: Option<GzEncoder<File>>,
    buffer: Option<InsertBuffer>,
    written_observed: u64,
}

impl DumpFile {
    pub fn create(ctx: DumpContextRef, table: &DumpTable, range: &RangeSpec) -> Result<DumpFile> {
        let select = build_select(table, range);
        let path = ctx.tmp_dir.join(format!(
            "{}.{}.{}.sql.gz",
            table.schema, table.table, range.start
        ));
        let file = File::create(&path).map_err(|e| {
            ErrorCode::WriteFailure(format!("error in creating file {}: {}", path.display(), e))
        })?;
        Ok(DumpFile {
            ctx,
            table: table.table.clone(),
            select,
            path,
            encoder: Some(GzEncoder::new(file, Compression::default())),
            buffer: None,
            written_observed: 0,
        })
    }

    pub fn select(&self) -> &str {
        &self.select
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one rendered `(v1,v2,...)` tuple, rolling the INSERT statement
    /// over when the bulk insert limit would be exceeded.
    pub async fn push_row(&mut self, columns: &[String], values: &[u8]) -> Result<()> {
        if self.buffer.is_none() {
            let limit = self.ctx.cfg.bulk_insert_limit as usize;
            self.buffer = Some(InsertBuffer::create(&self.table, columns, limit));
        }
        let needs_flush = match &self.buffer {
            Some(buffer) => buffer.needs_flush(values.len()),
            None => false,
        };
        if needs_flush {
            self.flush().await?;
        }
        if let Some(buffer) = self.buffer.as_mut() {
            buffer.push(values);
        }
        Ok(())
    }

    /// Terminate the pending statement and move it into the gzip stream.
    /// The tmpdir budget gates the uncompressed payload before it is
    /// written; the compressed growth is observed afterwards by stat.
    async fn flush(&mut self) -> Result<()> {
        let statement = match self.buffer.as_mut() {
            Some(buffer) if !buffer.is_empty() => {
                buffer.terminate();
                buffer.take()
            }
            _ => return Ok(()),
        };

        self.ctx.budget.await_capacity(statement.len() as u64).await?;

        match self.encoder.as_mut() {
            Some(encoder) => encoder.write_all(&statement).map_err(|e| {
                ErrorCode::WriteFailure(format!(
                    "could not write to gz file {}: {}",
                    self.path.display(),
                    e
                ))
            })?,
            None => {
                return Err(ErrorCode::WriteFailure(format!(
                    "dump file {} is already closed",
                    self.path.display()
                )))
            }
        }

        self.ctx.progress.incr_bytes_dumped(statement.len() as u64);
        self.observe_written();
        Ok(())
    }

    /// Advance the compressed-byte counter by however much the file grew.
    fn observe_written(&mut self) {
        if let Ok(meta) = std::fs::metadata(&self.path) {
            let len = meta.len();
            let delta = len.saturating_sub(self.written_observed);
            if delta > 0 {
                self.ctx.progress.incr_bytes_written(delta);
                self.written_observed = len;
            }
        }
    }

    /// Flush the tail, close the gzip stream and the file, and reconcile the
    /// compressed counter with the exact on-disk size.
    pub async fn finish(mut self) -> Result<PathBuf> {
        self.flush().await?;
        if let Some(encoder) = self.encoder.take() {
            encoder.finish().map_err(|e| {
                ErrorCode::WriteFailure(format!(
                    "could not close gz file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        }
        self.observe_written();
        Ok(self.path)
    }
}

/// Stream the rows of one SELECT into the file. Returns false when a row
/// scan failed: the partial file is abandoned on disk (it can aid diagnosis)
/// and must not be uploaded.
async fn scan_rows(tx: &mut Transaction<'static>, file: &mut DumpFile) -> Result<bool> {
    let select = file.select().to_string();
    tracing::debug!("{}", select);

    let mut result = tx.query_iter(select).await.map_err(|e| {
        ErrorCode::QueryFailure(format!(
            "could not retrieve table data via {}: {}",
            file.select(),
            e
        ))
    })?;

    let mut column_names: Vec<String> = Vec::new();
    let mut column_types: Vec<ColumnType> = Vec::new();

    loop {
        let row = match result.next().await {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(
                    "failed to scan row for {}, abandoning the file: {}",
                    file.path().display(),
                    e
                );
                return Ok(false);
            }
        };

        if column_names.is_empty() {
            for column in row.columns_ref() {
                column_names.push(column.name_str().to_string());
                column_types.push(column.column_type());
            }
        }

        let mut values = Vec::with_capacity(64);
        values.push(b'(');
        for (i, column_type) in column_types.iter().enumerate() {
            if i > 0 {
                values.push(b',');
            }
            render_value(*column_type, row.as_ref(i), &mut values);
        }
        values.push(b')');

        file.push_row(&column_names, &values).await?;
    }

    Ok(true)
}

/// Dump one range work-item under a snapshot transaction. Returns the
/// finished file path, or None when the file was abandoned mid-scan.
pub async fn dump_range(
    ctx: DumpContextRef,
    session: &SnapshotSessionRef,
    table: &DumpTable,
    range: &RangeSpec,
) -> Result<Option<PathBuf>> {
    let mut file = DumpFile::create(ctx.clone(), table, range)?;

    let mut tx = session.acquire().await?;
    let scanned = scan_rows(&mut tx, &mut file).await;
    let released = session.release(tx).await;

    match scanned {
        Ok(true) => {
            released?;
            let path = file.finish().await?;
            ctx.progress.incr_files_dump_done();
            Ok(Some(path))
        }
        Ok(false) => Ok(None),
        Err(e) => Err(e),
    }
}
