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

use crate::contexts::DumpContextRef;
use crate::dumpers::DumpJob;
use crate::dumpers::DumpTable;
use crate::planners::RangeSpec;
use crate::sessions::SnapshotSessionRef;
use crate::writers::dump_range;
use crate::writers::SchemaDumper;

/// Drains the dump queue: schema jobs become DDL files, range jobs become
/// gzip data files. Every finished file is pushed onto the upload queue
/// exactly once. Holds at most one pooled connection at a time.
pub struct DumpWorker {
    ctx: DumpContextRef,
    session: SnapshotSessionRef,
}

impl DumpWorker {
    pub fn create(ctx: DumpContextRef, session: SnapshotSessionRef) -> Self {
        DumpWorker { ctx, session }
    }

    pub async fn run(
        self,
        jobs: async_channel::Receiver<DumpJob>,
        uploads: async_channel::Sender<PathBuf>,
    ) -> Result<()> {
        let schema_dumper = SchemaDumper::create(self.ctx.clone(), self.session.clone());

        loop {
            let job = match jobs.recv().await {
                Ok(job) => job,
                Err(_) => return Ok(()),
            };
            if self.ctx.is_aborted() {
                return Err(ErrorCode::Aborted("dump worker unwinding"));
            }

            let outcome = match job {
                DumpJob::Schema(table) => {
                    self.run_schema_job(&schema_dumper, &table, &uploads).await
                }
                DumpJob::Range { table, range } => {
                    self.run_range_job(&table, &range, &uploads).await
                }
            };
            if let Err(e) = outcome {
                self.ctx.abort();
                return Err(e);
            }
        }
    }

    async fn run_schema_job(
        &self,
        schema_dumper: &SchemaDumper,
        table: &DumpTable,
        uploads: &async_channel::Sender<PathBuf>,
    ) -> Result<()> {
        let path = schema_dumper.dump(table).await?;
        uploads
            .send(path)
            .await
            .map_err(|_| ErrorCode::Aborted("upload queue closed"))?;
        Ok(())
    }

    async fn run_range_job(
        &self,
        table: &DumpTable,
        range: &RangeSpec,
        uploads: &async_channel::Sender<PathBuf>,
    ) -> Result<()> {
        // None means the file was abandoned mid-scan; it stays on disk and
        // is never enqueued for upload.
        if let Some(path) = dump_range(self.ctx.clone(), &self.session, table, range).await? {
            uploads
                .send(path)
                .await
                .map_err(|_| ErrorCode::Aborted("upload queue closed"))?;
        }
        Ok(())
    }
}
