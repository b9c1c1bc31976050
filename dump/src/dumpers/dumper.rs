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
use std::sync::Arc;

use common_dal::DataAccessorRef;
use common_dal::S3;
use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use mysql_async::Opts;
use mysql_async::OptsBuilder;
use mysql_async::Pool;
use mysql_async::PoolConstraints;
use mysql_async::PoolOpts;
use rusoto_core::Region;

use crate::catalogs::Catalog;
use crate::configs::Config;
use crate::contexts::DumpContext;
use crate::contexts::DumpContextRef;
use crate::dumpers::probe_writable;
use crate::dumpers::DumpJob;
use crate::dumpers::DumpTable;
use crate::dumpers::DumpWorker;
use crate::dumpers::Reporter;
use crate::dumpers::UploadWorker;
use crate::planners::RangePlanner;
use crate::sessions::snapshot_date;
use crate::sessions::SnapshotSession;
use crate::sessions::SnapshotSessionRef;

const DUMP_WORKERS: usize = 16;

/// Owns the run: pools, queues and termination.
///
/// Lifecycle is init, enumerate, dump, upload, shutdown. Enumeration fully
/// populates the dump queue before the dump pool starts, the upload queue's
/// only senders are the dump workers, and upload workers exit when that
/// queue reports empty-and-closed. On success the tmpdir is removed; on a
/// fatal error it is left behind so partial files can aid diagnosis.
pub struct Dumper {
    cfg: Config,
}

impl Dumper {
    pub fn create(cfg: Config) -> Self {
        Dumper { cfg }
    }

    pub async fn dump(&self) -> Result<()> {
        // Init: pool, snapshot token, upload prefix, tmpdir, object store.
        let pool = self.connect_pool()?;
        let session = SnapshotSession::create(pool.clone(), &self.cfg.tidb_snapshot).await?;

        let prefix = self.resolve_prefix(&session).await?;
        tracing::info!("Uploading to {}/{}", self.cfg.s3_bucket, prefix);

        let tmp_dir = tempfile::Builder::new()
            .prefix("tidump")
            .tempdir()
            .map_err(|e| ErrorCode::WriteFailure(format!("could not create tempdir: {}", e)))?
            .into_path();
        tracing::info!("Writing temporary files to: {}", tmp_dir.display());

        let region: Region = self.cfg.s3_region.parse().map_err(|e| {
            ErrorCode::BadArguments(format!("invalid --s3-region {}: {:?}", self.cfg.s3_region, e))
        })?;
        let accessor: DataAccessorRef = Arc::new(S3::new(region, self.cfg.s3_bucket.clone()));

        let ctx = DumpContext::create(self.cfg.clone(), tmp_dir, prefix);

        // Fail before touching any user table if uploads cannot land.
        probe_writable(&accessor, &ctx.prefix).await?;

        let reporter = Reporter::start(ctx.clone());
        self.dump_users();

        let result = self.run_pipeline(&ctx, &session, &accessor).await;
        reporter.abort();

        match result {
            Ok(()) => {
                std::fs::remove_dir_all(&ctx.tmp_dir).map_err(|e| {
                    ErrorCode::WriteFailure(format!(
                        "could not remove tempdir {}: {}",
                        ctx.tmp_dir.display(),
                        e
                    ))
                })?;
                pool.disconnect()
                    .await
                    .map_err(|e| ErrorCode::ConnectionError(format!("{}", e)))?;
                Reporter::report(&ctx);
                Ok(())
            }
            Err(e) => {
                // tmpdir intentionally left behind
                Reporter::report(&ctx);
                Err(e)
            }
        }
    }

    /// Enumerate, then drain the dump and upload pools.
    async fn run_pipeline(
        &self,
        ctx: &DumpContextRef,
        session: &SnapshotSessionRef,
        accessor: &DataAccessorRef,
    ) -> Result<()> {
        let (job_tx, job_rx) = async_channel::unbounded();
        let (upload_tx, upload_rx) = async_channel::unbounded::<PathBuf>();

        // Enumeration completes before the dump phase begins, so the
        // planner's MIN/MAX reads never race with queue consumers.
        self.enumerate(ctx, session, &job_tx).await?;
        job_tx.close();

        let mut dump_handles = Vec::with_capacity(DUMP_WORKERS);
        for _ in 0..DUMP_WORKERS {
            let worker = DumpWorker::create(ctx.clone(), session.clone());
            dump_handles.push(tokio::spawn(worker.run(job_rx.clone(), upload_tx.clone())));
        }
        drop(job_rx);
        // After this, the upload queue's only senders live in dump workers:
        // it closes exactly when the dump pool has drained.
        drop(upload_tx);

        let mut upload_handles = Vec::with_capacity(self.cfg.s3_pool_size);
        for _ in 0..self.cfg.s3_pool_size {
            let worker = UploadWorker::create(ctx.clone(), accessor.clone());
            upload_handles.push(tokio::spawn(worker.run(upload_rx.clone())));
        }
        drop(upload_rx);

        let mut first_error: Option<ErrorCode> = None;
        for handle in dump_handles.into_iter().chain(upload_handles) {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => Self::record_error(&mut first_error, e),
                Err(e) => Self::record_error(
                    &mut first_error,
                    ErrorCode::TokioError(format!("worker panicked: {}", e)),
                ),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Keep the root cause: a real failure beats the Aborted errors it
    /// causes in sibling workers.
    fn record_error(slot: &mut Option<ErrorCode>, e: ErrorCode) {
        match slot {
            Some(existing) if existing.is_aborted() && !e.is_aborted() => *slot = Some(e),
            None => *slot = Some(e),
            _ => {}
        }
    }

    /// Plan per-table work from catalog metadata and enqueue all of it.
    async fn enumerate(
        &self,
        ctx: &DumpContextRef,
        session: &SnapshotSessionRef,
        jobs: &async_channel::Sender<DumpJob>,
    ) -> Result<()> {
        let catalog = Catalog::create(session.clone());
        let planner = RangePlanner::create(session.clone(), self.cfg.file_target_size);

        let tables = catalog.all_tables(&self.cfg.mysql_regex).await?;
        tracing::info!("enumerated {} tables", tables.len());

        for spec in tables {
            let primary_key = catalog.discover_primary_key(&spec).await?;
            let ranges = planner.plan(&spec, &primary_key).await?;
            let table = Arc::new(DumpTable::create(&spec, primary_key));

            jobs.send(DumpJob::Schema(table.clone()))
                .await
                .map_err(|_| ErrorCode::TokioError("dump queue closed during enumeration"))?;
            ctx.progress.incr_files_total(1);

            for range in ranges {
                tracing::debug!(
                    "table: {}.{}, start: {}, end: {}",
                    spec.schema,
                    spec.table,
                    range.start,
                    range.end
                );
                jobs.send(DumpJob::Range {
                    table: table.clone(),
                    range,
                })
                .await
                .map_err(|_| ErrorCode::TokioError("dump queue closed during enumeration"))?;
                ctx.progress.incr_files_total(1);
            }
        }

        Ok(())
    }

    fn connect_pool(&self) -> Result<Pool> {
        let opts = Opts::from_url(&self.cfg.mysql_connection).map_err(|e| {
            ErrorCode::BadArguments(format!(
                "invalid --mysql-connection {}: {}",
                self.cfg.mysql_connection, e
            ))
        })?;
        let constraints =
            PoolConstraints::new(1, self.cfg.mysql_pool_size).ok_or_else(|| {
                ErrorCode::BadArguments("--mysql-pool-size must be at least 1")
            })?;
        let opts = OptsBuilder::from_opts(opts)
            .pool_opts(PoolOpts::default().with_constraints(constraints));
        Ok(Pool::new(opts))
    }

    /// `tidump-<hostname>/<snapshot-date>` unless the user chose a prefix.
    async fn resolve_prefix(&self, session: &SnapshotSessionRef) -> Result<String> {
        if !self.cfg.s3_bucket_prefix.is_empty() {
            return Ok(self.cfg.s3_bucket_prefix.clone());
        }
        let hostname = session.hostname().await?;
        let date = snapshot_date(session.token())?;
        Ok(format!("tidump-{}/{}", hostname, date))
    }

    /// Grant export is blocked on server-side SHOW CREATE USER support.
    fn dump_users(&self) {
        tracing::debug!("user grants are not exported yet");
    }
}
