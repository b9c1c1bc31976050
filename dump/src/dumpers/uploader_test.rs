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

use common_dal::DataAccessor;
use common_dal::DataAccessorRef;
use common_dal::Memory;
use common_exception::Result;
use pretty_assertions::assert_eq;

use crate::configs::Config;
use crate::contexts::DumpContext;
use crate::contexts::DumpContextRef;
use crate::dumpers::probe_writable;
use crate::dumpers::UploadWorker;

fn test_context(tmp_dir: &std::path::Path) -> DumpContextRef {
    DumpContext::create(
        Config::default(),
        tmp_dir.to_path_buf(),
        "tidump-host/2021-09-01".to_string(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_probe_writable() -> Result<()> {
    let memory = Arc::new(Memory::create());
    let accessor: DataAccessorRef = memory.clone();

    probe_writable(&accessor, "tidump-host/2021-09-01").await?;

    assert_eq!(
        memory.get("tidump-host/2021-09-01/metadata.json").await?,
        b"{}".to_vec()
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_upload_worker_uploads_then_deletes() -> Result<()> {
    let tmp = tempfile::tempdir().expect("create tempdir");
    let ctx = test_context(tmp.path());
    let memory = Arc::new(Memory::create());

    let local = tmp.path().join("db1.t1.0.sql.gz");
    std::fs::write(&local, b"compressed bytes")?;

    let (tx, rx) = async_channel::unbounded::<PathBuf>();
    tx.send(local.clone()).await.expect("queue open");
    drop(tx);

    let worker = UploadWorker::create(ctx.clone(), memory.clone());
    worker.run(rx).await?;

    assert_eq!(
        memory.get("tidump-host/2021-09-01/db1.t1.0.sql.gz").await?,
        b"compressed bytes".to_vec()
    );
    assert!(!local.exists());

    let values = ctx.progress.get_values();
    assert_eq!(values.files_copy_done, 1);
    assert_eq!(values.bytes_copied, b"compressed bytes".len() as u64);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_upload_worker_exits_when_queue_empty_and_closed() -> Result<()> {
    let tmp = tempfile::tempdir().expect("create tempdir");
    let ctx = test_context(tmp.path());

    let (tx, rx) = async_channel::unbounded::<PathBuf>();
    drop(tx);

    let worker = UploadWorker::create(ctx, Arc::new(Memory::create()));
    worker.run(rx).await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_upload_failure_aborts_the_run() -> Result<()> {
    let tmp = tempfile::tempdir().expect("create tempdir");
    let ctx = test_context(tmp.path());

    let (tx, rx) = async_channel::unbounded::<PathBuf>();
    tx.send(tmp.path().join("never-written.sql.gz"))
        .await
        .expect("queue open");
    drop(tx);

    let worker = UploadWorker::create(ctx.clone(), Arc::new(Memory::create()));
    let err = worker.run(rx).await.unwrap_err();

    assert_eq!(err.code(), 9);
    assert!(ctx.is_aborted());
    Ok(())
}
