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

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common_exception::Result;

use crate::contexts::DumpProgress;
use crate::contexts::TmpBudget;

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_budget_passes_when_under() -> Result<()> {
    let progress = Arc::new(DumpProgress::create());
    let aborted = Arc::new(AtomicBool::new(false));
    let budget = TmpBudget::create(1024, progress.clone(), aborted);

    assert_eq!(budget.free(), 1024);
    budget.await_capacity(1024).await?;

    progress.incr_bytes_written(1000);
    assert_eq!(budget.free(), 24);
    budget.await_capacity(24).await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_budget_blocks_until_uploads_free_space() -> Result<()> {
    let progress = Arc::new(DumpProgress::create());
    let aborted = Arc::new(AtomicBool::new(false));
    let budget = TmpBudget::create(1024, progress.clone(), aborted);

    progress.incr_bytes_written(1024);

    let unblocker = progress.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        unblocker.incr_bytes_copied(1024);
    });

    // Would spin forever if the upload above never landed.
    budget.await_capacity(512).await?;
    assert_eq!(budget.free(), 1024);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_budget_unwinds_on_abort() -> Result<()> {
    let progress = Arc::new(DumpProgress::create());
    let aborted = Arc::new(AtomicBool::new(false));
    let budget = TmpBudget::create(64, progress.clone(), aborted.clone());

    progress.incr_bytes_written(64);
    aborted.store(true, Ordering::Release);

    let err = budget.await_capacity(1).await.unwrap_err();
    assert!(err.is_aborted());
    Ok(())
}
