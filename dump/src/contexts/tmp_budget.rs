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

use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;

use crate::contexts::DumpProgress;

const BACKOFF_INTERVAL: Duration = Duration::from_millis(500);

/// Bounds the on-disk footprint of the tmpdir. The bound is advisory: the
/// counters are read without a lock, so the floor may be exceeded briefly.
/// Writers stall here until the upload pool frees space.
pub struct TmpBudget {
    tmpdir_max: u64,
    progress: Arc<DumpProgress>,
    aborted: Arc<AtomicBool>,
}

impl TmpBudget {
    pub fn create(tmpdir_max: u64, progress: Arc<DumpProgress>, aborted: Arc<AtomicBool>) -> Self {
        TmpBudget {
            tmpdir_max,
            progress,
            aborted,
        }
    }

    /// Remaining slack, negative when the goal is currently exceeded.
    pub fn free(&self) -> i64 {
        self.tmpdir_max as i64 - self.progress.tmp_size() as i64
    }

    /// Block until `n_bytes` fit under the budget. Unwinds with Aborted when
    /// the run is being torn down, so a failed upload pool cannot leave
    /// writers stalled here forever.
    pub async fn await_capacity(&self, n_bytes: u64) -> Result<()> {
        loop {
            if self.aborted.load(Ordering::Acquire) {
                return Err(ErrorCode::Aborted("run aborted while waiting for tmpdir space"));
            }

            let free = self.free();
            if n_bytes as i64 <= free {
                tracing::debug!("free space: {}, requested: {}", free, n_bytes);
                return Ok(());
            }
            tokio::time::sleep(BACKOFF_INTERVAL).await;
        }
    }
}
