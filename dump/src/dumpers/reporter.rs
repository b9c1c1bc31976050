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

use std::time::Duration;

use common_tracing::tracing;
use tokio::task::JoinHandle;

use crate::contexts::DumpContext;
use crate::contexts::DumpContextRef;

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Periodic progress emission from the shared counters.
pub struct Reporter;

impl Reporter {
    pub fn start(ctx: DumpContextRef) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REPORT_INTERVAL);
            loop {
                interval.tick().await;
                Self::report(&ctx);
            }
        })
    }

    /// One status snapshot; also used for the final line at shutdown.
    pub fn report(ctx: &DumpContext) {
        let values = ctx.progress.get_values();
        let tmp_size = values.bytes_written.saturating_sub(values.bytes_copied);

        tracing::info!(
            "TotalFiles: {}, FilesDumpCompleted: {}, FilesCopyCompleted: {}",
            values.files_total,
            values.files_dump_done,
            values.files_copy_done
        );
        tracing::info!(
            "BytesDumped: {}, BytesWritten: {}, Copied (success): {}, TmpSize: {}",
            values.bytes_dumped,
            values.bytes_written,
            values.bytes_copied,
            tmp_size
        );

        let free = ctx.budget.free();
        if free < ctx.cfg.file_target_size as i64 {
            tracing::warn!("Low free space: {} bytes", free);
        }
    }
}
