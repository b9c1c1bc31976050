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
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::configs::Config;
use crate::contexts::DumpProgress;
use crate::contexts::TmpBudget;

pub type DumpContextRef = Arc<DumpContext>;

/// The immutable slice of run state that workers need: config, counters,
/// tmpdir budget and the abort flag. Workers hold this instead of a
/// back-reference to the coordinator.
pub struct DumpContext {
    pub cfg: Config,
    pub tmp_dir: PathBuf,
    pub prefix: String,
    pub progress: Arc<DumpProgress>,
    pub budget: TmpBudget,
    aborted: Arc<AtomicBool>,
}

impl DumpContext {
    pub fn create(cfg: Config, tmp_dir: PathBuf, prefix: String) -> DumpContextRef {
        let progress = Arc::new(DumpProgress::create());
        let aborted = Arc::new(AtomicBool::new(false));
        let budget = TmpBudget::create(cfg.tmpdir_max, progress.clone(), aborted.clone());
        Arc::new(DumpContext {
            cfg,
            tmp_dir,
            prefix,
            progress,
            budget,
            aborted,
        })
    }

    /// Ask every worker pool to unwind at the next suspension point.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}
