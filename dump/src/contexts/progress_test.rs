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
use pretty_assertions::assert_eq;

use crate::contexts::DumpProgress;

#[test]
fn test_progress_counters() -> Result<()> {
    let progress = DumpProgress::create();

    progress.incr_files_total(3);
    progress.incr_bytes_dumped(1000);
    progress.incr_bytes_written(300);
    progress.incr_files_dump_done();
    progress.incr_bytes_copied(120);
    progress.incr_files_copy_done();

    let values = progress.get_values();
    assert_eq!(values.bytes_dumped, 1000);
    assert_eq!(values.bytes_written, 300);
    assert_eq!(values.bytes_copied, 120);
    assert_eq!(values.files_total, 3);
    assert_eq!(values.files_dump_done, 1);
    assert_eq!(values.files_copy_done, 1);

    assert!(values.bytes_copied <= values.bytes_written);
    assert!(values.files_copy_done <= values.files_dump_done);
    assert!(values.files_dump_done <= values.files_total);

    assert_eq!(progress.tmp_size(), 180);
    Ok(())
}

#[test]
fn test_progress_tmp_size_never_underflows() -> Result<()> {
    let progress = DumpProgress::create();

    // The schema path counts a file as written and copied with equal sizes;
    // interleavings may observe copied before written.
    progress.incr_bytes_copied(64);
    assert_eq!(progress.tmp_size(), 0);
    Ok(())
}
