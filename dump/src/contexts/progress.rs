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

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub struct DumpProgressValues {
    pub bytes_dumped: u64,
    pub bytes_written: u64,
    pub bytes_copied: u64,
    pub files_total: u64,
    pub files_dump_done: u64,
    pub files_copy_done: u64,
}

/// Run-wide counters. All counters are monotonically non-decreasing:
/// bytes_copied <= bytes_written and, once enumeration has completed,
/// files_copy_done <= files_dump_done <= files_total.
#[derive(Debug, Default)]
pub struct DumpProgress {
    bytes_dumped: AtomicU64,
    bytes_written: AtomicU64,
    bytes_copied: AtomicU64,
    files_total: AtomicU64,
    files_dump_done: AtomicU64,
    files_copy_done: AtomicU64,
}

impl DumpProgress {
    pub fn create() -> Self {
        Self::default()
    }

    /// Uncompressed bytes handed to the gzip stream.
    pub fn incr_bytes_dumped(&self, bytes: u64) {
        self.bytes_dumped.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Compressed bytes observed on disk.
    pub fn incr_bytes_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Compressed bytes known to have reached the object store.
    pub fn incr_bytes_copied(&self, bytes: u64) {
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn incr_files_total(&self, files: u64) {
        self.files_total.fetch_add(files, Ordering::Relaxed);
    }

    pub fn incr_files_dump_done(&self) {
        self.files_dump_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_files_copy_done(&self) {
        self.files_copy_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_values(&self) -> DumpProgressValues {
        DumpProgressValues {
            bytes_dumped: self.bytes_dumped.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            files_total: self.files_total.load(Ordering::Relaxed),
            files_dump_done: self.files_dump_done.load(Ordering::Relaxed),
            files_copy_done: self.files_copy_done.load(Ordering::Relaxed),
        }
    }

    /// Compressed bytes sitting in the tmpdir right now.
    pub fn tmp_size(&self) -> u64 {
        let written = self.bytes_written.load(Ordering::Relaxed);
        let copied = self.bytes_copied.load(Ordering::Relaxed);
        written.saturating_sub(copied)
    }
}
