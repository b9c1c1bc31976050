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

#[cfg(test)]
mod uploader_test;

mod dump_table;
mod dumper;
mod reporter;
mod uploader;
mod worker;

pub use dump_table::DumpJob;
pub use dump_table::DumpTable;
pub use dumper::Dumper;
pub use reporter::Reporter;
pub use uploader::probe_writable;
pub use uploader::UploadWorker;
pub use worker::DumpWorker;
