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

use std::sync::Arc;

use crate::catalogs::TableSpec;
use crate::planners::RangeSpec;

/// What a worker needs to know about a table: identity, the settled primary
/// key and the column list. Work items share one of these, they never point
/// back at the coordinator.
#[derive(Clone, Debug, PartialEq)]
pub struct DumpTable {
    pub schema: String,
    pub table: String,
    pub primary_key: String,
    pub insertable_columns: String,
}

impl DumpTable {
    pub fn create(spec: &TableSpec, primary_key: String) -> Self {
        DumpTable {
            schema: spec.schema.clone(),
            table: spec.table.clone(),
            primary_key,
            insertable_columns: spec.insertable_columns.clone(),
        }
    }
}

/// One unit of dump work. Each item is consumed exactly once by one worker.
#[derive(Clone, Debug)]
pub enum DumpJob {
    Schema(Arc<DumpTable>),
    Range {
        table: Arc<DumpTable>,
        range: RangeSpec,
    },
}
