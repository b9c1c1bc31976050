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
mod dump_file_test;
#[cfg(test)]
mod insert_buffer_test;

mod dump_file;
mod escape;
mod insert_buffer;
mod schema_dumper;

pub use dump_file::build_select;
pub use dump_file::dump_range;
pub use dump_file::DumpFile;
pub use escape::escape_into;
pub use escape::quote_identifier;
pub use escape::render_value;
pub use insert_buffer::InsertBuffer;
pub use schema_dumper::SchemaDumper;
