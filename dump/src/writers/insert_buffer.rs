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

use crate::writers::quote_identifier;

/// Accumulates one multi-row INSERT statement in memory. The limit is the
/// point where the current statement is terminated and a new one started;
/// a statement may exceed it by one row of values plus escape overhead.
pub struct InsertBuffer {
    header: String,
    limit: usize,
    buffer: Vec<u8>,
}

impl InsertBuffer {
    pub fn create(table: &str, columns: &[String], limit: usize) -> Self {
        let quoted: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
        let header = format!("INSERT INTO {} ({}) VALUES \n", table, quoted.join(","));
        InsertBuffer {
            header,
            limit,
            buffer: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the current statement must be terminated and flushed before
    /// another `values_len` bytes of row values go in.
    pub fn needs_flush(&self, values_len: usize) -> bool {
        !self.buffer.is_empty() && self.buffer.len() + values_len > self.limit
    }

    /// Close the current statement.
    pub fn terminate(&mut self) {
        self.buffer.extend_from_slice(b";\n");
    }

    /// Append one `(v1,v2,...)` tuple, starting a fresh INSERT if the buffer
    /// was just flushed.
    pub fn push(&mut self, values: &[u8]) {
        if self.buffer.is_empty() {
            self.buffer.extend_from_slice(self.header.as_bytes());
        } else {
            self.buffer.extend_from_slice(b",\n");
        }
        self.buffer.extend_from_slice(values);
    }

    /// Hand the accumulated statement to the caller and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}
