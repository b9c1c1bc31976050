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

use crate::writers::InsertBuffer;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_single_statement() -> Result<()> {
    let mut buffer = InsertBuffer::create("t1", &columns(&["id", "s"]), 1024);
    assert!(buffer.is_empty());

    buffer.push(b"(1,'a')");
    buffer.push(b"(2,'b\\'c')");
    buffer.push(b"(3,NULL)");
    buffer.terminate();

    let sql = String::from_utf8(buffer.take()).expect("valid utf8");
    assert_eq!(
        sql,
        "INSERT INTO t1 (`id`,`s`) VALUES \n(1,'a'),\n(2,'b\\'c'),\n(3,NULL);\n"
    );
    assert!(buffer.is_empty());
    Ok(())
}

#[test]
fn test_limit_starts_new_statement() -> Result<()> {
    // limit low enough that every second row rolls the statement over
    let mut buffer = InsertBuffer::create("t1", &columns(&["id"]), 40);
    let mut out: Vec<u8> = Vec::new();

    for values in [&b"(1)"[..], b"(2)", b"(3)"] {
        if buffer.needs_flush(values.len()) {
            buffer.terminate();
            out.extend_from_slice(&buffer.take());
        }
        buffer.push(values);
    }
    if !buffer.is_empty() {
        buffer.terminate();
        out.extend_from_slice(&buffer.take());
    }

    let sql = String::from_utf8(out).expect("valid utf8");
    assert_eq!(
        sql,
        "INSERT INTO t1 (`id`) VALUES \n(1),\n(2);\nINSERT INTO t1 (`id`) VALUES \n(3);\n"
    );
    Ok(())
}

#[test]
fn test_never_flushes_empty_statement() -> Result<()> {
    let buffer = InsertBuffer::create("t1", &columns(&["id"]), 4);
    // first row always goes in, however large
    assert!(!buffer.needs_flush(1024));
    Ok(())
}
