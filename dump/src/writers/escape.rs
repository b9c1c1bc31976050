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

use mysql_async::consts::ColumnType;
use mysql_async::Value;

/// Escape one value byte-wise for a single-quoted SQL literal: a backslash
/// goes in front of CR, LF, backslash and both quote characters, and byte
/// 0x1A becomes the two-byte sequence `\Z`. Everything else passes through
/// verbatim, including invalid UTF-8.
pub fn escape_into(value: &[u8], out: &mut Vec<u8>) {
    for &byte in value {
        match byte {
            b'\r' | b'\n' | b'\\' | b'\'' | b'"' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x1a => {
                out.push(b'\\');
                out.push(b'Z');
            }
            _ => out.push(byte),
        }
    }
}

/// Identifier names are trusted to be well-formed, they are only wrapped.
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier)
}

/// Numeric wire types are emitted bytes-as-is; everything else is quoted
/// and escaped. The set matches what the server sends for BIGINT, INT,
/// DECIMAL and FLOAT columns.
fn is_unquoted_type(column_type: ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::MYSQL_TYPE_LONGLONG
            | ColumnType::MYSQL_TYPE_LONG
            | ColumnType::MYSQL_TYPE_DECIMAL
            | ColumnType::MYSQL_TYPE_NEWDECIMAL
            | ColumnType::MYSQL_TYPE_FLOAT
    )
}

/// Render one column of one row into the VALUES tuple being built.
pub fn render_value(column_type: ColumnType, value: Option<&Value>, out: &mut Vec<u8>) {
    match value {
        None | Some(Value::NULL) => out.extend_from_slice(b"NULL"),
        Some(Value::Bytes(bytes)) => {
            if is_unquoted_type(column_type) {
                out.extend_from_slice(bytes);
            } else {
                out.push(b'\'');
                escape_into(bytes, out);
                out.push(b'\'');
            }
        }
        // The text protocol only produces NULL and Bytes; these arms keep
        // binary-protocol results correct too.
        Some(Value::Int(v)) => out.extend_from_slice(v.to_string().as_bytes()),
        Some(Value::UInt(v)) => out.extend_from_slice(v.to_string().as_bytes()),
        Some(Value::Float(v)) => out.extend_from_slice(v.to_string().as_bytes()),
        Some(Value::Double(v)) => out.extend_from_slice(v.to_string().as_bytes()),
        Some(other) => out.extend_from_slice(other.as_sql(false).as_bytes()),
    }
}
