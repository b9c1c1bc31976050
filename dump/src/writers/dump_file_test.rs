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

use std::io::Read;

use common_exception::Result;
use flate2::read::GzDecoder;
use pretty_assertions::assert_eq;

use crate::configs::Config;
use crate::contexts::DumpContext;
use crate::contexts::DumpContextRef;
use crate::dumpers::DumpTable;
use crate::planners::RangeSpec;
use crate::writers::build_select;
use crate::writers::DumpFile;

fn test_table() -> DumpTable {
    DumpTable {
        schema: "db1".to_string(),
        table: "t1".to_string(),
        primary_key: "id".to_string(),
        insertable_columns: "id,s".to_string(),
    }
}

fn test_context(tmp_dir: &std::path::Path, bulk_insert_limit: u64) -> DumpContextRef {
    let mut cfg = Config::default();
    cfg.bulk_insert_limit = bulk_insert_limit;
    DumpContext::create(cfg, tmp_dir.to_path_buf(), "prefix".to_string())
}

fn decompress(path: &std::path::Path) -> String {
    let file = std::fs::File::open(path).expect("open dump file");
    let mut decoder = GzDecoder::new(file);
    let mut text = String::new();
    decoder.read_to_string(&mut text).expect("valid gzip");
    text
}

#[test]
fn test_build_select_whole_table() -> Result<()> {
    let select = build_select(&test_table(), &RangeSpec::whole_table());
    assert_eq!(
        select,
        "SELECT LOW_PRIORITY id,s FROM `db1`.`t1` WHERE 1=1 AND 1=1"
    );
    Ok(())
}

#[test]
fn test_build_select_open_endpoints() -> Result<()> {
    let first = build_select(&test_table(), &RangeSpec { start: 0, end: 9999 });
    assert_eq!(
        first,
        "SELECT LOW_PRIORITY id,s FROM `db1`.`t1` WHERE 1=1 AND id < 9999"
    );

    let last = build_select(&test_table(), &RangeSpec { start: 990_000, end: 0 });
    assert_eq!(
        last,
        "SELECT LOW_PRIORITY id,s FROM `db1`.`t1` WHERE id > 990000 AND 1=1"
    );

    let middle = build_select(&test_table(), &RangeSpec { start: 10, end: 20 });
    assert_eq!(
        middle,
        "SELECT LOW_PRIORITY id,s FROM `db1`.`t1` WHERE id > 10 AND id < 20"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_dump_file_writes_gzip_inserts() -> Result<()> {
    common_tracing::init_default_tracing();

    let tmp = tempfile::tempdir().expect("create tempdir");
    let ctx = test_context(tmp.path(), 16 * 1024 * 1024);
    let columns = vec!["id".to_string(), "s".to_string()];

    let mut file = DumpFile::create(ctx.clone(), &test_table(), &RangeSpec::whole_table())?;
    assert_eq!(
        file.path().file_name().and_then(|n| n.to_str()),
        Some("db1.t1.0.sql.gz")
    );

    file.push_row(&columns, b"(1,'a')").await?;
    file.push_row(&columns, b"(2,'b\\'c')").await?;
    file.push_row(&columns, b"(3,NULL)").await?;
    let path = file.finish().await?;

    let expected = "INSERT INTO t1 (`id`,`s`) VALUES \n(1,'a'),\n(2,'b\\'c'),\n(3,NULL);\n";
    assert_eq!(decompress(&path), expected);

    let values = ctx.progress.get_values();
    assert_eq!(values.bytes_dumped, expected.len() as u64);
    let on_disk = std::fs::metadata(&path).expect("stat dump file").len();
    assert_eq!(values.bytes_written, on_disk);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_dump_file_rolls_statements_at_bulk_limit() -> Result<()> {
    let tmp = tempfile::tempdir().expect("create tempdir");
    let ctx = test_context(tmp.path(), 40);
    let columns = vec!["id".to_string()];

    let mut file = DumpFile::create(ctx, &test_table(), &RangeSpec::whole_table())?;
    file.push_row(&columns, b"(1)").await?;
    file.push_row(&columns, b"(2)").await?;
    file.push_row(&columns, b"(3)").await?;
    let path = file.finish().await?;

    assert_eq!(
        decompress(&path),
        "INSERT INTO t1 (`id`) VALUES \n(1),\n(2);\nINSERT INTO t1 (`id`) VALUES \n(3);\n"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_dump_file_with_no_rows() -> Result<()> {
    let tmp = tempfile::tempdir().expect("create tempdir");
    let ctx = test_context(tmp.path(), 1024);

    let file = DumpFile::create(ctx.clone(), &test_table(), &RangeSpec::whole_table())?;
    let path = file.finish().await?;

    assert_eq!(decompress(&path), "");
    assert_eq!(ctx.progress.get_values().bytes_dumped, 0);
    Ok(())
}
