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

use crate::catalogs::Catalog;

#[test]
fn test_all_tables_query_excludes_system_schemas() -> Result<()> {
    let query = Catalog::all_tables_query("");

    assert!(query.contains("INFORMATION_SCHEMA.TABLES"));
    assert!(query.contains("t.TABLE_SCHEMA NOT IN ('mysql', 'INFORMATION_SCHEMA', 'PERFORMANCE_SCHEMA')"));
    assert!(query.contains("if(AVG_ROW_LENGTH=0,100,AVG_ROW_LENGTH)"));
    assert!(query.contains("IFNULL(pk.likely_primary_key,'_tidb_rowid')"));
    assert!(query.contains("extra NOT LIKE '%GENERATED%'"));
    assert!(!query.contains("RLIKE"));
    Ok(())
}

#[test]
fn test_all_tables_query_appends_regex() -> Result<()> {
    let query = Catalog::all_tables_query("^db1\\.t[0-9]+$");

    assert!(query.ends_with(
        "AND concat(t.table_schema, '.', t.table_name) RLIKE '^db1\\.t[0-9]+$'"
    ));
    Ok(())
}
