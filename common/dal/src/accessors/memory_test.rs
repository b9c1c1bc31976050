//  Copyright 2021 Datafuse Labs.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
//

use common_exception::Result;
use pretty_assertions::assert_eq;

use crate::DataAccessor;
use crate::Memory;

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_memory_accessor_put_get() -> Result<()> {
    let accessor = Memory::create();
    assert!(accessor.is_empty());

    accessor.put("prefix/a.sql", b"CREATE TABLE t1;\n".to_vec()).await?;
    accessor.put("prefix/metadata.json", b"{}".to_vec()).await?;

    assert_eq!(accessor.len(), 2);
    assert_eq!(
        accessor.keys(),
        vec!["prefix/a.sql".to_string(), "prefix/metadata.json".to_string()]
    );
    assert_eq!(accessor.get("prefix/metadata.json").await?, b"{}".to_vec());

    let missing = accessor.get("prefix/missing").await;
    assert!(missing.is_err());
    Ok(())
}
