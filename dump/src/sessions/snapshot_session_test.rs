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

use chrono::TimeZone;
use chrono::Utc;
use common_exception::Result;
use pretty_assertions::assert_eq;

use crate::sessions::snapshot_date;

#[test]
fn test_snapshot_date_from_tso() -> Result<()> {
    let millis = Utc
        .with_ymd_and_hms(2021, 9, 1, 12, 0, 0)
        .unwrap()
        .timestamp_millis();
    let tso = (millis as u64) << 18;

    assert_eq!(snapshot_date(&tso.to_string())?, "2021-09-01");
    Ok(())
}

#[test]
fn test_snapshot_date_from_datetime() -> Result<()> {
    assert_eq!(snapshot_date("2018-09-20 15:04:05")?, "2018-09-20");
    assert_eq!(snapshot_date("2018-09-20 15:04:05.999")?, "2018-09-20");
    Ok(())
}

#[test]
fn test_snapshot_date_rejects_garbage() -> Result<()> {
    assert!(snapshot_date("").is_err());
    assert!(snapshot_date("last tuesday").is_err());
    Ok(())
}
