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

use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;
use lazy_static::lazy_static;
use structopt::StructOpt;
use structopt_toml::StructOptToml;

lazy_static! {
    pub static ref TIDUMP_COMMIT_VERSION: String = {
        let build_semver = option_env!("VERGEN_BUILD_SEMVER");
        let git_sha = option_env!("VERGEN_GIT_SHA_SHORT");
        let rustc_semver = option_env!("VERGEN_RUSTC_SEMVER");
        let timestamp = option_env!("VERGEN_BUILD_TIMESTAMP");

        match (build_semver, git_sha, rustc_semver, timestamp) {
            (Some(v1), Some(v2), Some(v3), Some(v4)) => format!("{}-{}({}-{})", v1, v2, v3, v4),
            _ => String::new(),
        }
    };
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, StructOpt, StructOptToml)]
#[structopt(name = "tidump", about = "A consistent, parallel dumper for TiDB")]
#[serde(default)]
pub struct Config {
    #[structopt(long, default_value = "", help = "Name of the S3 bucket to upload backups to")]
    pub s3_bucket: String,

    #[structopt(long, default_value = "us-east-1", help = "S3 region")]
    pub s3_region: String,

    #[structopt(
        long,
        default_value = "",
        help = "Key prefix to use when uploading files, derived from the server when empty"
    )]
    pub s3_bucket_prefix: String,

    #[structopt(long, default_value = "4", help = "Number of files to concurrently copy to S3")]
    pub s3_pool_size: usize,

    #[structopt(
        long,
        default_value = "mysql://root@localhost:4000/",
        help = "URL of the TiDB server to dump from"
    )]
    pub mysql_connection: String,

    #[structopt(
        long,
        default_value = ".*",
        help = "A regular expression to filter which schemas and tables to include"
    )]
    pub mysql_regex: String,

    #[structopt(long, default_value = "4", help = "Number of connections to the server")]
    pub mysql_pool_size: usize,

    #[structopt(long, default_value = "", help = "Dump from a fixed point in time")]
    pub tidb_snapshot: String,

    #[structopt(
        short = "L",
        long = "log-level",
        default_value = "info",
        help = "Log level: debug, info, warn, error, fatal"
    )]
    pub log_level: String,

    #[structopt(long, default_value = "", help = "Log file dir, stdout only when empty")]
    pub log_dir: String,

    #[structopt(long, default_value = "104857600", help = "Target size of files")]
    pub file_target_size: u64,

    #[structopt(long, default_value = "16777216", help = "Bulk insert limit")]
    pub bulk_insert_limit: u64,

    #[structopt(long, default_value = "5368709120", help = "Max size of tmpdir (goal)")]
    pub tmpdir_max: u64,

    #[structopt(short = "c", long = "config-file", default_value = "", help = "Config file")]
    pub config_file: String,
}

impl Config {
    pub fn default() -> Self {
        <Self as StructOpt>::from_iter(Vec::<&'static str>::new())
    }

    /// Load configs from toml file, command line options take precedence.
    pub fn load_from_toml(file: &str) -> Result<Self> {
        let context = std::fs::read_to_string(file)
            .map_err(|e| ErrorCode::BadArguments(format!("File: {}, err: {:?}", file, e)))?;
        let cfg = Config::from_args_with_toml(context.as_str())
            .map_err(|e| ErrorCode::BadArguments(format!("{:?}", e)))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.s3_bucket.is_empty() {
            return Err(ErrorCode::BadArguments(
                "--s3-bucket is required, backups have nowhere to go",
            ));
        }
        if self.s3_pool_size == 0 || self.mysql_pool_size == 0 {
            return Err(ErrorCode::BadArguments(
                "--s3-pool-size and --mysql-pool-size must be at least 1",
            ));
        }
        if self.tmpdir_max < self.file_target_size.saturating_mul(40) {
            tracing::warn!(
                "It is recommended to set a tmpdir-max 40x the size of file-target-size"
            );
            tracing::warn!("The tmpdir could block on all incomplete files.");
        }
        Ok(())
    }
}
