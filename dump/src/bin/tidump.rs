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

use std::time::Instant;

use common_tracing::init_global_tracing;
use common_tracing::tracing;
use structopt::clap::ErrorKind;
use structopt::StructOpt;
use tidump::configs::Config;
use tidump::configs::TIDUMP_COMMIT_VERSION;
use tidump::dumpers::Dumper;

#[tokio::main]
async fn main() {
    let start = Instant::now();

    let mut conf = match Config::from_args_safe() {
        Ok(conf) => conf,
        Err(e)
            if e.kind == ErrorKind::HelpDisplayed || e.kind == ErrorKind::VersionDisplayed =>
        {
            e.exit()
        }
        Err(e) => {
            eprintln!("parse cmd flags err: {}", e.message);
            std::process::exit(2);
        }
    };

    // Command line options take precedence over the file.
    if !conf.config_file.is_empty() {
        conf = match Config::load_from_toml(&conf.config_file) {
            Ok(conf) => conf,
            Err(e) => {
                eprintln!("{}", e.message());
                std::process::exit(2);
            }
        };
    }

    // "fatal" is accepted for compatibility, tracing tops out at error.
    let level = match conf.log_level.to_lowercase().as_str() {
        "fatal" => "error".to_string(),
        level => level.to_string(),
    };
    let _guards = init_global_tracing("tidump", &conf.log_dir, &level);

    tracing::info!("tidump v-{}", *TIDUMP_COMMIT_VERSION);

    if let Err(e) = conf.validate() {
        tracing::error!("{}", e.message());
        std::process::exit(2);
    }

    let dumper = Dumper::create(conf);
    match dumper.dump().await {
        Ok(()) => {
            tracing::info!("Completed in {:?}.", start.elapsed());
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
