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

use std::path::Path;
use std::path::PathBuf;

use common_dal::DataAccessorRef;
use common_exception::ErrorCode;
use common_exception::Result;
use common_tracing::tracing;

use crate::contexts::DumpContextRef;

const CREDENTIALS_HINT: &str = "This program does not accept credentials for AWS resources. \
If you are running on EC2, please assign a role to the instance with S3 permissions. \
If you are not on EC2, install the aws cli tools and run 'aws configure'.";

/// Verify the destination is writable before any dump work begins, by
/// uploading the metadata placeholder.
pub async fn probe_writable(accessor: &DataAccessorRef, prefix: &str) -> Result<()> {
    let key = format!("{}/metadata.json", prefix);
    accessor.put(&key, b"{}".to_vec()).await.map_err(|e| {
        ErrorCode::UploadFailure(format!(
            "the destination bucket is not writable ({}): {}\n{}",
            key, e, CREDENTIALS_HINT
        ))
    })
}

/// Copies finished files to the object store and deletes them locally, which
/// is what frees tmpdir budget for the dump pool.
pub struct UploadWorker {
    ctx: DumpContextRef,
    accessor: DataAccessorRef,
}

impl UploadWorker {
    pub fn create(ctx: DumpContextRef, accessor: DataAccessorRef) -> Self {
        UploadWorker { ctx, accessor }
    }

    /// Drain the upload queue. The queue reports closed exactly when it is
    /// empty and no dump worker can ever enqueue again; any other empty
    /// observation keeps this worker parked in recv().
    pub async fn run(self, files: async_channel::Receiver<PathBuf>) -> Result<()> {
        loop {
            let path = match files.recv().await {
                Ok(path) => path,
                Err(_) => return Ok(()),
            };
            if let Err(e) = self.upload_one(&path).await {
                // unblock dump workers stalled on the budget before bailing
                self.ctx.abort();
                return Err(e);
            }
        }
    }

    async fn upload_one(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read(path).await.map_err(|e| {
            ErrorCode::UploadFailure(format!(
                "could not open file for upload {}: {}",
                path.display(),
                e
            ))
        })?;
        let size = content.len() as u64;

        let basename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ErrorCode::UploadFailure(format!("unrepresentable file name: {}", path.display()))
            })?;
        let key = format!("{}/{}", self.ctx.prefix, basename);

        tracing::debug!("uploading {} to {}", path.display(), key);
        let uploaded = self.accessor.put(&key, content).await;

        // The local file goes away whether or not the upload landed; a
        // failed upload is fatal and retries restart the whole run.
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("could not remove uploaded file {}: {}", path.display(), e);
        }

        match uploaded {
            Ok(()) => {
                self.ctx.progress.incr_files_copy_done();
                self.ctx.progress.incr_bytes_copied(size);
                tracing::debug!("successfully uploaded {} to {}", path.display(), key);
                Ok(())
            }
            Err(e) => Err(ErrorCode::UploadFailure(format!(
                "{}\n{}",
                e, CREDENTIALS_HINT
            ))),
        }
    }
}
