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

use std::collections::HashMap;

use common_exception::ErrorCode;
use parking_lot::Mutex;

use crate::Bytes;
use crate::DataAccessor;

/// In-memory accessor, for tests.
pub struct Memory {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl Memory {
    pub fn create() -> Self {
        Memory {
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Sorted keys of everything stored so far.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl DataAccessor for Memory {
    async fn get(&self, path: &str) -> common_exception::Result<Bytes> {
        self.objects
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| ErrorCode::DALTransportError(format!("no such object: {}", path)))
    }

    async fn put(&self, path: &str, content: Vec<u8>) -> common_exception::Result<()> {
        self.objects.lock().insert(path.to_string(), content);
        Ok(())
    }
}
