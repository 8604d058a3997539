/* Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use crate::configs::batch::BatchConfig;
use crate::configs::retry::RetryConfig;
use crate::configs::store::{StoreConfig, StoreKind};
use crate::utils::duration::PolicyDuration;

/// Contents of `configs/policies.toml`, the base layer of every loaded configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../../configs/policies.toml");

impl Default for RetryConfig {
    fn default() -> RetryConfig {
        RetryConfig {
            max_retries: 5,
            initial_backoff: PolicyDuration::from_millis(10),
            max_backoff: PolicyDuration::from_millis(500),
            jitter: true,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> BatchConfig {
        BatchConfig {
            timeout: PolicyDuration::from_millis(30_000),
            max_concurrent_namespaces: 16,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> StoreConfig {
        StoreConfig {
            kind: StoreKind::Memory,
            path: "local_data/policies".to_owned(),
            stale_lock_timeout: PolicyDuration::from_millis(30_000),
        }
    }
}
