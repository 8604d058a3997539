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

pub mod batch;
pub mod config_provider;
pub mod defaults;
pub mod retry;
pub mod store;
pub mod validators;

use batch::BatchConfig;
use retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use store::StoreConfig;

pub const COMPONENT: &str = "POLICY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    pub retry: RetryConfig,
    pub batch: BatchConfig,
    pub store: StoreConfig,
}

impl Display for PolicyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match toml::to_string(self) {
            Ok(config) => write!(f, "{config}"),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}
