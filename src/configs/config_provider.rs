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

use crate::configs::defaults::DEFAULT_CONFIG;
use crate::configs::{PolicyConfig, COMPONENT};
use crate::error::PolicyError;
use crate::validatable::Validatable;
use error_set::ErrContext;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use std::future::Future;
use std::path::Path;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "configs/policies.toml";
pub const ENV_PREFIX: &str = "TOPIC_POLICIES_";
const ENV_SECTION_SEPARATOR: &str = "__";

pub trait ConfigProvider {
    fn load_config(&self) -> impl Future<Output = Result<PolicyConfig, PolicyError>> + Send;
}

/// Layers the embedded defaults, the TOML file at `path` (when present) and
/// `TOPIC_POLICIES_` environment variables, e.g. `TOPIC_POLICIES_RETRY__MAX_RETRIES=10`.
#[derive(Debug)]
pub struct FileConfigProvider {
    path: String,
}

impl FileConfigProvider {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));
        if Path::new(&self.path).is_file() {
            info!("Found configuration file at path: '{}'.", self.path);
            figment = figment.merge(Toml::file(&self.path));
        } else {
            info!(
                "Configuration file not found at path: '{}'. Using embedded default configuration.",
                self.path
            );
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SECTION_SEPARATOR))
    }
}

impl Default for FileConfigProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH.to_owned())
    }
}

impl ConfigProvider for FileConfigProvider {
    async fn load_config(&self) -> Result<PolicyConfig, PolicyError> {
        info!("Loading config from path: '{}'...", self.path);
        let config: PolicyConfig = self.figment().extract().map_err(|error| {
            error!("Failed to load config: {error}");
            PolicyError::CannotLoadConfiguration
        })?;

        config.validate().with_error_context(|error| {
            format!("{COMPONENT} (error: {error}) - invalid configuration loaded from: {}", self.path)
        })?;
        info!("Using config: {config}");
        Ok(config)
    }
}
