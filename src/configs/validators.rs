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
use crate::configs::{PolicyConfig, COMPONENT};
use crate::error::PolicyError;
use crate::validatable::Validatable;
use error_set::ErrContext;
use tracing::error;

impl Validatable<PolicyError> for PolicyConfig {
    fn validate(&self) -> Result<(), PolicyError> {
        self.retry.validate().with_error_context(|error| {
            format!("{COMPONENT} (error: {error}) - failed to validate retry config")
        })?;
        self.batch.validate().with_error_context(|error| {
            format!("{COMPONENT} (error: {error}) - failed to validate batch config")
        })?;
        self.store.validate().with_error_context(|error| {
            format!("{COMPONENT} (error: {error}) - failed to validate store config")
        })?;
        Ok(())
    }
}

impl Validatable<PolicyError> for RetryConfig {
    fn validate(&self) -> Result<(), PolicyError> {
        if self.max_backoff < self.initial_backoff {
            error!(
                "Configured retry.max_backoff: {} is lower than retry.initial_backoff: {}",
                self.max_backoff, self.initial_backoff
            );
            return Err(PolicyError::InvalidConfiguration);
        }

        Ok(())
    }
}

impl Validatable<PolicyError> for BatchConfig {
    fn validate(&self) -> Result<(), PolicyError> {
        if self.max_concurrent_namespaces == 0 {
            error!("Configured batch.max_concurrent_namespaces cannot be 0");
            return Err(PolicyError::InvalidConfiguration);
        }

        Ok(())
    }
}

impl Validatable<PolicyError> for StoreConfig {
    fn validate(&self) -> Result<(), PolicyError> {
        if self.kind != StoreKind::File {
            return Ok(());
        }

        if self.path.trim().is_empty() {
            error!("Configured store.path cannot be empty for the file store");
            return Err(PolicyError::InvalidConfiguration);
        }

        if self.stale_lock_timeout.is_zero() {
            error!("Configured store.stale_lock_timeout cannot be 0 for the file store");
            return Err(PolicyError::InvalidConfiguration);
        }

        Ok(())
    }
}
