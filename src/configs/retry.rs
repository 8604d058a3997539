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

use crate::utils::duration::PolicyDuration;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use serde_with::DisplayFromStr;

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    #[serde_as(as = "DisplayFromStr")]
    pub initial_backoff: PolicyDuration,
    #[serde_as(as = "DisplayFromStr")]
    pub max_backoff: PolicyDuration,
    pub jitter: bool,
}

impl RetryConfig {
    /// Upper bound of attempts a namespace controller makes, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_attempts_should_include_the_first_attempt() {
        let mut config = RetryConfig {
            max_retries: 0,
            initial_backoff: PolicyDuration::ZERO,
            max_backoff: PolicyDuration::ZERO,
            jitter: false,
        };
        assert_eq!(config.max_attempts(), 1);

        config.max_retries = 5;
        assert_eq!(config.max_attempts(), 6);

        config.max_retries = u32::MAX;
        assert_eq!(config.max_attempts(), u32::MAX);
    }
}
