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

use crate::error::PolicyError;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Human readable duration used across the configuration, e.g. `"250ms"`, `"1m 30s"`.
/// `"0"`, `"none"` and `"disabled"` all parse to the zero duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolicyDuration {
    duration: Duration,
}

impl PolicyDuration {
    pub const ZERO: PolicyDuration = PolicyDuration {
        duration: Duration::ZERO,
    };

    pub const fn new(duration: Duration) -> PolicyDuration {
        PolicyDuration { duration }
    }

    pub const fn from_millis(millis: u64) -> PolicyDuration {
        PolicyDuration {
            duration: Duration::from_millis(millis),
        }
    }

    pub fn get_duration(&self) -> Duration {
        self.duration
    }

    pub fn as_millis(&self) -> u64 {
        self.duration.as_millis().min(u64::MAX as u128) as u64
    }

    pub fn is_zero(&self) -> bool {
        self.duration.is_zero()
    }

    pub fn as_human_time_string(&self) -> String {
        humantime::format_duration(self.duration).to_string()
    }
}

impl FromStr for PolicyDuration {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "0" | "none" | "disabled" => Ok(PolicyDuration::ZERO),
            _ => humantime::parse_duration(&value)
                .map(PolicyDuration::new)
                .map_err(|_| PolicyError::InvalidDuration(s.to_owned())),
        }
    }
}

impl From<Duration> for PolicyDuration {
    fn from(duration: Duration) -> Self {
        PolicyDuration::new(duration)
    }
}

impl From<PolicyDuration> for Duration {
    fn from(value: PolicyDuration) -> Self {
        value.duration
    }
}

impl Display for PolicyDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        write!(f, "{}", self.as_human_time_string())
    }
}
