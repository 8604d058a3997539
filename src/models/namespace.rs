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
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const MAX_NAME_SEGMENT_LENGTH: usize = 255;

/// Administrative grouping of topics, the unit of policy document storage.
/// Displayed and parsed as `tenant/namespace`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceId {
    tenant: String,
    namespace: String,
}

impl NamespaceId {
    pub fn new(tenant: &str, namespace: &str) -> Result<Self, PolicyError> {
        if !is_valid_segment(tenant) || !is_valid_segment(namespace) {
            return Err(PolicyError::InvalidNamespace(format!("{tenant}/{namespace}")));
        }

        Ok(NamespaceId {
            tenant: tenant.to_owned(),
            namespace: namespace.to_owned(),
        })
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Segments double as file system path components, so only a conservative character set is allowed.
pub(crate) fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_NAME_SEGMENT_LENGTH
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl FromStr for NamespaceId {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(tenant), Some(namespace), None) => NamespaceId::new(tenant, namespace),
            _ => Err(PolicyError::InvalidNamespace(s.to_owned())),
        }
    }
}

impl TryFrom<String> for NamespaceId {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NamespaceId::from_str(&value)
    }
}

impl From<NamespaceId> for String {
    fn from(value: NamespaceId) -> Self {
        value.to_string()
    }
}

impl Display for NamespaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.tenant, self.namespace)
    }
}
