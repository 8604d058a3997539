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
use crate::models::namespace::{NamespaceId, MAX_NAME_SEGMENT_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};

const DOMAIN_SEPARATOR: &str = "://";
const PARTITION_SUFFIX: &str = "-partition-";
pub const MAX_ROLE_LENGTH: usize = 255;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, StrumDisplay, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum TopicDomain {
    #[default]
    Persistent,
    NonPersistent,
}

/// Fully qualified topic name: `{domain}://{tenant}/{namespace}/{local}`.
///
/// The short form `tenant/namespace/local` is accepted and treated as persistent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicName {
    namespace: NamespaceId,
    domain: TopicDomain,
    local_name: String,
}

impl TopicName {
    pub fn new(
        domain: TopicDomain,
        namespace: NamespaceId,
        local_name: &str,
    ) -> Result<Self, PolicyError> {
        if !is_valid_local_name(local_name) {
            return Err(PolicyError::InvalidTopicName(format!(
                "{domain}{DOMAIN_SEPARATOR}{namespace}/{local_name}"
            )));
        }

        Ok(TopicName {
            namespace,
            domain,
            local_name: local_name.to_owned(),
        })
    }

    pub fn namespace(&self) -> &NamespaceId {
        &self.namespace
    }

    pub fn domain(&self) -> TopicDomain {
        self.domain
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn partition_index(&self) -> Option<u32> {
        let (_, index) = self.local_name.rsplit_once(PARTITION_SUFFIX)?;
        index.parse().ok()
    }

    /// Name of the partitioned topic this partition belongs to, or the topic itself.
    pub fn partitioned_topic(&self) -> TopicName {
        match self.local_name.rsplit_once(PARTITION_SUFFIX) {
            Some((base, index)) if !base.is_empty() && index.parse::<u32>().is_ok() => TopicName {
                namespace: self.namespace.clone(),
                domain: self.domain,
                local_name: base.to_owned(),
            },
            _ => self.clone(),
        }
    }
}

fn is_valid_local_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_SEGMENT_LENGTH
        && !name.contains('/')
        && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

impl FromStr for TopicName {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PolicyError::InvalidTopicName(s.to_owned());
        let (domain, path) = match s.split_once(DOMAIN_SEPARATOR) {
            Some((domain, path)) => (TopicDomain::from_str(domain).map_err(|_| invalid())?, path),
            None => (TopicDomain::Persistent, s),
        };

        let mut parts = path.splitn(3, '/');
        let (Some(tenant), Some(namespace), Some(local_name)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let namespace = NamespaceId::new(tenant, namespace).map_err(|_| invalid())?;
        TopicName::new(domain, namespace, local_name).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TopicName {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TopicName::from_str(&value)
    }
}

impl From<TopicName> for String {
    fn from(value: TopicName) -> Self {
        value.to_string()
    }
}

impl Display for TopicName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{DOMAIN_SEPARATOR}{}/{}",
            self.domain, self.namespace, self.local_name
        )
    }
}

/// Principal that permissions are granted to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    pub fn new(role: &str) -> Result<Self, PolicyError> {
        if role.is_empty()
            || role.len() > MAX_ROLE_LENGTH
            || role.trim() != role
            || role.chars().any(char::is_control)
        {
            return Err(PolicyError::InvalidRole(role.to_owned()));
        }

        Ok(Role(role.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Role {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::new(s)
    }
}

impl TryFrom<String> for Role {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::new(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.0
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
