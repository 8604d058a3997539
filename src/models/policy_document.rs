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

use crate::models::action::ActionSet;
use crate::models::topic::{Role, TopicName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Opaque store version used for conditional writes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Observed when a namespace has no document yet.
    pub const ABSENT: Version = Version(0);
    pub const INITIAL: Version = Version(1);

    pub const fn new(value: u64) -> Self {
        Version(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_absent(&self) -> bool {
        *self == Version::ABSENT
    }

    pub fn next(&self) -> Version {
        Version(self.0 + 1)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type TopicPermissions = BTreeMap<Role, ActionSet>;

/// Per-namespace record mapping topic and role to the permitted actions.
///
/// Each (topic, role) pair appears at most once and a topic without roles is never kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    topics: BTreeMap<TopicName, TopicPermissions>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics_count(&self) -> usize {
        self.topics.len()
    }

    pub fn topic_permissions(&self, topic: &TopicName) -> Option<&TopicPermissions> {
        self.topics.get(topic)
    }

    pub fn get(&self, topic: &TopicName, role: &Role) -> Option<&ActionSet> {
        self.topics.get(topic)?.get(role)
    }

    pub fn topics(&self) -> impl Iterator<Item = (&TopicName, &TopicPermissions)> {
        self.topics.iter()
    }

    /// Replaces whatever the role held on the topic.
    pub fn grant(&mut self, topic: TopicName, role: Role, actions: ActionSet) {
        self.topics.entry(topic).or_default().insert(role, actions);
    }

    /// Returns whether an entry was removed. Emptied topics are left in place until [`prune`](Self::prune).
    pub fn revoke(&mut self, topic: &TopicName, role: &Role) -> bool {
        self.topics
            .get_mut(topic)
            .is_some_and(|roles| roles.remove(role).is_some())
    }

    pub fn prune(&mut self) {
        self.topics.retain(|_, roles| !roles.is_empty());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedPolicy {
    pub version: Version,
    pub document: PolicyDocument,
}

impl VersionedPolicy {
    pub fn new(version: Version, document: PolicyDocument) -> Self {
        Self { version, document }
    }
}
