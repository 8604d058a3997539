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
use crate::models::action::ActionSet;
use crate::models::topic::{Role, TopicName};
use std::fmt::Display;

/// Validated, immutable form of a [`PermissionRequest`](super::PermissionRequest) consumed by the merge engine.
/// The payloads can only be built through [`PolicyOperation::grant`] and [`PolicyOperation::revoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOperation {
    Grant(Grant),
    Revoke(Revoke),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    topic: TopicName,
    role: Role,
    actions: ActionSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revoke {
    topic: TopicName,
    role: Role,
}

impl Grant {
    pub fn topic(&self) -> &TopicName {
        &self.topic
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }
}

impl Revoke {
    pub fn topic(&self) -> &TopicName {
        &self.topic
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

impl PolicyOperation {
    pub fn grant(topic: TopicName, role: Role, actions: ActionSet) -> Result<Self, PolicyError> {
        if actions.is_empty() {
            return Err(PolicyError::EmptyActionSet(
                topic.to_string(),
                role.to_string(),
            ));
        }

        Ok(PolicyOperation::Grant(Grant {
            topic,
            role,
            actions,
        }))
    }

    pub fn revoke(topic: TopicName, role: Role) -> Self {
        PolicyOperation::Revoke(Revoke { topic, role })
    }

    pub fn topic(&self) -> &TopicName {
        match self {
            PolicyOperation::Grant(grant) => grant.topic(),
            PolicyOperation::Revoke(revoke) => revoke.topic(),
        }
    }

    pub fn role(&self) -> &Role {
        match self {
            PolicyOperation::Grant(grant) => grant.role(),
            PolicyOperation::Revoke(revoke) => revoke.role(),
        }
    }
}

impl Display for PolicyOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyOperation::Grant(grant) => {
                write!(f, "grant {}|{}|{}", grant.topic, grant.role, grant.actions)
            }
            PolicyOperation::Revoke(revoke) => write!(f, "revoke {}|{}", revoke.topic, revoke.role),
        }
    }
}

/// Operation tagged with the position of its item in the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedOperation {
    pub index: usize,
    pub operation: PolicyOperation,
}

impl IndexedOperation {
    pub fn new(index: usize, operation: PolicyOperation) -> Self {
        Self { index, operation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::action::Action;
    use std::str::FromStr;

    #[test]
    fn grant_should_require_actions() {
        let topic = TopicName::from_str("acme/orders/created").unwrap();
        let role = Role::new("app").unwrap();

        let error = PolicyOperation::grant(topic.clone(), role.clone(), ActionSet::new())
            .unwrap_err();
        assert_eq!(
            error,
            PolicyError::EmptyActionSet(topic.to_string(), role.to_string())
        );

        let operation =
            PolicyOperation::grant(topic.clone(), role, ActionSet::from([Action::Consume]))
                .unwrap();
        assert_eq!(operation.topic(), &topic);
        assert_eq!(
            operation.to_string(),
            "grant persistent://acme/orders/created|app|consume"
        );
    }
}
