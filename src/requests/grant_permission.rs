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
use crate::validatable::Validatable;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// `GrantPermission` request is used to set the actions a role may perform on a topic.
/// It has additional payload:
/// - `topic` - fully qualified topic name, e.g. `persistent://tenant/namespace/topic`.
/// - `role` - role receiving the permissions.
/// - `actions` - non-empty set of actions, replacing whatever the role held before.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrantPermission {
    pub topic: String,
    pub role: String,
    pub actions: ActionSet,
}

impl GrantPermission {
    pub fn new(topic: &str, role: &str, actions: impl Into<ActionSet>) -> Self {
        GrantPermission {
            topic: topic.to_owned(),
            role: role.to_owned(),
            actions: actions.into(),
        }
    }
}

impl Validatable<PolicyError> for GrantPermission {
    fn validate(&self) -> Result<(), PolicyError> {
        if self.actions.is_empty() {
            return Err(PolicyError::EmptyActionSet(
                self.topic.clone(),
                self.role.clone(),
            ));
        }

        Ok(())
    }
}

impl Display for GrantPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "grant {}|{}|{}", self.topic, self.role, self.actions)
    }
}
