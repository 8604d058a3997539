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

pub mod grant_permission;
pub mod operation;
pub mod revoke_permission;

use crate::models::action::ActionSet;
use grant_permission::GrantPermission;
use revoke_permission::RevokePermission;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Single, independently addressed item of a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionRequest {
    Grant(GrantPermission),
    Revoke(RevokePermission),
}

impl PermissionRequest {
    pub fn topic(&self) -> &str {
        match self {
            PermissionRequest::Grant(grant) => &grant.topic,
            PermissionRequest::Revoke(revoke) => &revoke.topic,
        }
    }

    pub fn role(&self) -> &str {
        match self {
            PermissionRequest::Grant(grant) => &grant.role,
            PermissionRequest::Revoke(revoke) => &revoke.role,
        }
    }
}

impl From<GrantPermission> for PermissionRequest {
    fn from(value: GrantPermission) -> Self {
        PermissionRequest::Grant(value)
    }
}

impl From<RevokePermission> for PermissionRequest {
    fn from(value: RevokePermission) -> Self {
        PermissionRequest::Revoke(value)
    }
}

impl Display for PermissionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionRequest::Grant(grant) => write!(f, "{grant}"),
            PermissionRequest::Revoke(revoke) => write!(f, "{revoke}"),
        }
    }
}

/// Ordered list of grant/revoke requests, possibly spanning several namespaces.
/// Item indices reported back in the batch result refer to positions in this list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BatchRequest {
    items: Vec<PermissionRequest>,
}

impl BatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, topic: &str, role: &str, actions: impl Into<ActionSet>) -> Self {
        self.items
            .push(GrantPermission::new(topic, role, actions).into());
        self
    }

    pub fn revoke(mut self, topic: &str, role: &str) -> Self {
        self.items.push(RevokePermission::new(topic, role).into());
        self
    }

    pub fn push(&mut self, request: impl Into<PermissionRequest>) {
        self.items.push(request.into());
    }

    pub fn items(&self) -> &[PermissionRequest] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<PermissionRequest>> for BatchRequest {
    fn from(items: Vec<PermissionRequest>) -> Self {
        BatchRequest { items }
    }
}

impl FromIterator<PermissionRequest> for BatchRequest {
    fn from_iter<T: IntoIterator<Item = PermissionRequest>>(iter: T) -> Self {
        BatchRequest {
            items: iter.into_iter().collect(),
        }
    }
}
