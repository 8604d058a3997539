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

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// `RevokePermission` request is used to remove every action a role holds on a topic.
/// Revoking a role that holds nothing is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevokePermission {
    pub topic: String,
    pub role: String,
}

impl RevokePermission {
    pub fn new(topic: &str, role: &str) -> Self {
        RevokePermission {
            topic: topic.to_owned(),
            role: role.to_owned(),
        }
    }
}

impl Display for RevokePermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "revoke {}|{}", self.topic, self.role)
    }
}
