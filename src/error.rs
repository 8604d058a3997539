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

use strum::{EnumDiscriminants, FromRepr, IntoStaticStr};
use thiserror::Error;

#[derive(Clone, Debug, Error, EnumDiscriminants, IntoStaticStr, FromRepr, Default)]
#[repr(u32)]
#[strum(serialize_all = "snake_case")]
#[strum_discriminants(
    vis(pub),
    derive(FromRepr, IntoStaticStr),
    strum(serialize_all = "snake_case")
)]
pub enum PolicyError {
    #[default]
    #[error("Error")]
    Error = 1,
    #[error("Invalid configuration")]
    InvalidConfiguration = 2,
    #[error("Cannot load configuration")]
    CannotLoadConfiguration = 3,
    #[error("Invalid duration: {0}")]
    InvalidDuration(String) = 4,
    #[error("Invalid topic name: {0}")]
    InvalidTopicName(String) = 1000,
    #[error("Topic: {0} cannot be resolved to a namespace")]
    UnresolvableTopic(String) = 1001,
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String) = 1002,
    #[error("Invalid role: {0}")]
    InvalidRole(String) = 1003,
    #[error("Invalid action: {0}")]
    InvalidAction(String) = 1004,
    #[error("Empty action set granted to role: {1} on topic: {0}")]
    EmptyActionSet(String, String) = 1005,
    #[error("Namespace: {0} has {1} invalid batch item(s)")]
    InvalidBatchItems(String, usize) = 1006,
    #[error("Namespace: {0} exceeded the retry budget after {1} conflicting attempt(s)")]
    NamespaceConflictExceeded(String, u32) = 2000,
    #[error("Policy store is unavailable: {0}")]
    StoreUnavailable(String) = 2001,
    #[error("Policy document for namespace: {0} is corrupted")]
    CorruptedPolicyDocument(String) = 2002,
    #[error("Policy update for namespace: {0} was cancelled")]
    BatchCancelled(String) = 2003,
    #[error("Batch partially failed, {0} of {1} namespace(s) failed, {2} item(s) unresolved")]
    PartialBatchFailure(usize, usize, usize) = 3000,
}

impl PolicyError {
    pub fn as_code(&self) -> u32 {
        PolicyErrorDiscriminants::from(self) as u32
    }

    pub fn as_string(&self) -> &'static str {
        self.into()
    }

    pub fn from_code(code: u32) -> Self {
        PolicyError::from_repr(code).unwrap_or(PolicyError::Error)
    }

    pub fn from_code_as_string(code: u32) -> &'static str {
        PolicyErrorDiscriminants::from_repr(code)
            .map(|discriminant| discriminant.into())
            .unwrap_or("unknown error code")
    }

    /// Errors detected before any store access, caused by the request itself.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            PolicyError::InvalidTopicName(_)
                | PolicyError::UnresolvableTopic(_)
                | PolicyError::InvalidNamespace(_)
                | PolicyError::InvalidRole(_)
                | PolicyError::InvalidAction(_)
                | PolicyError::EmptyActionSet(_, _)
                | PolicyError::InvalidBatchItems(_, _)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PolicyError::NamespaceConflictExceeded(_, _))
    }

    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            PolicyError::StoreUnavailable(_) | PolicyError::CorruptedPolicyDocument(_)
        )
    }
}

impl PartialEq for PolicyError {
    fn eq(&self, other: &Self) -> bool {
        self.as_code() == other.as_code()
    }
}
