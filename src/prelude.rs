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

//! Prelude module for the topic policies crate.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! so they can be imported with a single `use topic_policies::prelude::*;`.

pub use crate::configs::batch::BatchConfig;
pub use crate::configs::config_provider::{ConfigProvider, FileConfigProvider};
pub use crate::configs::retry::RetryConfig;
pub use crate::configs::store::{StoreConfig, StoreKind};
pub use crate::configs::PolicyConfig;
pub use crate::engine::coordinator::BatchCoordinator;
pub use crate::engine::outcome::{
    BatchResult, BatchStatus, ItemError, NamespaceOutcome, NamespaceStatus,
};
pub use crate::engine::resolver::{NamespaceResolver, QualifiedNameResolver};
pub use crate::error::PolicyError;
pub use crate::models::action::{Action, ActionSet};
pub use crate::models::namespace::NamespaceId;
pub use crate::models::policy_document::{
    PolicyDocument, TopicPermissions, Version, VersionedPolicy,
};
pub use crate::models::topic::{Role, TopicDomain, TopicName};
pub use crate::requests::grant_permission::GrantPermission;
pub use crate::requests::revoke_permission::RevokePermission;
pub use crate::requests::{BatchRequest, PermissionRequest};
pub use crate::service::PolicyService;
pub use crate::store::file::FilePolicyStore;
pub use crate::store::memory::MemoryPolicyStore;
pub use crate::store::{PolicyStore, PolicyStoreKind, WriteOutcome};
pub use crate::utils::duration::PolicyDuration;
pub use crate::validatable::Validatable;
