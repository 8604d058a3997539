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

pub mod file;
pub mod memory;

use crate::configs::store::{StoreConfig, StoreKind};
use crate::error::PolicyError;
use crate::models::namespace::NamespaceId;
use crate::models::policy_document::{PolicyDocument, Version, VersionedPolicy};
use file::FilePolicyStore;
use memory::MemoryPolicyStore;
use std::fmt::Debug;
use std::future::Future;

pub const COMPONENT: &str = "POLICY_STORE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Committed(Version),
    /// Another writer committed first; `current` is the version now held by the store.
    VersionConflict { current: Version },
}

/// Access to the per-namespace policy documents held by the metadata store.
///
/// The store owns documents and versions exclusively. A write is accepted only when
/// `expected` matches the stored version at commit time ([`Version::ABSENT`] means
/// "no document yet") and every accepted write increases the version by one.
/// Any `Err` is a non-conflict failure.
pub trait PolicyStore: Send + Sync + Debug {
    fn read(
        &self,
        namespace: &NamespaceId,
    ) -> impl Future<Output = Result<Option<VersionedPolicy>, PolicyError>> + Send;

    fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> impl Future<Output = Result<WriteOutcome, PolicyError>> + Send;
}

#[derive(Debug)]
pub enum PolicyStoreKind {
    Memory(MemoryPolicyStore),
    File(FilePolicyStore),
}

impl PolicyStoreKind {
    pub fn from_config(config: &StoreConfig) -> Self {
        match config.kind {
            StoreKind::Memory => PolicyStoreKind::Memory(MemoryPolicyStore::new()),
            StoreKind::File => PolicyStoreKind::File(FilePolicyStore::new(
                &config.path,
                config.stale_lock_timeout.get_duration(),
            )),
        }
    }
}

impl PolicyStore for PolicyStoreKind {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        match self {
            PolicyStoreKind::Memory(s) => s.read(namespace).await,
            PolicyStoreKind::File(s) => s.read(namespace).await,
        }
    }

    async fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        match self {
            PolicyStoreKind::Memory(s) => s.write_if_version(namespace, document, expected).await,
            PolicyStoreKind::File(s) => s.write_if_version(namespace, document, expected).await,
        }
    }
}
