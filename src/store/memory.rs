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
use crate::models::namespace::NamespaceId;
use crate::models::policy_document::{PolicyDocument, Version, VersionedPolicy};
use crate::store::{PolicyStore, WriteOutcome};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, trace};

/// In-process store, compare-and-swap is performed under the map's entry lock.
#[derive(Debug)]
pub struct MemoryPolicyStore {
    documents: DashMap<NamespaceId, VersionedPolicy>,
    available: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
    conflicts: AtomicU64,
}

impl Default for MemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            available: AtomicBool::new(true),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
        }
    }

    /// While unavailable, every call fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Write attempts, including the rejected ones.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::SeqCst)
    }

    pub fn accesses(&self) -> u64 {
        self.reads() + self.writes()
    }

    pub fn namespaces_count(&self) -> usize {
        self.documents.len()
    }

    fn ensure_available(&self) -> Result<(), PolicyError> {
        if self.available.load(Ordering::SeqCst) {
            return Ok(());
        }

        Err(PolicyError::StoreUnavailable(
            "in-memory policy store is switched off".to_owned(),
        ))
    }

    fn conflict(&self, current: Version) -> WriteOutcome {
        self.conflicts.fetch_add(1, Ordering::SeqCst);
        WriteOutcome::VersionConflict { current }
    }
}

impl PolicyStore for MemoryPolicyStore {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        let policy = self.documents.get(namespace).map(|entry| entry.clone());
        trace!(
            "Read policies for namespace: {namespace}, version: {}",
            policy
                .as_ref()
                .map(|policy| policy.version)
                .unwrap_or(Version::ABSENT)
        );
        Ok(policy)
    }

    async fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        let outcome = match self.documents.entry(namespace.clone()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().version;
                if current != expected {
                    self.conflict(current)
                } else {
                    let version = current.next();
                    entry.insert(VersionedPolicy::new(version, document.clone()));
                    WriteOutcome::Committed(version)
                }
            }
            Entry::Vacant(entry) => {
                if !expected.is_absent() {
                    self.conflict(Version::ABSENT)
                } else {
                    entry.insert(VersionedPolicy::new(Version::INITIAL, document.clone()));
                    WriteOutcome::Committed(Version::INITIAL)
                }
            }
        };
        debug!("Conditional write for namespace: {namespace}, expected version: {expected}, outcome: {outcome:?}");
        Ok(outcome)
    }
}
