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

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;
use topic_policies::prelude::*;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn config(max_retries: u32) -> PolicyConfig {
    PolicyConfig {
        retry: RetryConfig {
            max_retries,
            initial_backoff: PolicyDuration::from_millis(1),
            max_backoff: PolicyDuration::from_millis(10),
            jitter: true,
        },
        batch: BatchConfig {
            timeout: PolicyDuration::ZERO,
            max_concurrent_namespaces: 8,
        },
        ..PolicyConfig::default()
    }
}

pub fn namespace(value: &str) -> NamespaceId {
    NamespaceId::from_str(value).unwrap()
}

pub fn topic(value: &str) -> TopicName {
    TopicName::from_str(value).unwrap()
}

pub fn role(value: &str) -> Role {
    Role::new(value).unwrap()
}

/// Grant committed by a writer outside the service under test.
#[derive(Debug, Clone)]
pub struct ForeignGrant {
    pub topic: TopicName,
    pub role: Role,
    pub actions: ActionSet,
}

/// Lets another writer commit right before the next conditional write goes through,
/// so the write under test is rejected with a genuine version conflict.
#[derive(Debug, Default)]
pub struct InterleavingStore {
    pub inner: MemoryPolicyStore,
    interference: Mutex<Vec<ForeignGrant>>,
}

impl InterleavingStore {
    pub fn interfere_with(&self, grant: ForeignGrant) {
        self.interference.lock().unwrap().push(grant);
    }

    async fn commit_foreign_grant(&self, namespace: &NamespaceId, grant: ForeignGrant) {
        let current = self.inner.read(namespace).await.unwrap();
        let (version, mut document) = current
            .map(|policy| (policy.version, policy.document))
            .unwrap_or((Version::ABSENT, PolicyDocument::new()));
        document.grant(grant.topic, grant.role, grant.actions);
        let outcome = self
            .inner
            .write_if_version(namespace, &document, version)
            .await
            .unwrap();
        assert!(matches!(outcome, WriteOutcome::Committed(_)));
    }
}

impl PolicyStore for InterleavingStore {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.inner.read(namespace).await
    }

    async fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        let interference = self.interference.lock().unwrap().pop();
        if let Some(grant) = interference {
            self.commit_foreign_grant(namespace, grant).await;
        }
        self.inner
            .write_if_version(namespace, document, expected)
            .await
    }
}

/// Rejects every conditional write as if another writer always committed first.
#[derive(Debug, Default)]
pub struct ContendedStore {
    pub inner: MemoryPolicyStore,
    pub writes: AtomicU32,
}

impl PolicyStore for ContendedStore {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.inner.read(namespace).await
    }

    async fn write_if_version(
        &self,
        _namespace: &NamespaceId,
        _document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(WriteOutcome::VersionConflict {
            current: expected.next(),
        })
    }
}

/// Holds every conditional write for `delay` before committing it.
#[derive(Debug)]
pub struct SlowCommitStore {
    pub inner: MemoryPolicyStore,
    pub delay: Duration,
}

impl SlowCommitStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryPolicyStore::new(),
            delay,
        }
    }
}

impl PolicyStore for SlowCommitStore {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.inner.read(namespace).await
    }

    async fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        tokio::time::sleep(self.delay).await;
        self.inner
            .write_if_version(namespace, document, expected)
            .await
    }
}

/// Fails every call for the listed namespaces, the others are served normally.
#[derive(Debug, Default)]
pub struct PartiallyAvailableStore {
    pub inner: MemoryPolicyStore,
    pub unavailable: Vec<NamespaceId>,
}

impl PartiallyAvailableStore {
    fn check(&self, namespace: &NamespaceId) -> Result<(), PolicyError> {
        if self.unavailable.contains(namespace) {
            return Err(PolicyError::StoreUnavailable(namespace.to_string()));
        }
        Ok(())
    }
}

impl PolicyStore for PartiallyAvailableStore {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.check(namespace)?;
        self.inner.read(namespace).await
    }

    async fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        self.check(namespace)?;
        self.inner
            .write_if_version(namespace, document, expected)
            .await
    }
}
