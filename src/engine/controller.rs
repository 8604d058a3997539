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

use crate::configs::retry::RetryConfig;
use crate::engine::backoff::Backoff;
use crate::engine::merge::merge;
use crate::engine::outcome::{NamespaceOutcome, NamespaceStatus};
use crate::engine::partitioner::NamespaceBatch;
use crate::error::PolicyError;
use crate::models::policy_document::{PolicyDocument, Version};
use crate::store::{PolicyStore, WriteOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drives one namespace's sub-batch through read, merge and conditional write until the
/// store accepts the write, the retry budget is spent, or the batch is cancelled.
///
/// Every attempt merges against a freshly read snapshot, so a write that lost the race
/// to another writer is rebuilt on top of that writer's changes before it is retried.
#[derive(Debug)]
pub struct NamespaceController<S: PolicyStore> {
    store: Arc<S>,
    batch: NamespaceBatch,
    max_attempts: u32,
    backoff: Backoff,
    cancellation: CancellationToken,
}

impl<S: PolicyStore> NamespaceController<S> {
    pub fn new(
        store: Arc<S>,
        batch: NamespaceBatch,
        retry: &RetryConfig,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            store,
            batch,
            max_attempts: retry.max_attempts(),
            backoff: Backoff::from(retry),
            cancellation,
        }
    }

    pub async fn run(self) -> NamespaceOutcome {
        let namespace = &self.batch.namespace;
        if !self.batch.is_valid() {
            let invalid = self.batch.item_errors.len();
            warn!("Rejecting {invalid} invalid item(s) for namespace: {namespace}, nothing will be written.");
            return self.outcome(
                0,
                NamespaceStatus::Failed {
                    error: PolicyError::InvalidBatchItems(namespace.to_string(), invalid),
                    item_errors: self.batch.item_errors.clone(),
                },
            );
        }

        let mut attempt = 0;
        loop {
            if self.cancellation.is_cancelled() {
                return self.cancelled(attempt);
            }

            attempt += 1;
            let (version, snapshot) = match self.store.read(namespace).await {
                Ok(Some(policy)) => (policy.version, policy.document),
                Ok(None) => (Version::ABSENT, PolicyDocument::new()),
                Err(error) => {
                    warn!("Failed to read policies for namespace: {namespace}, error: {error}");
                    return self.failed(attempt, error);
                }
            };

            let merged = merge(&snapshot, &self.batch.operations);
            if merged == snapshot {
                debug!("Policies for namespace: {namespace} are already up to date at version: {version}");
                return self.outcome(attempt, NamespaceStatus::Unchanged { version });
            }

            // Never raced with cancellation, the result of a write in flight is always observed.
            match self
                .store
                .write_if_version(namespace, &merged, version)
                .await
            {
                Ok(WriteOutcome::Committed(version)) => {
                    info!(
                        "Committed {} item(s) for namespace: {namespace} at version: {version}, attempt: {attempt}",
                        self.batch.items.len()
                    );
                    return self.outcome(attempt, NamespaceStatus::Committed { version });
                }
                Ok(WriteOutcome::VersionConflict { current }) => {
                    debug!("Version conflict for namespace: {namespace}, expected: {version}, current: {current}, attempt: {attempt}");
                }
                Err(error) => {
                    warn!("Failed to write policies for namespace: {namespace}, error: {error}");
                    return self.failed(attempt, error);
                }
            }

            if attempt >= self.max_attempts {
                warn!("Namespace: {namespace} is still conflicting after {attempt} attempt(s), giving up.");
                return self.failed(
                    attempt,
                    PolicyError::NamespaceConflictExceeded(namespace.to_string(), attempt),
                );
            }

            let delay = self.backoff.delay(attempt);
            tokio::select! {
                _ = self.cancellation.cancelled() => return self.cancelled(attempt),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn cancelled(&self, attempts: u32) -> NamespaceOutcome {
        debug!(
            "Policy update for namespace: {} cancelled after {attempts} attempt(s).",
            self.batch.namespace
        );
        self.failed(
            attempts,
            PolicyError::BatchCancelled(self.batch.namespace.to_string()),
        )
    }

    fn failed(&self, attempts: u32, error: PolicyError) -> NamespaceOutcome {
        self.outcome(
            attempts,
            NamespaceStatus::Failed {
                error,
                item_errors: Vec::new(),
            },
        )
    }

    fn outcome(&self, attempts: u32, status: NamespaceStatus) -> NamespaceOutcome {
        NamespaceOutcome {
            namespace: self.batch.namespace.clone(),
            items: self.batch.items.clone(),
            attempts,
            status,
        }
    }
}
