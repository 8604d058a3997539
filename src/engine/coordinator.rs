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

use crate::configs::batch::BatchConfig;
use crate::configs::retry::RetryConfig;
use crate::engine::controller::NamespaceController;
use crate::engine::outcome::{BatchResult, NamespaceOutcome};
use crate::engine::partitioner::partition;
use crate::engine::resolver::NamespaceResolver;
use crate::error::PolicyError;
use crate::models::namespace::NamespaceId;
use crate::requests::BatchRequest;
use crate::store::PolicyStore;
use ahash::AHashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

/// Fans a batch out to one [`NamespaceController`] per namespace and gathers their outcomes.
///
/// Namespaces run independently: a failing namespace never aborts the others and
/// nothing committed is rolled back.
#[derive(Debug)]
pub struct BatchCoordinator<S: PolicyStore + 'static> {
    store: Arc<S>,
    resolver: Arc<dyn NamespaceResolver>,
    retry: RetryConfig,
    batch: BatchConfig,
}

impl<S: PolicyStore + 'static> BatchCoordinator<S> {
    pub fn new(
        store: Arc<S>,
        resolver: Arc<dyn NamespaceResolver>,
        retry: RetryConfig,
        batch: BatchConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            retry,
            batch,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn resolver(&self) -> &dyn NamespaceResolver {
        self.resolver.as_ref()
    }

    pub async fn apply_batch(&self, request: &BatchRequest) -> BatchResult {
        self.apply_batch_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Cancelling `cancellation` stops every namespace that is still retrying, like the
    /// configured batch timeout does. Writes already in flight are awaited.
    pub async fn apply_batch_with_cancellation(
        &self,
        request: &BatchRequest,
        cancellation: CancellationToken,
    ) -> BatchResult {
        let partitioned = partition(request, self.resolver.as_ref());
        if partitioned.is_empty() {
            return BatchResult::default();
        }

        let cancellation = cancellation.child_token();
        let semaphore = Arc::new(Semaphore::new(self.batch.max_concurrent_namespaces.max(1)));
        let mut pending: AHashMap<NamespaceId, Vec<usize>> =
            AHashMap::with_capacity(partitioned.namespaces.len());
        let mut tasks = JoinSet::new();
        for (namespace, namespace_batch) in partitioned.namespaces {
            pending.insert(namespace.clone(), namespace_batch.items.clone());
            let controller = NamespaceController::new(
                self.store.clone(),
                namespace_batch,
                &self.retry,
                cancellation.clone(),
            );
            let semaphore = semaphore.clone();
            let span = info_span!("namespace", namespace = %namespace);
            tasks.spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    controller.run().await
                }
                .instrument(span),
            );
        }

        let timeout = self.batch.timeout.get_duration();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);
        let mut deadline_armed = !timeout.is_zero();
        let mut outcomes = Vec::with_capacity(pending.len());
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(Ok(outcome)) => {
                        pending.remove(&outcome.namespace);
                        outcomes.push(outcome);
                    }
                    Some(Err(join_error)) => {
                        error!("Namespace policy update task failed: {join_error}");
                    }
                    None => break,
                },
                _ = &mut deadline, if deadline_armed => {
                    deadline_armed = false;
                    warn!(
                        "Batch timed out after {}, cancelling {} namespace(s) still in progress.",
                        self.batch.timeout,
                        pending.len()
                    );
                    cancellation.cancel();
                }
            }
        }

        // Tasks that panicked never reported an outcome.
        outcomes.extend(pending.into_iter().map(|(namespace, items)| {
            NamespaceOutcome::failed(namespace, items, 0, PolicyError::Error)
        }));
        outcomes.sort_by(|left, right| left.namespace.cmp(&right.namespace));

        let result = BatchResult {
            outcomes,
            unresolved: partitioned.unresolved,
        };
        info!(
            "Applied batch of {} item(s) across {} namespace(s), status: {:?}",
            request.len(),
            result.outcomes.len(),
            result.status()
        );
        result
    }
}
