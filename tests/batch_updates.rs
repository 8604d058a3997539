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

mod common;

use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use topic_policies::prelude::*;

#[tokio::test]
async fn should_apply_mixed_batch_within_one_namespace() {
    init_tracing();
    let store = Arc::new(MemoryPolicyStore::new());
    let service = PolicyService::new(store.clone(), &config(3));
    let request = BatchRequest::new()
        .grant("acme/orders/topic1", "role1", [Action::Produce])
        .grant("acme/orders/topic2", "role2", [Action::Consume])
        .revoke("acme/orders/topic1", "role1");

    let result = service.apply_batch(&request).await;

    assert_eq!(result.status(), BatchStatus::Completed);
    let outcome = result.outcome(&namespace("acme/orders")).unwrap();
    assert_eq!(outcome.applied_items(), &[0, 1, 2]);
    let policy = service
        .get_namespace_policies(&namespace("acme/orders"))
        .await
        .unwrap()
        .unwrap();
    assert!(policy
        .document
        .get(&topic("acme/orders/topic1"), &role("role1"))
        .is_none());
    assert!(policy
        .document
        .topic_permissions(&topic("acme/orders/topic1"))
        .is_none());
    assert_eq!(
        policy
            .document
            .get(&topic("acme/orders/topic2"), &role("role2")),
        Some(&ActionSet::from([Action::Consume]))
    );
    assert_eq!(policy.version, Version::INITIAL);
}

#[tokio::test]
async fn empty_batch_should_return_empty_result_without_store_access() {
    init_tracing();
    let store = Arc::new(MemoryPolicyStore::new());
    let service = PolicyService::new(store.clone(), &config(3));

    let result = service.apply_batch(&BatchRequest::new()).await;

    assert!(result.is_empty());
    assert_eq!(result.status(), BatchStatus::Completed);
    assert_eq!(store.accesses(), 0);
}

#[tokio::test]
async fn invalid_namespace_should_not_block_valid_one() {
    init_tracing();
    let store = Arc::new(MemoryPolicyStore::new());
    let service = PolicyService::new(store.clone(), &config(3));
    let request = BatchRequest::new()
        .grant("acme/broken/t1", "r1", [Action::Produce])
        .grant("acme/healthy/t1", "r1", [Action::Consume])
        .grant("acme/broken/t2", "r2", ActionSet::new());

    let result = service.apply_batch(&request).await;

    assert_eq!(result.status(), BatchStatus::PartialFailure);
    assert_eq!(
        result.partial_failure(),
        Some(PolicyError::PartialBatchFailure(1, 2, 0))
    );
    let broken = result.outcome(&namespace("acme/broken")).unwrap();
    assert_eq!(
        broken.error(),
        Some(&PolicyError::InvalidBatchItems("acme/broken".to_owned(), 1))
    );
    assert!(broken.applied_items().is_empty());
    let healthy = result.outcome(&namespace("acme/healthy")).unwrap();
    assert!(healthy.is_success());
    assert_eq!(result.failed_items(), vec![0, 2]);

    assert!(store
        .read(&namespace("acme/broken"))
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        service.get_permissions("acme/healthy/t1").await.unwrap()[&role("r1")],
        ActionSet::from([Action::Consume])
    );
}

#[tokio::test]
async fn unresolvable_topics_should_be_reported_per_item() {
    init_tracing();
    let service = PolicyService::new(Arc::new(MemoryPolicyStore::new()), &config(3));
    let request = BatchRequest::new()
        .grant("nowhere", "r1", [Action::Produce])
        .grant("acme/orders/t1", "r1", [Action::Produce]);

    let result = service.apply_batch(&request).await;

    assert_eq!(result.status(), BatchStatus::PartialFailure);
    assert_eq!(result.unresolved.len(), 1);
    assert_eq!(result.unresolved[0].index, 0);
    assert_eq!(
        result.unresolved[0].error,
        PolicyError::UnresolvableTopic("nowhere".to_owned())
    );
    assert!(result.outcome(&namespace("acme/orders")).unwrap().is_success());
}

#[tokio::test]
async fn retry_after_conflict_should_preserve_other_writers_grant() {
    init_tracing();
    let store = Arc::new(InterleavingStore::default());
    store.interfere_with(ForeignGrant {
        topic: topic("acme/orders/audit"),
        role: role("auditor"),
        actions: ActionSet::from([Action::Consume]),
    });
    let service = PolicyService::new(store.clone(), &config(3));

    let outcome = service
        .grant_permission(
            "acme/orders/created",
            "writer",
            ActionSet::from([Action::Produce]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.version(), Some(Version::new(2)));
    assert_eq!(store.inner.conflicts(), 1);
    let policy = store
        .read(&namespace("acme/orders"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        policy
            .document
            .get(&topic("acme/orders/audit"), &role("auditor")),
        Some(&ActionSet::from([Action::Consume]))
    );
    assert_eq!(
        policy
            .document
            .get(&topic("acme/orders/created"), &role("writer")),
        Some(&ActionSet::from([Action::Produce]))
    );
}

#[tokio::test]
async fn exhausted_retries_should_fail_with_conflict_exceeded() {
    init_tracing();
    let store = Arc::new(ContendedStore::default());
    let service = PolicyService::new(store.clone(), &config(2));
    let request = BatchRequest::new().grant("acme/orders/t1", "r1", [Action::Produce]);

    let result = service.apply_batch(&request).await;

    assert_eq!(result.status(), BatchStatus::Failed);
    let outcome = result.outcome(&namespace("acme/orders")).unwrap();
    assert_eq!(
        outcome.error(),
        Some(&PolicyError::NamespaceConflictExceeded(
            "acme/orders".to_owned(),
            3
        ))
    );
    assert!(outcome.error().unwrap().is_conflict());
    assert_eq!(outcome.attempts, 3);
    assert_eq!(store.writes.load(Ordering::SeqCst), 3);
    assert_eq!(store.inner.reads(), 3);
}

#[tokio::test]
async fn store_outage_should_be_reported_distinctly_from_conflicts() {
    init_tracing();
    let store = Arc::new(PartiallyAvailableStore {
        inner: MemoryPolicyStore::new(),
        unavailable: vec![namespace("acme/down")],
    });
    let service = PolicyService::new(store.clone(), &config(5));
    let request = BatchRequest::new()
        .grant("acme/down/t1", "r1", [Action::Produce])
        .grant("acme/up/t1", "r1", [Action::Produce]);

    let result = service.apply_batch(&request).await;

    assert_eq!(result.status(), BatchStatus::PartialFailure);
    let down = result.outcome(&namespace("acme/down")).unwrap();
    let error = down.error().unwrap();
    assert!(error.is_store_error());
    assert!(!error.is_conflict());
    assert_eq!(down.attempts, 1);
    assert!(result.outcome(&namespace("acme/up")).unwrap().is_success());
}

#[tokio::test]
async fn timeout_should_cancel_namespaces_still_retrying() {
    init_tracing();
    let store = Arc::new(ContendedStore::default());
    let mut config = config(100);
    config.retry.initial_backoff = PolicyDuration::from_millis(10_000);
    config.retry.max_backoff = PolicyDuration::from_millis(10_000);
    config.batch.timeout = PolicyDuration::from_millis(50);
    let service = PolicyService::new(store.clone(), &config);
    let request = BatchRequest::new().grant("acme/orders/t1", "r1", [Action::Produce]);

    let started = tokio::time::Instant::now();
    let result = service.apply_batch(&request).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    let outcome = result.outcome(&namespace("acme/orders")).unwrap();
    assert_eq!(
        outcome.error(),
        Some(&PolicyError::BatchCancelled("acme/orders".to_owned()))
    );
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.applied_items().is_empty());
}

#[tokio::test]
async fn write_in_flight_should_resolve_despite_timeout() {
    init_tracing();
    let store = Arc::new(SlowCommitStore::new(Duration::from_millis(200)));
    let mut config = config(3);
    config.batch.timeout = PolicyDuration::from_millis(20);
    let service = PolicyService::new(store.clone(), &config);
    let request = BatchRequest::new().grant("acme/orders/t1", "r1", [Action::Produce]);

    let result = service.apply_batch(&request).await;

    let outcome = result.outcome(&namespace("acme/orders")).unwrap();
    assert_eq!(
        outcome.status,
        NamespaceStatus::Committed {
            version: Version::INITIAL
        }
    );
    assert!(store
        .inner
        .read(&namespace("acme/orders"))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn caller_cancellation_should_stop_the_batch() {
    init_tracing();
    let store = Arc::new(MemoryPolicyStore::new());
    let service = PolicyService::new(store.clone(), &config(3));
    let cancellation = CancellationToken::new();
    cancellation.cancel();
    let request = BatchRequest::new().grant("acme/orders/t1", "r1", [Action::Produce]);

    let result = service
        .apply_batch_with_cancellation(&request, cancellation)
        .await;

    assert_eq!(result.status(), BatchStatus::Failed);
    assert_eq!(store.accesses(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_should_never_lose_updates() {
    init_tracing();
    let store = Arc::new(MemoryPolicyStore::new());
    let service = Arc::new(PolicyService::new(store.clone(), &config(100)));

    let mut writers = Vec::new();
    for writer in 0..16 {
        let service = service.clone();
        writers.push(tokio::spawn(async move {
            service
                .grant_permission(
                    &format!("acme/orders/topic-{writer}"),
                    &format!("role-{writer}"),
                    ActionSet::from([Action::Produce, Action::Consume]),
                )
                .await
        }));
    }
    for writer in writers {
        assert!(writer.await.unwrap().unwrap().is_success());
    }

    let policy = store
        .read(&namespace("acme/orders"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(policy.document.topics_count(), 16);
    assert_eq!(policy.version, Version::new(16));
    for writer in 0..16 {
        assert_eq!(
            policy.document.get(
                &topic(&format!("acme/orders/topic-{writer}")),
                &role(&format!("role-{writer}"))
            ),
            Some(&ActionSet::from([Action::Produce, Action::Consume]))
        );
    }
}

#[tokio::test]
async fn later_items_should_override_earlier_ones_on_same_pair() {
    init_tracing();
    let service = PolicyService::new(Arc::new(MemoryPolicyStore::new()), &config(3));
    let request = BatchRequest::new()
        .grant("acme/orders/t1", "r1", [Action::Produce])
        .revoke("acme/orders/t1", "r1")
        .grant("acme/orders/t1", "r1", [Action::Functions, Action::Sinks]);

    service.apply_batch(&request).await;

    let permissions = service.get_permissions("acme/orders/t1").await.unwrap();
    assert_eq!(
        permissions[&role("r1")],
        ActionSet::from([Action::Functions, Action::Sinks])
    );
}
