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

use crate::configs::PolicyConfig;
use crate::engine::coordinator::BatchCoordinator;
use crate::engine::outcome::{BatchResult, NamespaceOutcome, NamespaceStatus};
use crate::engine::resolver::{NamespaceResolver, QualifiedNameResolver};
use crate::error::PolicyError;
use crate::models::action::ActionSet;
use crate::models::namespace::NamespaceId;
use crate::models::policy_document::{TopicPermissions, VersionedPolicy};
use crate::requests::BatchRequest;
use crate::store::{PolicyStore, PolicyStoreKind};
use crate::validatable::Validatable;
use error_set::ErrContext;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const COMPONENT: &str = "POLICY_SERVICE";

/// Entry point of the administrative layer for topic permissions.
///
/// Batches are committed atomically per namespace and best effort across namespaces, see
/// [`BatchResult`]. Nothing is cached between calls: every call reads the current documents.
#[derive(Debug)]
pub struct PolicyService<S: PolicyStore + 'static> {
    coordinator: BatchCoordinator<S>,
}

impl PolicyService<PolicyStoreKind> {
    pub fn from_config(config: &PolicyConfig) -> Result<Self, PolicyError> {
        config.validate().with_error_context(|error| {
            format!("{COMPONENT} (error: {error}) - invalid policy service configuration")
        })?;
        Ok(Self::new(
            Arc::new(PolicyStoreKind::from_config(&config.store)),
            config,
        ))
    }
}

impl<S: PolicyStore + 'static> PolicyService<S> {
    pub fn new(store: Arc<S>, config: &PolicyConfig) -> Self {
        Self::with_resolver(store, Arc::new(QualifiedNameResolver), config)
    }

    pub fn with_resolver(
        store: Arc<S>,
        resolver: Arc<dyn NamespaceResolver>,
        config: &PolicyConfig,
    ) -> Self {
        Self {
            coordinator: BatchCoordinator::new(store, resolver, config.retry, config.batch),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        self.coordinator.store()
    }

    #[instrument(skip_all, name = "trace_apply_policy_batch", fields(items = request.len()))]
    pub async fn apply_batch(&self, request: &BatchRequest) -> BatchResult {
        self.coordinator.apply_batch(request).await
    }

    #[instrument(skip_all, name = "trace_apply_policy_batch", fields(items = request.len()))]
    pub async fn apply_batch_with_cancellation(
        &self,
        request: &BatchRequest,
        cancellation: CancellationToken,
    ) -> BatchResult {
        self.coordinator
            .apply_batch_with_cancellation(request, cancellation)
            .await
    }

    #[instrument(skip_all, name = "trace_grant_permission", fields(topic = topic, role = role))]
    pub async fn grant_permission(
        &self,
        topic: &str,
        role: &str,
        actions: ActionSet,
    ) -> Result<NamespaceOutcome, PolicyError> {
        let request = BatchRequest::new().grant(topic, role, actions);
        self.apply_single(&request).await
    }

    #[instrument(skip_all, name = "trace_revoke_permission", fields(topic = topic, role = role))]
    pub async fn revoke_permission(
        &self,
        topic: &str,
        role: &str,
    ) -> Result<NamespaceOutcome, PolicyError> {
        let request = BatchRequest::new().revoke(topic, role);
        self.apply_single(&request).await
    }

    /// Roles and their actions on the topic, empty when nothing was granted.
    #[instrument(skip_all, name = "trace_get_permissions", fields(topic = topic))]
    pub async fn get_permissions(&self, topic: &str) -> Result<TopicPermissions, PolicyError> {
        let topic = self.coordinator.resolver().resolve(topic)?;
        let policy = self
            .coordinator
            .store()
            .read(topic.namespace())
            .await
            .with_error_context(|error| {
                format!("{COMPONENT} (error: {error}) - failed to read permissions for topic: {topic}")
            })?;
        Ok(policy
            .and_then(|policy| policy.document.topic_permissions(&topic).cloned())
            .unwrap_or_default())
    }

    #[instrument(skip_all, name = "trace_get_namespace_policies", fields(namespace = %namespace))]
    pub async fn get_namespace_policies(
        &self,
        namespace: &NamespaceId,
    ) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.coordinator
            .store()
            .read(namespace)
            .await
            .with_error_context(|error| {
                format!("{COMPONENT} (error: {error}) - failed to read policies for namespace: {namespace}")
            })
    }

    async fn apply_single(&self, request: &BatchRequest) -> Result<NamespaceOutcome, PolicyError> {
        let mut result = self.coordinator.apply_batch(request).await;
        if let Some(unresolved) = result.unresolved.pop() {
            return Err(unresolved.error);
        }

        let outcome = result.outcomes.pop().ok_or(PolicyError::Error)?;
        match outcome.status {
            NamespaceStatus::Failed {
                error,
                mut item_errors,
            } => {
                debug!("Single permission update failed: {error}");
                Err(item_errors.pop().map(|item| item.error).unwrap_or(error))
            }
            _ => Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::store::StoreKind;
    use crate::models::action::Action;
    use crate::models::policy_document::Version;
    use crate::models::topic::Role;
    use crate::store::memory::MemoryPolicyStore;
    use std::str::FromStr;

    fn service() -> PolicyService<MemoryPolicyStore> {
        PolicyService::new(Arc::new(MemoryPolicyStore::new()), &PolicyConfig::default())
    }

    #[tokio::test]
    async fn granted_permissions_should_be_readable() {
        let service = service();
        service
            .grant_permission(
                "acme/orders/created",
                "writer",
                ActionSet::from([Action::Produce]),
            )
            .await
            .unwrap();

        let permissions = service
            .get_permissions("persistent://acme/orders/created-partition-1")
            .await
            .unwrap();

        assert_eq!(
            permissions.get(&Role::new("writer").unwrap()),
            Some(&ActionSet::from([Action::Produce]))
        );
    }

    #[tokio::test]
    async fn revoke_should_remove_permission() {
        let service = service();
        service
            .grant_permission("acme/orders/created", "writer", ActionSet::from([Action::Produce]))
            .await
            .unwrap();

        let outcome = service
            .revoke_permission("acme/orders/created", "writer")
            .await
            .unwrap();

        assert_eq!(outcome.version(), Some(Version::new(2)));
        assert!(service
            .get_permissions("acme/orders/created")
            .await
            .unwrap()
            .is_empty());
        let policies = service
            .get_namespace_policies(&NamespaceId::from_str("acme/orders").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(policies.document.is_empty());
    }

    #[tokio::test]
    async fn single_grant_should_report_the_item_error() {
        let service = service();

        let error = service
            .grant_permission("acme/orders/created", "writer", ActionSet::new())
            .await
            .unwrap_err();

        assert_eq!(
            error,
            PolicyError::EmptyActionSet("acme/orders/created".to_owned(), "writer".to_owned())
        );
    }

    #[tokio::test]
    async fn unresolvable_topic_should_be_rejected() {
        let service = service();

        let error = service
            .revoke_permission("not-a-topic", "writer")
            .await
            .unwrap_err();

        assert_eq!(error, PolicyError::UnresolvableTopic("not-a-topic".to_owned()));
        assert_eq!(
            service.get_permissions("not-a-topic").await.unwrap_err(),
            PolicyError::UnresolvableTopic("not-a-topic".to_owned())
        );
    }

    #[test]
    fn should_build_store_from_config() {
        let mut config = PolicyConfig::default();
        let service = PolicyService::from_config(&config).unwrap();
        assert!(matches!(service.store().as_ref(), PolicyStoreKind::Memory(_)));

        config.batch.max_concurrent_namespaces = 0;
        assert_eq!(
            PolicyService::from_config(&config).unwrap_err(),
            PolicyError::InvalidConfiguration
        );

        config.batch.max_concurrent_namespaces = 1;
        config.store.kind = StoreKind::File;
        let service = PolicyService::from_config(&config).unwrap();
        assert!(matches!(service.store().as_ref(), PolicyStoreKind::File(_)));
    }
}
