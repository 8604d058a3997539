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

use crate::engine::outcome::ItemError;
use crate::engine::resolver::NamespaceResolver;
use crate::error::PolicyError;
use crate::models::namespace::NamespaceId;
use crate::models::topic::{Role, TopicName};
use crate::requests::operation::{IndexedOperation, PolicyOperation};
use crate::requests::{BatchRequest, PermissionRequest};
use crate::validatable::Validatable;
use std::collections::BTreeMap;
use tracing::debug;

/// Sub-batch of the caller's request addressed to a single namespace, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceBatch {
    pub namespace: NamespaceId,
    pub items: Vec<usize>,
    pub operations: Vec<IndexedOperation>,
    pub item_errors: Vec<ItemError>,
}

impl NamespaceBatch {
    fn new(namespace: NamespaceId) -> Self {
        Self {
            namespace,
            items: Vec::new(),
            operations: Vec::new(),
            item_errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.item_errors.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedBatch {
    pub namespaces: BTreeMap<NamespaceId, NamespaceBatch>,
    pub unresolved: Vec<ItemError>,
}

impl PartitionedBatch {
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.unresolved.is_empty()
    }
}

/// Groups the batch by owning namespace. Pure, performs no store access.
pub fn partition(batch: &BatchRequest, resolver: &dyn NamespaceResolver) -> PartitionedBatch {
    let mut partitioned = PartitionedBatch::default();
    for (index, request) in batch.items().iter().enumerate() {
        let topic = match resolver.resolve(request.topic()) {
            Ok(topic) => topic,
            Err(error) => {
                debug!("Batch item: {index} ({request}) cannot be resolved: {error}");
                partitioned.unresolved.push(ItemError::new(index, error));
                continue;
            }
        };

        let namespace_batch = partitioned
            .namespaces
            .entry(topic.namespace().clone())
            .or_insert_with(|| NamespaceBatch::new(topic.namespace().clone()));
        namespace_batch.items.push(index);
        match to_operation(request, topic) {
            Ok(operation) => namespace_batch
                .operations
                .push(IndexedOperation::new(index, operation)),
            Err(error) => {
                debug!("Batch item: {index} ({request}) is invalid: {error}");
                namespace_batch.item_errors.push(ItemError::new(index, error));
            }
        }
    }

    partitioned
}

fn to_operation(
    request: &PermissionRequest,
    topic: TopicName,
) -> Result<PolicyOperation, PolicyError> {
    let role = Role::new(request.role())?;
    match request {
        PermissionRequest::Grant(grant) => {
            grant.validate()?;
            PolicyOperation::grant(topic, role, grant.actions.clone())
        }
        PermissionRequest::Revoke(_) => Ok(PolicyOperation::revoke(topic, role)),
    }
}
