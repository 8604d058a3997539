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
use crate::models::topic::TopicName;
#[cfg(test)]
use mockall::automock;
use std::fmt::Debug;
use std::str::FromStr;

/// Maps a caller-supplied topic name to the canonical topic whose namespace owns its policies.
/// Every topic belongs to exactly one namespace, available through [`TopicName::namespace`].
#[cfg_attr(test, automock)]
pub trait NamespaceResolver: Send + Sync + Debug {
    fn resolve(&self, topic: &str) -> Result<TopicName, PolicyError>;
}

/// Resolves `{domain}://{tenant}/{namespace}/{topic}` and `{tenant}/{namespace}/{topic}` names.
/// Partitions (`{topic}-partition-{N}`) resolve to their partitioned topic.
#[derive(Debug, Default, Clone, Copy)]
pub struct QualifiedNameResolver;

impl NamespaceResolver for QualifiedNameResolver {
    fn resolve(&self, topic: &str) -> Result<TopicName, PolicyError> {
        TopicName::from_str(topic)
            .map(|topic| topic.partitioned_topic())
            .map_err(|_| PolicyError::UnresolvableTopic(topic.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_partition_to_partitioned_topic() {
        let topic = QualifiedNameResolver
            .resolve("persistent://acme/orders/created-partition-3")
            .unwrap();
        assert_eq!(topic.to_string(), "persistent://acme/orders/created");
        assert_eq!(topic.namespace().to_string(), "acme/orders");
    }

    #[test]
    fn malformed_topic_should_be_unresolvable() {
        assert_eq!(
            QualifiedNameResolver.resolve("created").unwrap_err(),
            PolicyError::UnresolvableTopic("created".to_owned())
        );
    }
}
