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

use crate::models::policy_document::PolicyDocument;
use crate::requests::operation::{IndexedOperation, PolicyOperation};

/// Applies the operations to a copy of the snapshot in submission order.
///
/// Grants replace the role's action set, they never union with what the role already held,
/// so a later operation on the same (topic, role) always wins. Revoking an absent entry is a no-op.
/// Topics left without roles are dropped.
///
/// Deterministic and free of I/O: the controller reruns it against every freshly read snapshot.
pub fn merge(snapshot: &PolicyDocument, operations: &[IndexedOperation]) -> PolicyDocument {
    let mut document = operations
        .iter()
        .fold(snapshot.clone(), |mut document, indexed| {
            match &indexed.operation {
                PolicyOperation::Grant(grant) => document.grant(
                    grant.topic().clone(),
                    grant.role().clone(),
                    grant.actions().clone(),
                ),
                PolicyOperation::Revoke(revoke) => {
                    document.revoke(revoke.topic(), revoke.role());
                }
            }
            document
        });
    document.prune();
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::action::{Action, ActionSet};
    use crate::models::topic::{Role, TopicName};
    use std::str::FromStr;

    fn topic(name: &str) -> TopicName {
        TopicName::from_str(name).unwrap()
    }

    fn role(name: &str) -> Role {
        Role::new(name).unwrap()
    }

    fn grant(index: usize, topic_name: &str, role_name: &str, actions: &[Action]) -> IndexedOperation {
        IndexedOperation::new(
            index,
            PolicyOperation::grant(
                topic(topic_name),
                role(role_name),
                actions.iter().copied().collect(),
            )
            .unwrap(),
        )
    }

    fn revoke(index: usize, topic_name: &str, role_name: &str) -> IndexedOperation {
        IndexedOperation::new(
            index,
            PolicyOperation::revoke(topic(topic_name), role(role_name)),
        )
    }

    #[test]
    fn grant_then_revoke_should_leave_no_entry() {
        let merged = merge(
            &PolicyDocument::new(),
            &[
                grant(0, "a/ns/t1", "r1", &[Action::Produce]),
                revoke(1, "a/ns/t1", "r1"),
            ],
        );

        assert!(merged.get(&topic("a/ns/t1"), &role("r1")).is_none());
        assert!(merged.is_empty());
    }

    #[test]
    fn revoke_then_grant_should_yield_granted_actions() {
        let mut snapshot = PolicyDocument::new();
        snapshot.grant(topic("a/ns/t1"), role("r1"), ActionSet::from([Action::Sinks]));

        let merged = merge(
            &snapshot,
            &[
                revoke(0, "a/ns/t1", "r1"),
                grant(1, "a/ns/t1", "r1", &[Action::Consume]),
            ],
        );

        assert_eq!(
            merged.get(&topic("a/ns/t1"), &role("r1")),
            Some(&ActionSet::from([Action::Consume]))
        );
    }

    #[test]
    fn grant_should_replace_rather_than_union() {
        let mut snapshot = PolicyDocument::new();
        snapshot.grant(topic("a/ns/t1"), role("r1"), ActionSet::from([Action::Produce]));

        let merged = merge(&snapshot, &[grant(0, "a/ns/t1", "r1", &[Action::Consume])]);

        assert_eq!(
            merged.get(&topic("a/ns/t1"), &role("r1")),
            Some(&ActionSet::from([Action::Consume]))
        );
    }

    #[test]
    fn revoking_unknown_entry_should_be_a_no_op() {
        let mut snapshot = PolicyDocument::new();
        snapshot.grant(topic("a/ns/t1"), role("r1"), ActionSet::from([Action::Produce]));

        let merged = merge(
            &snapshot,
            &[revoke(0, "a/ns/t1", "ghost"), revoke(1, "a/ns/t9", "r1")],
        );

        assert_eq!(merged, snapshot);
    }

    #[test]
    fn applying_same_grant_twice_should_be_idempotent() {
        let operations = [grant(0, "a/ns/t1", "r1", &[Action::Produce, Action::Consume])];
        let once = merge(&PolicyDocument::new(), &operations);
        let twice = merge(&once, &operations);

        assert_eq!(once, twice);
    }

    #[test]
    fn merging_no_operations_should_return_identical_document() {
        let merged = merge(
            &PolicyDocument::new(),
            &[
                grant(0, "a/ns/t1", "r1", &[Action::Produce]),
                grant(1, "a/ns/t2", "r2", &[Action::Consume]),
            ],
        );

        assert_eq!(merge(&merged, &[]), merged);
    }

    #[test]
    fn should_keep_other_roles_and_drop_emptied_topics() {
        let merged = merge(
            &PolicyDocument::new(),
            &[
                grant(0, "a/ns/topic1", "role1", &[Action::Produce]),
                grant(1, "a/ns/topic2", "role2", &[Action::Consume]),
                revoke(2, "a/ns/topic1", "role1"),
            ],
        );

        assert!(merged.topic_permissions(&topic("a/ns/topic1")).is_none());
        assert_eq!(
            merged.get(&topic("a/ns/topic2"), &role("role2")),
            Some(&ActionSet::from([Action::Consume]))
        );
        assert_eq!(merged.topics_count(), 1);
    }
}
