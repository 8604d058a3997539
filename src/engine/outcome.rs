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
use crate::models::policy_document::Version;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemError {
    pub index: usize,
    pub error: PolicyError,
}

impl ItemError {
    pub fn new(index: usize, error: PolicyError) -> Self {
        Self { index, error }
    }
}

impl Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item: {} - {}", self.index, self.error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceStatus {
    /// The merged document was written and the store assigned `version`.
    Committed { version: Version },
    /// The merged document equals the stored one, nothing had to be written.
    Unchanged { version: Version },
    Failed {
        error: PolicyError,
        item_errors: Vec<ItemError>,
    },
}

/// Result of one namespace's sub-batch. A namespace is applied atomically: either every
/// item in `items` took effect or none did.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceOutcome {
    pub namespace: NamespaceId,
    pub items: Vec<usize>,
    pub attempts: u32,
    pub status: NamespaceStatus,
}

impl NamespaceOutcome {
    pub fn failed(
        namespace: NamespaceId,
        items: Vec<usize>,
        attempts: u32,
        error: PolicyError,
    ) -> Self {
        Self {
            namespace,
            items,
            attempts,
            status: NamespaceStatus::Failed {
                error,
                item_errors: Vec::new(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.status, NamespaceStatus::Failed { .. })
    }

    pub fn applied_items(&self) -> &[usize] {
        if self.is_success() {
            &self.items
        } else {
            &[]
        }
    }

    pub fn error(&self) -> Option<&PolicyError> {
        match &self.status {
            NamespaceStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn version(&self) -> Option<Version> {
        match &self.status {
            NamespaceStatus::Committed { version } | NamespaceStatus::Unchanged { version } => {
                Some(*version)
            }
            NamespaceStatus::Failed { .. } => None,
        }
    }
}

impl Display for NamespaceOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            NamespaceStatus::Committed { version } => write!(
                f,
                "{}: committed {} item(s) at version: {version} after {} attempt(s)",
                self.namespace,
                self.items.len(),
                self.attempts
            ),
            NamespaceStatus::Unchanged { version } => write!(
                f,
                "{}: unchanged at version: {version}",
                self.namespace
            ),
            NamespaceStatus::Failed { error, .. } => {
                write!(f, "{}: failed - {error}", self.namespace)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    PartialFailure,
    Failed,
}

/// One outcome per namespace touched by the batch, plus the items whose topic had no namespace.
///
/// Commits are atomic per namespace and best effort across namespaces: some namespaces may
/// be committed while others failed, and nothing is rolled back. Resubmitting only the
/// failed items is safe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub outcomes: Vec<NamespaceOutcome>,
    pub unresolved: Vec<ItemError>,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty() && self.unresolved.is_empty()
    }

    pub fn outcome(&self, namespace: &NamespaceId) -> Option<&NamespaceOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| &outcome.namespace == namespace)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &NamespaceOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &NamespaceOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn status(&self) -> BatchStatus {
        let succeeded = self.succeeded().count();
        let failed = self.failed_count();
        match (succeeded, failed) {
            (_, 0) => BatchStatus::Completed,
            (0, _) => BatchStatus::Failed,
            _ => BatchStatus::PartialFailure,
        }
    }

    /// `PartialBatchFailure` with the failed and total namespace counts and the number of
    /// unresolved items, when some namespaces committed while something else failed.
    pub fn partial_failure(&self) -> Option<PolicyError> {
        match self.status() {
            BatchStatus::PartialFailure => Some(PolicyError::PartialBatchFailure(
                self.failed().count(),
                self.outcomes.len(),
                self.unresolved.len(),
            )),
            _ => None,
        }
    }

    /// Indices of every item that did not take effect.
    pub fn failed_items(&self) -> Vec<usize> {
        let mut items = self
            .failed()
            .flat_map(|outcome| outcome.items.iter().copied())
            .chain(self.unresolved.iter().map(|item| item.index))
            .collect::<Vec<_>>();
        items.sort_unstable();
        items
    }

    fn failed_count(&self) -> usize {
        self.failed().count() + self.unresolved.len()
    }
}
