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
use crate::store::{PolicyStore, WriteOutcome, COMPONENT};
use error_set::ErrContext;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const DOCUMENT_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "json.lock";
const GUARD_EXTENSION: &str = "json.lock.guard";
const TEMP_EXTENSION: &str = "json.tmp";
const UNLOCK_ATTEMPTS: u32 = 50;
const UNLOCK_RETRY_INTERVAL: Duration = Duration::from_millis(2);

fn lock_token() -> String {
    format!("{}-{:016x}", std::process::id(), rand::random::<u64>())
}

async fn remove_file_if_exists(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => warn!(
            "{COMPONENT} (error: {error}) - failed to remove file: {}",
            path.display()
        ),
    }
}

/// Keeps one JSON document per namespace under `{path}/{tenant}/{namespace}.json`.
///
/// Writers serialize through a lock file created with `create_new` and stamped with an owner
/// token, a writer that finds the lock taken reports a version conflict instead of waiting.
/// Locks older than the stale lock timeout are broken, and a writer only commits or releases
/// a lock that still carries its token.
#[derive(Debug)]
pub struct FilePolicyStore {
    path: PathBuf,
    stale_lock_timeout: Duration,
}

impl FilePolicyStore {
    pub fn new(path: &str, stale_lock_timeout: Duration) -> Self {
        Self {
            path: PathBuf::from(path),
            stale_lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document_path(&self, namespace: &NamespaceId) -> PathBuf {
        self.file_path(namespace, DOCUMENT_EXTENSION)
    }

    fn lock_path(&self, namespace: &NamespaceId) -> PathBuf {
        self.file_path(namespace, LOCK_EXTENSION)
    }

    fn guard_path(&self, namespace: &NamespaceId) -> PathBuf {
        self.file_path(namespace, GUARD_EXTENSION)
    }

    fn temp_path(&self, namespace: &NamespaceId, token: &str) -> PathBuf {
        self.file_path(namespace, &format!("{token}.{TEMP_EXTENSION}"))
    }

    fn file_path(&self, namespace: &NamespaceId, extension: &str) -> PathBuf {
        self.path
            .join(namespace.tenant())
            .join(format!("{}.{extension}", namespace.namespace()))
    }

    async fn load(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        let path = self.document_path(namespace);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error)
                    .with_error_context(|error| {
                        format!(
                            "{COMPONENT} (error: {error}) - failed to read policy document: {}",
                            path.display()
                        )
                    })
                    .map_err(|_| PolicyError::StoreUnavailable(path.display().to_string()));
            }
        };

        let policy = serde_json::from_slice::<VersionedPolicy>(&bytes)
            .with_error_context(|error| {
                format!(
                    "{COMPONENT} (error: {error}) - failed to decode policy document: {}",
                    path.display()
                )
            })
            .map_err(|_| PolicyError::CorruptedPolicyDocument(namespace.to_string()))?;
        Ok(Some(policy))
    }

    fn current_version(policy: &Option<VersionedPolicy>) -> Version {
        policy
            .as_ref()
            .map(|policy| policy.version)
            .unwrap_or(Version::ABSENT)
    }

    /// Returns the owner token written into the lock file, `None` when another writer holds it.
    async fn try_lock(&self, namespace: &NamespaceId) -> Result<Option<String>, PolicyError> {
        let lock_path = self.lock_path(namespace);
        let token = lock_token();
        for _ in 0..2 {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
                .await
            {
                Ok(mut file) => {
                    if let Err(error) = file.write_all(token.as_bytes()).await {
                        remove_file_if_exists(&lock_path).await;
                        return Err(error)
                            .with_error_context(|error| {
                                format!(
                                    "{COMPONENT} (error: {error}) - failed to write lock file: {}",
                                    lock_path.display()
                                )
                            })
                            .map_err(|_| {
                                PolicyError::StoreUnavailable(lock_path.display().to_string())
                            });
                    }
                    return Ok(Some(token));
                }
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    if !self.break_stale_lock(namespace).await? {
                        return Ok(None);
                    }
                }
                Err(error) => {
                    return Err(error)
                        .with_error_context(|error| {
                            format!(
                                "{COMPONENT} (error: {error}) - failed to create lock file: {}",
                                lock_path.display()
                            )
                        })
                        .map_err(|_| {
                            PolicyError::StoreUnavailable(lock_path.display().to_string())
                        });
                }
            }
        }

        Ok(None)
    }

    /// Removes the lock file when it is older than the stale lock timeout. Returns `true` when
    /// the lock is gone and acquiring it may be retried.
    ///
    /// Lock files are only ever removed while holding the guard file, and a lock file cannot be
    /// recreated before it is removed, so the file found stale under the guard is the one removed.
    async fn break_stale_lock(&self, namespace: &NamespaceId) -> Result<bool, PolicyError> {
        let lock_path = self.lock_path(namespace);
        match self.file_age(&lock_path).await? {
            None => return Ok(true),
            Some(age) if age < self.stale_lock_timeout => return Ok(false),
            Some(_) => {}
        }

        let guard_path = self.guard_path(namespace);
        if !self.try_guard(&guard_path).await? {
            return Ok(false);
        }

        let result = match self.file_age(&lock_path).await {
            Ok(None) => Ok(true),
            Ok(Some(age)) if age < self.stale_lock_timeout => Ok(false),
            Ok(Some(age)) => {
                warn!(
                    "Breaking stale lock file: {} held for {} ms",
                    lock_path.display(),
                    age.as_millis()
                );
                match fs::remove_file(&lock_path).await {
                    Ok(()) => Ok(true),
                    Err(error) if error.kind() == ErrorKind::NotFound => Ok(true),
                    Err(error) => Err(error)
                        .with_error_context(|error| {
                            format!(
                                "{COMPONENT} (error: {error}) - failed to remove stale lock file: {}",
                                lock_path.display()
                            )
                        })
                        .map_err(|_| {
                            PolicyError::StoreUnavailable(lock_path.display().to_string())
                        }),
                }
            }
            Err(error) => Err(error),
        };
        remove_file_if_exists(&guard_path).await;
        result
    }

    /// Returns `false` when the guard is held by someone else. A guard left behind by a crashed
    /// writer is removed once it is older than the stale lock timeout.
    async fn try_guard(&self, guard_path: &Path) -> Result<bool, PolicyError> {
        for _ in 0..2 {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(guard_path)
                .await
            {
                Ok(_) => return Ok(true),
                Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                    match self.file_age(guard_path).await? {
                        None => continue,
                        Some(age) if age < self.stale_lock_timeout => return Ok(false),
                        Some(age) => {
                            warn!(
                                "Removing abandoned lock guard: {} held for {} ms",
                                guard_path.display(),
                                age.as_millis()
                            );
                            remove_file_if_exists(guard_path).await;
                        }
                    }
                }
                Err(error) => {
                    return Err(error)
                        .with_error_context(|error| {
                            format!(
                                "{COMPONENT} (error: {error}) - failed to create lock guard: {}",
                                guard_path.display()
                            )
                        })
                        .map_err(|_| {
                            PolicyError::StoreUnavailable(guard_path.display().to_string())
                        });
                }
            }
        }

        Ok(false)
    }

    /// `None` when the file does not exist.
    async fn file_age(&self, path: &Path) -> Result<Option<Duration>, PolicyError> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(Some(
                metadata
                    .modified()
                    .ok()
                    .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                    .unwrap_or_default(),
            )),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error)
                .with_error_context(|error| {
                    format!(
                        "{COMPONENT} (error: {error}) - failed to inspect file: {}",
                        path.display()
                    )
                })
                .map_err(|_| PolicyError::StoreUnavailable(path.display().to_string())),
        }
    }

    async fn owns_lock(&self, namespace: &NamespaceId, token: &str) -> bool {
        fs::read_to_string(self.lock_path(namespace))
            .await
            .is_ok_and(|owner| owner == token)
    }

    /// Removes the lock file only if it still carries `token`. A lock broken as stale and taken
    /// by another writer is left alone.
    async fn unlock(&self, namespace: &NamespaceId, token: &str) {
        let lock_path = self.lock_path(namespace);
        let guard_path = self.guard_path(namespace);
        for _ in 0..UNLOCK_ATTEMPTS {
            match self.try_guard(&guard_path).await {
                Ok(true) => {
                    if self.owns_lock(namespace, token).await {
                        remove_file_if_exists(&lock_path).await;
                    } else {
                        warn!(
                            "Lock file: {} was taken over by another writer, leaving it in place.",
                            lock_path.display()
                        );
                    }
                    remove_file_if_exists(&guard_path).await;
                    return;
                }
                Ok(false) => tokio::time::sleep(UNLOCK_RETRY_INTERVAL).await,
                Err(error) => {
                    warn!("Failed to release lock file: {}, error: {error}", lock_path.display());
                    return;
                }
            }
        }

        warn!(
            "Could not release lock file: {}, it will be broken once stale.",
            lock_path.display()
        );
    }

    async fn write_locked(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
        token: &str,
    ) -> Result<WriteOutcome, PolicyError> {
        let current = Self::current_version(&self.load(namespace).await?);
        if current != expected {
            return Ok(WriteOutcome::VersionConflict { current });
        }

        let version = current.next();
        let bytes = serde_json::to_vec_pretty(&VersionedPolicy::new(version, document.clone()))
            .with_error_context(|error| {
                format!("{COMPONENT} (error: {error}) - failed to encode policy document for namespace: {namespace}")
            })
            .map_err(|_| PolicyError::CorruptedPolicyDocument(namespace.to_string()))?;

        let temp_path = self.temp_path(namespace, token);
        self.write_file(&temp_path, &bytes).await?;
        if !self.owns_lock(namespace, token).await {
            warn!("Lock for namespace: {namespace} was lost before commit, discarding the write.");
            remove_file_if_exists(&temp_path).await;
            let current = Self::current_version(&self.load(namespace).await?);
            return Ok(WriteOutcome::VersionConflict { current });
        }

        let document_path = self.document_path(namespace);
        fs::rename(&temp_path, &document_path)
            .await
            .with_error_context(|error| {
                format!(
                    "{COMPONENT} (error: {error}) - failed to replace policy document: {}",
                    document_path.display()
                )
            })
            .map_err(|_| PolicyError::StoreUnavailable(document_path.display().to_string()))?;
        Ok(WriteOutcome::Committed(version))
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), PolicyError> {
        let mut file = fs::File::create(path)
            .await
            .with_error_context(|error| {
                format!(
                    "{COMPONENT} (error: {error}) - failed to create file: {}",
                    path.display()
                )
            })
            .map_err(|_| PolicyError::StoreUnavailable(path.display().to_string()))?;
        file.write_all(bytes)
            .await
            .with_error_context(|error| {
                format!(
                    "{COMPONENT} (error: {error}) - failed to write data to file: {}",
                    path.display()
                )
            })
            .map_err(|_| PolicyError::StoreUnavailable(path.display().to_string()))?;
        file.sync_all()
            .await
            .with_error_context(|error| {
                format!(
                    "{COMPONENT} (error: {error}) - failed to sync file: {}",
                    path.display()
                )
            })
            .map_err(|_| PolicyError::StoreUnavailable(path.display().to_string()))?;
        Ok(())
    }
}

impl PolicyStore for FilePolicyStore {
    async fn read(&self, namespace: &NamespaceId) -> Result<Option<VersionedPolicy>, PolicyError> {
        self.load(namespace).await
    }

    async fn write_if_version(
        &self,
        namespace: &NamespaceId,
        document: &PolicyDocument,
        expected: Version,
    ) -> Result<WriteOutcome, PolicyError> {
        let tenant_path = self.path.join(namespace.tenant());
        fs::create_dir_all(&tenant_path)
            .await
            .with_error_context(|error| {
                format!(
                    "{COMPONENT} (error: {error}) - failed to create directory: {}",
                    tenant_path.display()
                )
            })
            .map_err(|_| PolicyError::StoreUnavailable(tenant_path.display().to_string()))?;

        let Some(token) = self.try_lock(namespace).await? else {
            let current = Self::current_version(&self.load(namespace).await?);
            debug!("Policy document for namespace: {namespace} is locked by another writer, version: {current}");
            return Ok(WriteOutcome::VersionConflict { current });
        };

        let result = self.write_locked(namespace, document, expected, &token).await;
        self.unlock(namespace, &token).await;
        if let Ok(WriteOutcome::Committed(version)) = &result {
            debug!("Saved policy document for namespace: {namespace}, version: {version}");
        }
        result
    }
}
