use crate::error::RpcServiceEndpointError;
use crate::host::RpcHost;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What `RpcHostRegistry::register` does when the name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RpcDuplicateHostPolicy {
    /// The new host replaces the previous binding (last write wins).
    #[default]
    Overwrite,
    /// The registration fails with `RpcServiceEndpointError::DuplicateHost`.
    RejectDuplicate,
}

/// Named hosts owned by one service instance.
///
/// Hosts live until the registry is dropped; nothing is removed
/// automatically.
pub struct RpcHostRegistry {
    hosts: Mutex<HashMap<String, Arc<dyn RpcHost>>>,
    duplicate_policy: RpcDuplicateHostPolicy,
}

impl Default for RpcHostRegistry {
    fn default() -> Self {
        Self::new(RpcDuplicateHostPolicy::default())
    }
}

impl RpcHostRegistry {
    pub fn new(duplicate_policy: RpcDuplicateHostPolicy) -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
            duplicate_policy,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn RpcHost>>> {
        self.hosts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn duplicate_policy(&self) -> RpcDuplicateHostPolicy {
        self.duplicate_policy
    }

    /// Binds `host` to `host_name`, honouring the duplicate policy.
    pub fn register(
        &self,
        host_name: impl Into<String>,
        host: Arc<dyn RpcHost>,
    ) -> Result<(), RpcServiceEndpointError> {
        let host_name = host_name.into();

        let declared = host.declared_host_names();
        if !declared.is_empty() && !declared.iter().any(|name| *name == host_name) {
            tracing::warn!(
                host = %host_name,
                declared = ?declared,
                "host registered under a name its typed methods do not declare"
            );
        }

        match self.lock().entry(host_name) {
            Entry::Occupied(mut entry) => match self.duplicate_policy {
                RpcDuplicateHostPolicy::Overwrite => {
                    tracing::debug!(host = %entry.key(), "replacing registered host");
                    entry.insert(host);
                    Ok(())
                }
                RpcDuplicateHostPolicy::RejectDuplicate => {
                    Err(RpcServiceEndpointError::DuplicateHost(entry.key().clone()))
                }
            },
            Entry::Vacant(entry) => {
                tracing::debug!(host = %entry.key(), "registered host");
                entry.insert(host);
                Ok(())
            }
        }
    }

    pub fn get(&self, host_name: &str) -> Option<Arc<dyn RpcHost>> {
        self.lock().get(host_name).cloned()
    }

    pub fn contains(&self, host_name: &str) -> bool {
        self.lock().contains_key(host_name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Registered host names, sorted.
    pub fn host_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}
