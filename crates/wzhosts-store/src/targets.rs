//! API target selection for scheduled jobs
//!
//! A job names the hosts it should run against, or none to run against
//! all of them. The two "nothing to run against" conditions carry the
//! numeric codes the scheduler reports.

use thiserror::Error;
use wzhosts_core::errors::ExError;
use wzhosts_core::HostRecord;

use crate::repo::HostRepository;

/// The store has no hosts
pub const NO_HOST_CONFIGURED_CODE: u32 = 10001;

/// None of the requested ids is in the store
pub const NO_MATCHING_HOST_CODE: u32 = 10002;

#[derive(Debug, Clone, Error)]
pub enum TargetSelectionError {
    #[error("No Wazuh host configured")]
    NoHostConfigured,

    #[error("No host was found with the indicated ID")]
    NoMatchingHost,

    #[error(transparent)]
    Store(#[from] ExError),
}

impl TargetSelectionError {
    /// Scheduler error code, `None` for store failures
    pub fn code(&self) -> Option<u32> {
        match self {
            TargetSelectionError::NoHostConfigured => Some(NO_HOST_CONFIGURED_CODE),
            TargetSelectionError::NoMatchingHost => Some(NO_MATCHING_HOST_CODE),
            TargetSelectionError::Store(_) => None,
        }
    }
}

/// Hosts a job should run against, in store order
///
/// An empty `requested` selects every host. Requested ids missing from the
/// store are ignored as long as at least one matches.
pub fn select_api_targets<S: AsRef<str>>(
    repo: &HostRepository,
    requested: &[S],
) -> Result<Vec<HostRecord>, TargetSelectionError> {
    let hosts = repo.list()?;
    if hosts.is_empty() {
        return Err(TargetSelectionError::NoHostConfigured);
    }
    if requested.is_empty() {
        return Ok(hosts);
    }

    let selected: Vec<HostRecord> = hosts
        .into_iter()
        .filter(|h| requested.iter().any(|id| id.as_ref() == h.id))
        .collect();
    if selected.is_empty() {
        return Err(TargetSelectionError::NoMatchingHost);
    }
    Ok(selected)
}
