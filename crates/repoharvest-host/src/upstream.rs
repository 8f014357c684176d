use crate::client::HostSession;
use repoharvest_core::error::HostError;
use repoharvest_mirror::{RepoIdentity, UpstreamSource};
use std::collections::BTreeSet;

/// One repository's view of an authenticated session, usable as the
/// mirror's upstream.
pub struct BoundRepo<'s> {
    session: &'s HostSession,
    organization: String,
    name: String,
}

impl<'s> BoundRepo<'s> {
    pub fn new(
        session: &'s HostSession,
        organization: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            session,
            organization: organization.into(),
            name: name.into(),
        }
    }

    pub fn for_identity(session: &'s HostSession, identity: &RepoIdentity) -> Self {
        Self::new(session, &identity.organization, &identity.name)
    }

    /// The remote's last-push time (epoch seconds). Recorded before fetching
    /// so a push landing mid-run is re-observed next run rather than lost.
    pub fn pushed_at(&self) -> Result<i64, HostError> {
        Ok(self
            .session
            .repo_metadata(&self.organization, &self.name)?
            .pushed_at)
    }
}

impl UpstreamSource for BoundRepo<'_> {
    fn live_branches(&self) -> Result<BTreeSet<String>, HostError> {
        self.session.branch_names(&self.organization, &self.name)
    }

    fn fetch_token(&self) -> Option<&str> {
        self.session.token()
    }
}
