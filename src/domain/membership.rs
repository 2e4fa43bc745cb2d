use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the signed-in user inside the active organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipRole {
    #[serde(rename = "org:admin")]
    Admin,
    #[serde(rename = "org:member")]
    Member,
}

impl MembershipRole {
    /// Destructive actions such as deleting a project are admin-only
    pub fn can_delete_projects(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "org:admin"),
            Self::Member => write!(f, "org:member"),
        }
    }
}

/// The external authentication/organization service
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Role of the current user, or `None` when not a member of the organization
    async fn current_role(&self) -> Result<Option<MembershipRole>>;
}

/// A provider that always answers with the same role
#[derive(Debug, Clone, Copy)]
pub struct FixedMembership(pub Option<MembershipRole>);

#[async_trait]
impl MembershipProvider for FixedMembership {
    async fn current_role(&self) -> Result<Option<MembershipRole>> {
        Ok(self.0)
    }
}
