//! Host roles in the topology under test and the descriptors used to reach them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::InstanceError;

/// The six instances the network module exposes, by placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostRole {
    /// Instance in the project's default network; stands in for "the internet".
    External,
    /// Public subnetwork, external IP. The only bastion reachable directly.
    Public,
    /// Public subnetwork, no external IP.
    PublicNoIp,
    /// Private subnetwork, tagged public, no external IP.
    PrivatePublic,
    /// Private subnetwork, no external IP.
    Private,
    /// Private subnetwork, persistence tag, reachable only from private hosts.
    PrivatePersistence,
}

impl HostRole {
    pub const ALL: [HostRole; 6] = [
        HostRole::External,
        HostRole::Public,
        HostRole::PublicNoIp,
        HostRole::PrivatePublic,
        HostRole::Private,
        HostRole::PrivatePersistence,
    ];

    /// Terraform output holding this role's instance name.
    #[must_use]
    pub fn output_key(self) -> &'static str {
        match self {
            Self::External => "instance_default_network",
            Self::Public => "instance_public_with_ip",
            Self::PublicNoIp => "instance_public_without_ip",
            Self::PrivatePublic => "instance_private_public",
            Self::Private => "instance_private",
            Self::PrivatePersistence => "instance_private_persistence",
        }
    }

    /// Whether the instance must carry an external IP.
    ///
    /// Roles with an external IP are addressed by it; the others by instance
    /// name, which only resolves from inside the network.
    #[must_use]
    pub fn has_public_ip(self) -> bool {
        matches!(self, Self::External | Self::Public)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Public => "public",
            Self::PublicNoIp => "public-no-ip",
            Self::PrivatePublic => "private-public",
            Self::Private => "private",
            Self::PrivatePersistence => "private-persistence",
        }
    }
}

impl fmt::Display for HostRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A compute instance as returned by the cloud API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub zone: String,
    /// NAT IP of the first access config, if any.
    pub public_ip: Option<String>,
}

impl Instance {
    /// # Errors
    ///
    /// Returns [`InstanceError::NoPublicIp`] when the instance has no external IP.
    pub fn public_ip(&self) -> Result<&str, InstanceError> {
        self.public_ip
            .as_deref()
            .ok_or_else(|| InstanceError::NoPublicIp(self.name.clone()))
    }
}

/// Everything needed to SSH into one hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshHost {
    pub role: HostRole,
    pub hostname: String,
    pub username: String,
}

impl SshHost {
    /// `user@host` destination string.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.hostname)
    }

    /// Build the descriptor for `instance` in `role`.
    ///
    /// # Errors
    ///
    /// Returns an error when `role` is addressed by IP but the instance has none.
    pub fn for_role(
        role: HostRole,
        instance: &Instance,
        username: &str,
    ) -> Result<Self, InstanceError> {
        let hostname = if role.has_public_ip() {
            instance.public_ip()?.to_string()
        } else {
            instance.name.clone()
        };
        Ok(Self {
            role,
            hostname,
            username: username.to_string(),
        })
    }
}

/// Message reported when an instance that must be private has an external IP.
#[must_use]
pub fn unexpected_public_ip_message(instance: &Instance) -> String {
    format!(
        "Found an external IP on {} when it should have had none",
        instance.name
    )
}
