use std::{
    collections::{BTreeSet, HashSet},
    fs, io,
    path::PathBuf,
};

use log::info;
use parking_lot::RwLock;
use thiserror::Error;

/// What a user is allowed to do in the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Regular,
    Vip,
    Owner,
}

impl Role {
    /// VIPs and owners play for free and can run competitions
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Vip | Role::Owner)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Regular => "REGULAR",
            Role::Vip => "VIP",
            Role::Owner => "OWNER",
        }
    }
}

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("Could not access VIP grants: {0}")]
    Io(#[from] io::Error),
    #[error("VIP grants are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Resolves roles by identity: owners come from a fixed allow-list,
/// VIPs from a grant set that is persisted on its own.
pub struct RolePolicy {
    owners: HashSet<String>,
    vips: RwLock<BTreeSet<String>>,
    path: Option<PathBuf>,
}

impl RolePolicy {
    /// A policy whose VIP grants only live in memory
    pub fn new<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owners: owners.into_iter().map(Into::into).collect(),
            vips: Default::default(),
            path: None,
        }
    }

    /// A policy that loads and saves VIP grants at the given path
    pub fn with_store<I, S>(owners: I, path: impl Into<PathBuf>) -> Result<Self, RoleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.into();

        let vips: BTreeSet<String> = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Default::default(),
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} VIP grants from {}", vips.len(), path.display());

        Ok(Self {
            vips: vips.into(),
            path: Some(path),
            ..Self::new(owners)
        })
    }

    pub fn role_of(&self, username: &str) -> Role {
        if self.owners.contains(username) {
            return Role::Owner;
        }

        if self.vips.read().contains(username) {
            return Role::Vip;
        }

        Role::Regular
    }

    pub fn is_owner(&self, username: &str) -> bool {
        self.owners.contains(username)
    }

    /// Grants VIP to a user. The grant only takes effect once it's saved.
    pub fn grant_vip(&self, username: &str) -> Result<(), RoleError> {
        let mut vips = self.vips.write();

        let mut next = vips.clone();
        next.insert(username.to_string());

        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_string_pretty(&next)?)?;
        }

        *vips = next;
        Ok(())
    }

    pub fn vips(&self) -> Vec<String> {
        self.vips.read().iter().cloned().collect()
    }
}
