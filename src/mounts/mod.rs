//! Mount definitions and backend resolution
//!
//! Mounts are administered elsewhere and are read-only input here. Resolving
//! one validates its backend options and credentials and returns a
//! [`Storage`] handle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::error::NotifyError;
use crate::storage::{LocalStorage, RemoteStorage, Storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Smb,
    Sftp,
    Dav,
    #[serde(rename = "amazons3")]
    AmazonS3,
    Swift,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Smb => "smb",
            BackendKind::Sftp => "sftp",
            BackendKind::Dav => "dav",
            BackendKind::AmazonS3 => "amazons3",
            BackendKind::Swift => "swift",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a mount authenticates against its backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMechanism {
    #[default]
    None,
    /// Username and password stored with the mount
    Password,
    /// Credentials are never stored; they must be supplied at run time
    UserProvided,
}

/// A configured external storage mount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    pub id: i64,
    pub mount_point: String,
    pub backend: BackendKind,

    /// Local directory (local backend only)
    #[serde(default)]
    pub root: Option<String>,

    /// Server for network backends
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub share: Option<String>,

    #[serde(default)]
    pub auth: AuthMechanism,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Poll instead of using native notifications (local backend only)
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// `--user` / `--password` given on the command line
#[derive(Debug, Clone, Default)]
pub struct CredentialOverride {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl CredentialOverride {
    fn credentials(&self) -> Result<Option<Credentials>, NotifyError> {
        match (&self.user, &self.password) {
            (None, None) => Ok(None),
            (Some(user), Some(password)) => Ok(Some(Credentials {
                user: user.clone(),
                password: password.clone(),
            })),
            (Some(_), None) => Err(NotifyError::Configuration(
                "--password is required when --user is given".to_string(),
            )),
            (None, Some(_)) => Err(NotifyError::Configuration(
                "--user is required when --password is given".to_string(),
            )),
        }
    }
}

impl MountConfig {
    /// Credentials to connect with: the override when given, otherwise what
    /// the auth mechanism allows.
    pub fn credentials(&self, over: &CredentialOverride) -> Result<Option<Credentials>, NotifyError> {
        if let Some(credentials) = over.credentials()? {
            return Ok(Some(credentials));
        }

        match self.auth {
            AuthMechanism::None => Ok(None),
            AuthMechanism::Password => match (&self.user, &self.password) {
                (Some(user), Some(password)) => Ok(Some(Credentials {
                    user: user.clone(),
                    password: password.clone(),
                })),
                _ => Err(NotifyError::Configuration(format!(
                    "Mount {} has no stored credentials, pass --user and --password",
                    self.id
                ))),
            },
            AuthMechanism::UserProvided => Err(NotifyError::Configuration(format!(
                "Mount {} does not store credentials, pass --user and --password",
                self.id
            ))),
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }
}

/// Build the storage handle for a mount
pub fn resolve_storage(
    mount: &MountConfig,
    over: &CredentialOverride,
) -> Result<Box<dyn Storage>, NotifyError> {
    debug!("Resolving mount {} ({})", mount.id, mount.backend);

    match mount.backend {
        BackendKind::Local => {
            // Local mounts need no credentials, but a half-given override is
            // still rejected
            if over.credentials()?.is_some() {
                debug!("Ignoring credentials for local mount {}", mount.id);
            }

            let root = mount.root.as_deref().ok_or_else(|| {
                NotifyError::Configuration(format!("Mount {} has no root directory", mount.id))
            })?;
            let root = shellexpand::tilde(root);

            let storage = LocalStorage::new(&*root, mount.poll_interval()).map_err(|e| {
                NotifyError::Configuration(format!(
                    "Cannot open storage for mount {}: {}",
                    mount.id, e
                ))
            })?;
            Ok(Box::new(storage))
        }
        remote => {
            let host = mount.host.clone().ok_or_else(|| {
                NotifyError::Configuration(format!("Mount {} has no host", mount.id))
            })?;
            let credentials = mount.credentials(over)?;

            Ok(Box::new(RemoteStorage::new(
                remote,
                host,
                mount.share.clone(),
                credentials,
            )))
        }
    }
}
