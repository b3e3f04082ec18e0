use super::Storage;
use crate::mounts::{BackendKind, Credentials};

/// A network backend reached through its own protocol (SMB, SFTP, WebDAV,
/// object stores). None of these push change notifications here, so they are
/// resolvable for listing and validation but cannot be listened on.
#[derive(Debug, Clone)]
pub struct RemoteStorage {
    backend: BackendKind,
    host: String,
    share: Option<String>,
    credentials: Option<Credentials>,
}

impl RemoteStorage {
    pub fn new(
        backend: BackendKind,
        host: String,
        share: Option<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            backend,
            host,
            share,
            credentials,
        }
    }
}

impl Storage for RemoteStorage {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn describe(&self) -> String {
        let user = self
            .credentials
            .as_ref()
            .map(|c| format!("{}@", c.user))
            .unwrap_or_default();
        let share = self
            .share
            .as_deref()
            .map(|s| format!("/{}", s.trim_matches('/')))
            .unwrap_or_default();

        format!("{}://{}{}{}", self.backend, user, self.host, share)
    }
}
