// Shared helpers used across mount-notify.

pub mod paths;
