//! Data models shared by storage, server, and client.

/// Project rows and request payloads.
pub mod project;
/// Account rows and auth payloads.
pub mod user;

#[cfg(test)]
mod tests;
