//! Authentication is an external collaborator: the engine only needs a
//! single `login`/`passcode` -> ok/fail call. How credentials are actually
//! checked (a database, an LDAP bind, a static table) is the embedder's
//! concern.

/// Checked during CONNECT when [`crate::config::ServerConfig::secured`] is
/// set.
pub trait AuthProvider: Send + Sync {
	#[allow(async_fn_in_trait)]
	async fn authenticate(&self, login: Option<&str>, passcode: Option<&str>) -> bool;
}

/// Accepts any credentials. The default for an unsecured server.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl AuthProvider for AllowAll {
	async fn authenticate(&self, _login: Option<&str>, _passcode: Option<&str>) -> bool {
		true
	}
}

/// Rejects every CONNECT. Useful in tests that exercise the "Authentication
/// failed" path.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenyAll;

impl AuthProvider for DenyAll {
	async fn authenticate(&self, _login: Option<&str>, _passcode: Option<&str>) -> bool {
		false
	}
}
