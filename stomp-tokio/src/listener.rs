use std::sync::Arc;

use stomp_broker::auth::AuthProvider;
use stomp_broker::server::Server;
use tokio::net::TcpListener;

use crate::connection::run_connection;

/// Accepts connections on `listener` forever, spawning one task per
/// connection via [`run_connection`]. Returns only on an accept error that
/// isn't worth retrying.
pub async fn serve<A: AuthProvider + 'static>(listener: TcpListener, server: Arc<Server<A>>) -> anyhow::Result<()> {
	loop {
		let (stream, peer) = listener.accept().await?;
		tracing::debug!(%peer, "accepted connection");
		let server = server.clone();
		tokio::spawn(async move {
			run_connection(stream, server).await;
			tracing::debug!(%peer, "connection closed");
		});
	}
}
