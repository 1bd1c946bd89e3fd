use std::sync::Arc;

use clap::Parser;
use stomp_broker::auth::AllowAll;
use stomp_broker::{Heartbeat, Server, ServerConfig};
use tokio::net::TcpListener;

/// A standalone STOMP 1.2 broker.
#[derive(Parser)]
struct Arguments {
	/// Address to accept connections on.
	#[arg(long, env = "STOMP_LISTEN", default_value = "127.0.0.1:61613")]
	listen: String,

	/// Milliseconds between server-sent heartbeats.
	#[arg(long, env = "STOMP_HEARTBEAT_SX", default_value_t = 1000)]
	heartbeat_sx: u64,

	/// Milliseconds the server expects to hear from a client.
	#[arg(long, env = "STOMP_HEARTBEAT_SY", default_value_t = 1000)]
	heartbeat_sy: u64,

	/// Per-transaction frame cap; `0` or negative disables the check.
	#[arg(long, env = "STOMP_MAX_FRAME_IN_TRANSACTION", default_value_t = 1000)]
	max_frame_in_transaction: i64,

	/// Dispatch a COMMIT in slices of this many frames, yielding between
	/// slices. `0` disables chunking.
	#[arg(long, env = "STOMP_TRANSACTION_CHUNK_SIZE", default_value_t = 0)]
	transaction_chunk_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt::init();

	let args = Arguments::parse();

	let config = ServerConfig {
		heartbeat: Heartbeat { sx: args.heartbeat_sx, sy: args.heartbeat_sy },
		max_frame_in_transaction: args.max_frame_in_transaction,
		transaction_chunk_size: args.transaction_chunk_size,
		..ServerConfig::default()
	};

	let server = Arc::new(Server::new(config, AllowAll));
	let listener = TcpListener::bind(&args.listen).await?;
	tracing::info!(listen = %args.listen, "stomp broker listening");

	stomp_tokio::serve(listener, server).await
}
