//! WebSocket upgrade negotiation
//!
//! Accepts the HTTP upgrade on the configured path and reads the session
//! role from the request's query string. All origins are allowed.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::WebSocketStream;

use super::config::ServerConfig;
use crate::error::{Error, Result};
use crate::session::Role;

/// Perform the server side of the upgrade
///
/// Returns the upgraded stream and the role requested by the client.
pub async fn accept<S>(stream: S, config: &ServerConfig) -> Result<(WebSocketStream<S>, Role)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut role = Role::Unclassified;

    let callback = |request: &Request, response: Response| {
        let uri = request.uri();
        if uri.path() != config.path {
            tracing::debug!(path = uri.path(), "Rejecting upgrade for unknown path");
            return Err(not_found());
        }
        role = Role::from_query(uri.query(), &config.role_param);
        Ok(response)
    };

    let mut ws_config = WebSocketConfig::default();
    ws_config.max_message_size = config.max_message_size;

    let handshake =
        tokio_tungstenite::accept_hdr_async_with_config(stream, callback, Some(ws_config));
    let ws = tokio::time::timeout(config.connection_timeout, handshake)
        .await
        .map_err(|_| Error::HandshakeTimeout)??;

    Ok((ws, role))
}

fn not_found() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("Not Found".to_string()));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn negotiate(url: &str) -> (Result<Role>, bool) {
        let (server_io, client_io) = tokio::io::duplex(16 * 1024);
        let config = ServerConfig::default();

        let (server, client) = tokio::join!(
            accept(server_io, &config),
            tokio_tungstenite::client_async(url, client_io)
        );
        (server.map(|(_, role)| role), client.is_ok())
    }

    #[tokio::test]
    async fn test_role_from_query() {
        let (role, client_ok) = negotiate("ws://localhost/echo?role=consumer").await;
        assert_eq!(role.unwrap(), Role::Consumer);
        assert!(client_ok);
    }

    #[tokio::test]
    async fn test_missing_role_is_unclassified() {
        let (role, client_ok) = negotiate("ws://localhost/echo").await;
        assert_eq!(role.unwrap(), Role::Unclassified);
        assert!(client_ok);

        let (role, _) = negotiate("ws://localhost/echo?role=superuser").await;
        assert_eq!(role.unwrap(), Role::Unclassified);
    }

    #[tokio::test]
    async fn test_unknown_path_rejected() {
        let (role, client_ok) = negotiate("ws://localhost/other?role=consumer").await;
        assert!(matches!(role, Err(Error::WebSocket(_))));
        assert!(!client_ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_timeout() {
        // Client never speaks
        let (server_io, _client_io) = tokio::io::duplex(1024);
        let config = ServerConfig::default().connection_timeout(Duration::from_secs(2));

        let result = accept(server_io, &config).await;
        assert!(matches!(result, Err(Error::HandshakeTimeout)));
    }
}
