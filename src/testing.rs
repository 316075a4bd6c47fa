//! Local HTTP responder used by fetcher tests.
//!
//! Binds an ephemeral port on loopback and answers every connection with the
//! same canned response, so fetchers run through a real socket and a real
//! status line without reaching the network.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `body` with `status` until the test's runtime shuts down.
///
/// Returns the base URL, e.g. `http://127.0.0.1:41234`.
pub async fn serve(status: u16, content_type: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            // A GET from reqwest fits in one read; the request itself is not inspected.
            let mut request = [0u8; 8192];
            let _ = socket.read(&mut request).await;

            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                500 => "Internal Server Error",
                _ => "Status",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}
