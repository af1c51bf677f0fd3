//! In-process HTTP upstream for client tests.

use axum::Router;
use axum::http::{StatusCode, Uri};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counts requests reaching a stub route.
#[derive(Clone, Default)]
pub(crate) struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub(crate) fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Reader-style upstream keyed on the target URL in the path.
///
/// Targets containing `down` answer 503, `missing` answer 404, `slow` stall
/// for five seconds; anything else echoes `body:<target>`.
pub(crate) async fn reader_stub() -> String {
    let router = Router::new().fallback(|uri: Uri| async move {
        let target = uri.path().trim_start_matches('/').to_string();
        if target.contains("down") {
            (StatusCode::SERVICE_UNAVAILABLE, "reader overloaded".to_string())
        } else if target.contains("missing") {
            (StatusCode::NOT_FOUND, "no such page".to_string())
        } else if target.contains("slow") {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, "late".to_string())
        } else {
            (StatusCode::OK, format!("body:{target}"))
        }
    });
    serve(router).await
}
