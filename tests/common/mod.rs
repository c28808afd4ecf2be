//! Purpose: Shared fixtures for integration tests.
//! Exports: `MirrorEmulator`, `init_tracing`, `operator`, `TestResult`.
//! Role: Serves an axum router on a loopback port from a background tokio runtime.
//! Invariants: Loopback-only; the server shuts down and its thread is joined on drop.
#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::thread::JoinHandle;

use axum::Router;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ledgerlink::config::Operator;
use ledgerlink::core::entity::AccountId;
use ledgerlink::core::key::{KeyAlgorithm, PrivateKey, PublicKey};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

pub fn operator() -> Operator {
    Operator::new(
        AccountId::from_num(2),
        PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[1; 32]).expect("private key"),
        PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[2; 32]).expect("public key"),
    )
    .expect("operator")
}

pub struct MirrorEmulator {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MirrorEmulator {
    pub fn start(router: Router) -> TestResult<Self> {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();
        let app = router.layer(TraceLayer::new_for_http());

        let thread = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::error!(error = %err, "mirror emulator runtime failed");
                    return;
                }
            };
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(err) => {
                        tracing::error!(error = %err, "mirror emulator bind failed");
                        return;
                    }
                };
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = signal.await;
                });
                if let Err(err) = server.await {
                    tracing::error!(error = %err, "mirror emulator stopped");
                }
            });
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MirrorEmulator {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
