#![allow(dead_code)]

use std::net::TcpListener;
use std::path::Path;

use tokio::runtime::{Builder, Runtime};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOCUMENT_PATH: &str = "/swagger/v1/swagger.json";

/// Mock server answering `GET /swagger/v1/swagger.json`. The runtime owns the
/// server's listener task, so keep the value alive while requests are made.
pub struct SwaggerServer {
    server: MockServer,
    _runtime: Runtime,
}

impl SwaggerServer {
    pub fn start(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(DOCUMENT_PATH))
                .respond_with(
                    ResponseTemplate::new(status)
                        .insert_header("Content-Type", "application/json")
                        .set_body_string(body),
                )
                .mount(&server)
                .await;
            server
        });

        Self {
            server,
            _runtime: runtime,
        }
    }

    pub fn fixture(file: impl AsRef<Path>) -> Self {
        Self::start(200, std::fs::read_to_string(file).unwrap())
    }

    pub fn url(&self) -> String {
        format!("{}{DOCUMENT_PATH}", self.server.uri())
    }
}

/// A URL nothing is listening on.
pub fn closed_url() -> String {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    format!("http://127.0.0.1:{port}{DOCUMENT_PATH}")
}
