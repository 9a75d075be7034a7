#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use kb_session::http::{HttpRequest, HttpResponse, Transport};
use kb_session::pipeline::Redirector;
use kb_session::storage::{MemoryTokenStorage, TokenStorage};
use kb_session::{create_client, ClientConfig, ClientError, ClientResult, KbClient};

pub const BASE_URL: &str = "http://kb.test";

enum Reply {
    Respond(HttpResponse),
    Fail(ClientError),
    Gated(oneshot::Receiver<()>, HttpResponse),
}

struct Script {
    path: String,
    reply: Reply,
}

/// In-process transport answering from a per-path script, in order.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Script>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, path: &str, reply: Reply) {
        self.script.lock().unwrap().push_back(Script {
            path: path.to_string(),
            reply,
        });
    }

    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.push(path, Reply::Respond(HttpResponse::json_body(status, &body)));
    }

    pub fn respond_raw(&self, path: &str, status: u16, body: &str) {
        self.push(path, Reply::Respond(HttpResponse::new(status, body)));
    }

    pub fn fail(&self, path: &str, err: ClientError) {
        self.push(path, Reply::Fail(err));
    }

    /// Reply only once the returned sender fires.
    pub fn respond_when_released(&self, path: &str, status: u16, body: Value) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(path, Reply::Gated(rx, HttpResponse::json_body(status, &body)));
        tx
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.request_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timed out waiting for requests");
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();
        self.sent.lock().unwrap().push(request);

        let reply = {
            let mut script = self.script.lock().unwrap();
            let idx = script
                .iter()
                .position(|s| s.path == path)
                .unwrap_or_else(|| panic!("no scripted reply for {path}"));
            script.remove(idx).map(|s| s.reply)
        };

        match reply {
            Some(Reply::Respond(resp)) => Ok(resp),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Gated(gate, resp)) => {
                let _ = gate.await;
                Ok(resp)
            }
            None => unreachable!(),
        }
    }
}

#[derive(Default)]
pub struct RecordingRedirector {
    targets: Mutex<Vec<String>>,
}

impl RecordingRedirector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

impl Redirector for RecordingRedirector {
    fn redirect(&self, path: &str) {
        self.targets.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub client: KbClient,
    pub transport: Arc<ScriptedTransport>,
    pub storage: Arc<MemoryTokenStorage>,
    pub redirector: Arc<RecordingRedirector>,
}

pub fn harness() -> Harness {
    harness_with(MemoryTokenStorage::new())
}

pub fn harness_with_token(token: &str) -> Harness {
    harness_with(MemoryTokenStorage::with_token(token))
}

fn harness_with(storage: MemoryTokenStorage) -> Harness {
    let transport = ScriptedTransport::new();
    let storage = Arc::new(storage);
    let redirector = RecordingRedirector::new();
    let config = ClientConfig::default().with_base_url(BASE_URL);

    let client = create_client(
        config,
        transport.clone(),
        storage.clone() as Arc<dyn TokenStorage>,
        redirector.clone(),
    );

    Harness {
        client,
        transport,
        storage,
        redirector,
    }
}
