//! In-process stub of the payer and merchant backends for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use reqwest::Client;
use url::Url;

use crate::api::BackendClient;

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    json: bool,
}

#[derive(Default)]
struct StubState {
    /// path → queued responses; the last one repeats forever.
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    calls: Mutex<Vec<(String, HashMap<String, String>)>>,
}

#[derive(Default)]
pub struct StubBuilder {
    routes: HashMap<String, VecDeque<Canned>>,
}

impl StubBuilder {
    pub fn json(mut self, path: &str, body: serde_json::Value) -> Self {
        self.push(
            path,
            Canned {
                status: StatusCode::OK,
                body: body.to_string(),
                json: true,
            },
        );
        self
    }

    pub fn status(mut self, path: &str, status: StatusCode, body: &str) -> Self {
        self.push(
            path,
            Canned {
                status,
                body: body.to_string(),
                json: false,
            },
        );
        self
    }

    fn push(&mut self, path: &str, canned: Canned) {
        self.routes
            .entry(path.to_string())
            .or_default()
            .push_back(canned);
    }

    pub async fn spawn(self) -> StubBackend {
        let state = Arc::new(StubState {
            routes: Mutex::new(self.routes),
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle)
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        StubBackend {
            base: Url::parse(&format!("http://{addr}/")).expect("stub url"),
            state,
        }
    }
}

pub struct StubBackend {
    pub base: Url,
    state: Arc<StubState>,
}

impl StubBackend {
    pub fn builder() -> StubBuilder {
        StubBuilder::default()
    }

    /// Client pointing both backend roles at this stub.
    pub fn client(&self) -> BackendClient {
        BackendClient::new(Client::new(), self.base.clone(), self.base.clone())
    }

    /// Query parameters of every request received on `path`, in arrival order.
    pub fn calls(&self, path: &str) -> Vec<HashMap<String, String>> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path().to_string();
    state.calls.lock().unwrap().push((path.clone(), params));

    let canned = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    match canned {
        Some(c) if c.json => (c.status, [(header::CONTENT_TYPE, "application/json")], c.body)
            .into_response(),
        Some(c) => (c.status, c.body).into_response(),
        None => (StatusCode::NOT_FOUND, format!("no stub for {path}")).into_response(),
    }
}
