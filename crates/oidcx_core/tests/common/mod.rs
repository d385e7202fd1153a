#![allow(dead_code)]

use std::{
    io,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
    time::Duration,
};

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode, header};
use http_body::{Body, Frame};
use oidcx_cache::{CacheManager, CachePolicy, ManualClock};
use oidcx_config::CacheMode;
use oidcx_core::{AppState, RouteTable};
use oidcx_proxy::{BoxError, Credential, Fetcher, UpstreamClient};

pub const BASE: &str = "https://api.test";
pub const TTL: Duration = Duration::from_secs(120);

/// What the fake API server does on the next call.
#[derive(Debug, Clone)]
pub enum Script {
    Reply {
        status: StatusCode,
        headers: HeaderMap,
        body: &'static [u8],
    },
    Refuse,
    BreakBody,
}

impl Script {
    pub fn json(body: &'static [u8]) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Script::Reply {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    pub fn status(status: StatusCode, body: &'static [u8]) -> Self {
        Script::Reply {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    script: Mutex<Option<Script>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

/// In-memory stand-in for the API server, shared between the test and the
/// handler under test.
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    inner: Arc<Inner>,
}

impl FakeApi {
    pub fn new(script: Script) -> Self {
        let api = Self::default();
        api.set(script);
        api
    }

    pub fn set(&self, script: Script) {
        *self.inner.script.lock().unwrap() = Some(script);
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// `(uri, authorization)` for every request received so far.
    pub fn seen(&self) -> Vec<(String, Option<String>)> {
        self.inner.seen.lock().unwrap().clone()
    }
}

pub enum FakeBody {
    Full(Option<Bytes>),
    Broken,
}

impl Body for FakeBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            FakeBody::Full(data) => Poll::Ready(data.take().map(|d| Ok(Frame::data(d)))),
            FakeBody::Broken => Poll::Ready(Some(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset mid-body",
            )))),
        }
    }
}

impl UpstreamClient for FakeApi {
    type Body = FakeBody;

    async fn execute(&self, req: Request<Bytes>) -> Result<Response<Self::Body>, BoxError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let auth = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.inner
            .seen
            .lock()
            .unwrap()
            .push((req.uri().to_string(), auth));

        let script = self.inner.script.lock().unwrap().clone();
        match script {
            Some(Script::Reply {
                status,
                headers,
                body,
            }) => {
                let mut resp = Response::new(FakeBody::Full(Some(Bytes::from_static(body))));
                *resp.status_mut() = status;
                *resp.headers_mut() = headers;
                Ok(resp)
            }
            Some(Script::BreakBody) => Ok(Response::new(FakeBody::Broken)),
            Some(Script::Refuse) | None => {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused").into())
            }
        }
    }
}

pub fn state_with(api: FakeApi, clock: Arc<ManualClock>, mode: CacheMode) -> AppState<FakeApi> {
    AppState::with_cache(
        RouteTable::new(BASE),
        CacheManager::with_clock(CachePolicy::new(TTL, mode), clock),
        Fetcher::new(api, Credential::new("test-token")),
    )
}

pub fn cached_state(api: FakeApi) -> (AppState<FakeApi>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (state_with(api, clock.clone(), CacheMode::Cached), clock)
}
