//! warp stub of the storage service wire protocol
//!
//! Serves the same protocol the real stores speak: JSON listing at the
//! collection root, record bytes at `/{name}`, multipart upload with 409
//! on duplicates, and DELETE with 404 on absent records. Bound to an
//! ephemeral local port so HTTP-level tests run against a live pair of
//! endpoints.

use bytes::Buf;
use futures::TryStreamExt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::Body;
use warp::multipart::FormData;
use warp::reply::{Reply, Response, WithStatus};
use warp::Filter;

const MAX_UPLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Shared state of a stub storage service.
#[derive(Debug, Clone, Default)]
pub struct StubStore {
    records: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a record.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.records.lock().insert(name.into(), bytes.into());
    }

    pub fn names(&self) -> Vec<String> {
        self.records.lock().keys().cloned().collect()
    }

    pub fn content(&self, name: &str) -> Option<Vec<u8>> {
        self.records.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn take(&self, name: &str) -> Option<Vec<u8>> {
        self.records.lock().remove(name)
    }

    /// Insert only if absent; `false` signals a conflict.
    fn put_new(&self, name: &str, bytes: Vec<u8>) -> bool {
        let mut records = self.records.lock();
        if records.contains_key(name) {
            return false;
        }
        records.insert(name.to_owned(), bytes);
        true
    }
}

/// Serve `store` on an ephemeral local port, returning the bound address.
///
/// The server task runs until the surrounding runtime shuts down.
pub fn spawn_stub_server(store: StubStore) -> SocketAddr {
    let (addr, server) = warp::serve(routes(store)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// Base URL for an endpoint client pointed at a spawned stub.
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

fn routes(
    store: StubStore,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let list_store = store.clone();
    let list = warp::get()
        .and(warp::path::end())
        .map(move || warp::reply::json(&list_store.names()));

    let fetch_store = store.clone();
    let fetch = warp::get()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .map(move |name: String| -> Response {
            match fetch_store.content(&name) {
                Some(bytes) => Response::new(Body::from(bytes)),
                None => {
                    let mut response = Response::new(Body::from("record not found"));
                    *response.status_mut() = StatusCode::NOT_FOUND;
                    response
                }
            }
        });

    let push_store = store.clone();
    let push = warp::post()
        .and(warp::path::end())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and_then(move |form: FormData| accept_upload(push_store.clone(), form));

    let remove = warp::delete()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .map(move |name: String| {
            if store.take(&name).is_some() {
                warp::reply::with_status("deleted", StatusCode::OK)
            } else {
                warp::reply::with_status("record not found", StatusCode::NOT_FOUND)
            }
        });

    list.or(fetch).or(push).or(remove)
}

async fn accept_upload(
    store: StubStore,
    mut form: FormData,
) -> Result<WithStatus<&'static str>, warp::Rejection> {
    // multer allows only one live part at a time, so each part must be
    // fully consumed before the next is requested
    let mut stored = false;
    while let Some(part) = form.try_next().await.map_err(|_| warp::reject::reject())? {
        if part.name() != "file" {
            continue;
        }
        let Some(name) = part.filename().map(str::to_owned) else {
            return Ok(warp::reply::with_status(
                "file part has no filename",
                StatusCode::BAD_REQUEST,
            ));
        };
        let mut bytes = Vec::new();
        let mut body = part.stream();
        while let Some(mut buf) = body.try_next().await.map_err(|_| warp::reject::reject())? {
            while buf.has_remaining() {
                let chunk = buf.chunk();
                bytes.extend_from_slice(chunk);
                let advanced = chunk.len();
                buf.advance(advanced);
            }
        }
        if !store.put_new(&name, bytes) {
            return Ok(warp::reply::with_status(
                "record already exists",
                StatusCode::CONFLICT,
            ));
        }
        stored = true;
    }
    if stored {
        Ok(warp::reply::with_status("stored", StatusCode::OK))
    } else {
        Ok(warp::reply::with_status(
            "missing file part",
            StatusCode::BAD_REQUEST,
        ))
    }
}
