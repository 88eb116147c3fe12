//! # Cloud Firestore over REST
//!
//! [`FirestoreStore`] implements [`DocumentStore`] against the Firestore v1
//! REST API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list (listener refresh) | `GET {collection}?pageSize=300[&pageToken=..]` |
//! | add | `POST {collection}` |
//! | update | `PATCH {document}?updateMask.fieldPaths=..&currentDocument.exists=true` |
//! | delete | `DELETE {document}` |
//!
//! Requests carry the signed-in user's ID token as a bearer token, so the
//! project's security rules see the same `request.auth` as the web SDK.
//!
//! ## Live listeners
//!
//! REST has no push channel, so a listener re-lists its collection every
//! `sync.poll_interval_secs` and right after any mutation made through this
//! store. A snapshot (or error) is delivered only when the result differs
//! from the previous delivery.

mod value;

pub use value::{Document, ListResponse, Value};

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use store::{
    CollectionPath, DocPath, DocumentStore, DreamItem, EventHub, ItemFields, SnapshotEvent,
    SnapshotStream, StoreError, StoreErrorCode, Subscription,
};

use crate::auth::AccessTokens;
use crate::clock;
use crate::config::{FirebaseConfig, SyncConfig};

const PAGE_SIZE: u32 = 300;
const UPDATE_MASK: [&str; 4] = ["name", "imageUrl", "price", "priority"];

#[derive(Clone)]
pub struct FirestoreStore {
    inner: Rc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    documents_root: String,
    tokens: Rc<dyn AccessTokens>,
    poll_interval: Duration,
    /// Collections touched by local mutations; wakes their listeners early.
    changes: EventHub<CollectionPath>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: &FirebaseConfig, sync: &SyncConfig, tokens: Rc<dyn AccessTokens>) -> Self {
        Self {
            inner: Rc::new(Inner {
                http: reqwest::Client::new(),
                documents_root: documents_root(config),
                tokens,
                poll_interval: sync.poll_interval(),
                changes: EventHub::new(),
            }),
        }
    }

    fn collection_url(&self, path: &CollectionPath) -> String {
        format!("{}/{}", self.inner.documents_root, path)
    }

    fn document_url(&self, doc: &DocPath) -> String {
        format!("{}/{}", self.inner.documents_root, doc)
    }

    /// Attach the bearer token. A token that is due for refresh but could
    /// not be refreshed fails the request without sending it.
    async fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        match self.inner.tokens.id_token().await {
            Ok(Some(token)) => Ok(request.header("Authorization", format!("Bearer {token}"))),
            Ok(None) => Ok(request),
            Err(e) => Err(StoreError::new(StoreErrorCode::Unavailable, e.to_string())),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|e| StoreError::new(StoreErrorCode::Unavailable, e.to_string()))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(read_error(response).await)
        }
    }

    /// Every document in a collection, following pagination.
    pub async fn list(&self, path: &CollectionPath) -> Result<Vec<DreamItem>, StoreError> {
        let url = self.collection_url(path);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = list_url(&url, page_token.as_deref());
            let response = self.send(self.inner.http.get(url)).await?;
            let page: ListResponse = response.json().await.map_err(malformed)?;
            items.extend(page.documents.iter().filter_map(Document::to_item));
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }
    }

    fn changed(&self, path: &CollectionPath) {
        self.inner.changes.emit(path.clone());
    }
}

#[async_trait(?Send)]
impl DocumentStore for FirestoreStore {
    fn subscribe(&self, path: &CollectionPath) -> SnapshotStream {
        tracing::debug!(%path, "opening listener");
        listen(
            self.clone(),
            path.clone(),
            self.inner.changes.subscribe(),
            self.inner.poll_interval,
        )
    }

    async fn add(&self, path: &CollectionPath, fields: &ItemFields) -> Result<String, StoreError> {
        let request = self
            .inner
            .http
            .post(self.collection_url(path))
            .json(&Document::from_fields(fields));
        let created: Document = self.send(request).await?.json().await.map_err(malformed)?;
        let id = created
            .id()
            .map(str::to_string)
            .ok_or_else(|| malformed("created document has no name"))?;
        tracing::info!(%path, %id, "added item");
        self.changed(path);
        Ok(id)
    }

    async fn update(&self, doc: &DocPath, fields: &ItemFields) -> Result<(), StoreError> {
        let request = self
            .inner
            .http
            .patch(update_url(&self.document_url(doc)))
            .json(&Document::from_fields(fields));
        self.send(request).await.map_err(|e| match e.code {
            // `currentDocument.exists=true` fails with a precondition error.
            StoreErrorCode::FailedPrecondition => StoreError::not_found(doc),
            _ => e,
        })?;
        tracing::info!(%doc, "updated item");
        self.changed(doc.collection());
        Ok(())
    }

    async fn delete(&self, doc: &DocPath) -> Result<(), StoreError> {
        self.send(self.inner.http.delete(self.document_url(doc)))
            .await?;
        tracing::info!(%doc, "deleted item");
        self.changed(doc.collection());
        Ok(())
    }
}

/// Where a listener reads its collection from.
#[async_trait(?Send)]
trait ItemSource {
    async fn fetch(&self, path: &CollectionPath) -> Result<Vec<DreamItem>, StoreError>;
}

#[async_trait(?Send)]
impl ItemSource for FirestoreStore {
    async fn fetch(&self, path: &CollectionPath) -> Result<Vec<DreamItem>, StoreError> {
        self.list(path).await
    }
}

/// Poll `source` for `path`, waking early on each nudge for that path.
fn listen<S: ItemSource + 'static>(
    source: S,
    path: CollectionPath,
    nudges: Subscription<CollectionPath>,
    poll_interval: Duration,
) -> SnapshotStream {
    let listener = Listener {
        source,
        path,
        nudges,
        poll_interval,
        primed: false,
        last: None,
    };
    stream::unfold(listener, |mut listener| async move {
        let event = listener.next_event().await;
        Some((event, listener))
    })
    .boxed_local()
}

/// What a listener last delivered.
#[derive(PartialEq)]
enum Seen {
    Items(Vec<DreamItem>),
    Failed(StoreErrorCode),
}

struct Listener<S> {
    source: S,
    path: CollectionPath,
    nudges: Subscription<CollectionPath>,
    poll_interval: Duration,
    primed: bool,
    last: Option<Seen>,
}

impl<S: ItemSource> Listener<S> {
    async fn next_event(&mut self) -> SnapshotEvent {
        loop {
            if self.primed {
                self.wait().await;
            }
            self.primed = true;

            let (seen, event) = match self.source.fetch(&self.path).await {
                Ok(items) => (Seen::Items(items.clone()), SnapshotEvent::Snapshot(items)),
                Err(e) => {
                    tracing::warn!(path = %self.path, "listener refresh failed: {e}");
                    (Seen::Failed(e.code), SnapshotEvent::Error(e))
                }
            };
            if self.last.as_ref() != Some(&seen) {
                self.last = Some(seen);
                return event;
            }
        }
    }

    /// Sleep for one poll interval, or less if this collection was mutated.
    async fn wait(&mut self) {
        let path = &self.path;
        let nudges = &mut self.nudges;
        let nudged = async move {
            loop {
                match nudges.recv().await {
                    Some(changed) if &changed == path => return,
                    Some(_) => continue,
                    None => future::pending::<()>().await,
                }
            }
        };
        let tick = clock::sleep(self.poll_interval);
        future::select(Box::pin(nudged), Box::pin(tick)).await;
    }
}

fn documents_root(config: &FirebaseConfig) -> String {
    format!(
        "{}/projects/{}/databases/(default)/documents",
        config.firestore_endpoint.trim_end_matches('/'),
        config.project_id
    )
}

fn list_url(collection_url: &str, page_token: Option<&str>) -> String {
    match page_token {
        Some(token) => format!(
            "{collection_url}?pageSize={PAGE_SIZE}&pageToken={}",
            urlencoding::encode(token)
        ),
        None => format!("{collection_url}?pageSize={PAGE_SIZE}"),
    }
}

fn update_url(document_url: &str) -> String {
    let mask = UPDATE_MASK
        .iter()
        .map(|field| format!("updateMask.fieldPaths={field}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{document_url}?{mask}&currentDocument.exists=true")
}

async fn read_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

fn error_from_body(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope
                .error
                .status
                .as_deref()
                .map(StoreErrorCode::from_status)
                .filter(|code| *code != StoreErrorCode::Unknown)
                .unwrap_or_else(|| StoreErrorCode::from_http(status));
            let message = if envelope.error.message.is_empty() {
                format!("HTTP {status}")
            } else {
                envelope.error.message
            };
            StoreError::new(code, message)
        }
        Err(_) => StoreError::new(StoreErrorCode::from_http(status), format!("HTTP {status}")),
    }
}

fn malformed(err: impl std::fmt::Display) -> StoreError {
    StoreError::new(StoreErrorCode::Internal, format!("malformed response: {err}"))
}
