// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat client
//!
//! A `DuckChat` owns one conversation. Each turn bootstraps tokens if
//! needed, posts the whole transcript, rotates the session token and hash
//! from the response headers, and streams reply fragments back to the
//! caller as they are parsed.

use futures::{Stream, StreamExt};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::classify::{classify_status, classify_transport_error, RequestContext};
use crate::chat::hash::{IntegrityHasher, PassthroughHasher};
use crate::chat::models::{Model, UnknownModel};
use crate::chat::session::{ChatMessage, Session, SessionSnapshot};
use crate::chat::streaming::{EventStreamParser, StreamItem};
use crate::chat::tokens::FrontEndVersionCache;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{ChatError, ChatResult};
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};

/// Session token header, sent and rotated on every turn
pub const VQD_HEADER: &str = "x-vqd-4";
/// Session hash header, sent and rotated on every turn
pub const VQD_HASH_HEADER: &str = "x-vqd-hash-1";
/// Front-end version header
pub const FE_VERSION_HEADER: &str = "x-fe-version";

/// Timeout for a chat POST when the caller has no preference
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Events of one turn, in the order the caller receives them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The requested model was replaced by the default; the turn continues
    Warning(UnknownModel),
    /// Reply text, forwarded as soon as it is parsed
    Fragment(String),
}

/// Lazy reply stream; dropping it abandons the turn and closes the body
pub type TurnStream<'a> = Pin<Box<dyn Stream<Item = ChatResult<TurnEvent>> + Send + 'a>>;

/// Endpoint URLs derived from the service origin
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn landing(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn status(&self) -> String {
        format!("{}/duckchat/v1/status", self.base_url)
    }

    pub fn chat(&self) -> String {
        format!("{}/duckchat/v1/chat", self.base_url)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Client for one conversation
pub struct DuckChat {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) hasher: Arc<dyn IntegrityHasher>,
    pub(crate) front_end: Arc<FrontEndVersionCache>,
    pub(crate) endpoints: Endpoints,
    pub(crate) session: Session,
}

impl DuckChat {
    /// Create a client with an HTTP transport built from `config`
    pub fn new(config: ClientConfig) -> ChatResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport)).with_base_url(config.base_url))
    }

    /// Create a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            hasher: Arc::new(PassthroughHasher),
            front_end: FrontEndVersionCache::global(),
            endpoints: Endpoints::default(),
            session: Session::new(),
        }
    }

    /// Use a specific integrity hash implementation
    pub fn with_hasher(mut self, hasher: impl IntegrityHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Share a front-end version cache other than the process-wide one
    pub fn with_front_end_cache(mut self, cache: Arc<FrontEndVersionCache>) -> Self {
        self.front_end = cache;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.endpoints = Endpoints::new(base_url);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Cached front-end version tag, if fetched
    pub fn front_end_version(&self) -> Option<&str> {
        self.front_end.get()
    }

    /// Persistable copy of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Resume a saved conversation
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.session.restore(snapshot);
    }

    /// Send one user message and stream the reply.
    ///
    /// The stream borrows the client mutably, so only one turn can be in
    /// flight per conversation. On success the assembled reply is appended
    /// to the history once the end-of-stream sentinel (or the end of the
    /// body) is reached. On failure the history keeps only the user
    /// message; token rotation already applied is kept. A failure while
    /// acquiring tokens happens before the user message is recorded, so it
    /// leaves the history unchanged.
    pub fn send_turn<'a>(
        &'a mut self,
        user_text: impl Into<String>,
        model: &str,
        timeout: Duration,
    ) -> TurnStream<'a> {
        let user_text = user_text.into();
        let requested_model = model.to_string();

        let turn = async_stream::try_stream! {
            self.ensure_front_end_version().await?;
            self.ensure_session_token().await?;
            self.session.require_tokens()?;

            self.session.push_user(user_text);

            let (model, unknown) = Model::resolve(&requested_model);
            if let Some(unknown) = unknown {
                tracing::warn!(target: "duckchat.client", "{}", unknown);
                yield TurnEvent::Warning(unknown);
            }

            let request = self.chat_request(model, timeout)?;
            let response = self.execute(request).await?;
            self.rotate_tokens(&response);

            let mut body = response.into_stream();
            let mut parser = EventStreamParser::new();
            let mut fragments: Vec<String> = Vec::new();

            while !parser.is_finished() {
                let items = match body.next().await {
                    Some(Ok(chunk)) => parser.feed(&chunk),
                    Some(Err(e)) => Err::<Vec<StreamItem>, _>(ChatError::Protocol(format!(
                        "chat stream read failed: {e}"
                    )))?,
                    None => parser.finish(),
                };

                for item in items {
                    match item {
                        StreamItem::Fragment(text) => {
                            self.session.record_fragment();
                            fragments.push(text.clone());
                            yield TurnEvent::Fragment(text);
                        }
                        StreamItem::Done => {}
                        StreamItem::Failed(error) => Err::<(), _>(error)?,
                    }
                }
            }
            drop(body);

            let reply = fragments.concat();
            tracing::debug!(
                target: "duckchat.client",
                fragments = fragments.len(),
                reply_len = reply.len(),
                "turn completed"
            );
            self.session.push_assistant(reply);
        };

        Box::pin(turn)
    }

    /// Send one user message and wait for the whole reply
    pub async fn chat(
        &mut self,
        user_text: impl Into<String>,
        model: &str,
        timeout: Duration,
    ) -> ChatResult<String> {
        let mut turn = self.send_turn(user_text, model, timeout);
        let mut reply = String::new();
        while let Some(event) = turn.next().await {
            if let TurnEvent::Fragment(text) = event? {
                reply.push_str(&text);
            }
        }
        Ok(reply)
    }

    /// Send a request and classify its outcome
    pub(crate) async fn execute(&self, request: TransportRequest) -> ChatResult<TransportResponse> {
        let context = RequestContext::from(&request);
        tracing::debug!(
            target: "duckchat.transport",
            method = %context.method,
            url = %context.url,
            "sending request"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| classify_transport_error(&context.url, &e))?;

        tracing::debug!(
            target: "duckchat.transport",
            url = %response.url,
            status = response.status,
            "received response"
        );
        classify_status(response.status, &response.url, &context)?;
        Ok(response)
    }

    /// Build the chat POST and recompute the session hash over its headers
    fn chat_request(&mut self, model: Model, timeout: Duration) -> ChatResult<TransportRequest> {
        let front_end = self
            .front_end
            .get()
            .ok_or_else(|| ChatError::Protocol("front-end version is not available".to_string()))?
            .to_string();

        let body = serde_json::to_value(ChatRequestBody {
            model: model.upstream_id(),
            messages: self.session.history(),
        })
        .map_err(|e| ChatError::Protocol(format!("failed to encode chat request: {e}")))?;

        let request = TransportRequest::post(self.endpoints.chat())
            .header(FE_VERSION_HEADER, &front_end)?
            .header(VQD_HEADER, self.session.session_token())?
            .json(body)
            .timeout(timeout);

        let mut outgoing = self.transport.default_headers();
        outgoing.extend(request.headers.clone());
        outgoing.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let session_hash = self
            .hasher
            .derive_hash(self.session.session_hash(), &outgoing)?;
        if session_hash.is_empty() {
            return Err(ChatError::Protocol(
                "integrity hash function produced an empty hash".to_string(),
            ));
        }
        self.session.set_session_hash(session_hash.as_str());

        request.header(VQD_HASH_HEADER, &session_hash)
    }

    fn rotate_tokens(&mut self, response: &TransportResponse) {
        let session_token = response.header_str(VQD_HEADER).to_string();
        let session_hash = response.header_str(VQD_HASH_HEADER).to_string();
        if session_token.is_empty() {
            tracing::debug!(
                target: "duckchat.client",
                "chat response carried no session token; a new one is requested next turn"
            );
        }
        self.session.set_tokens(session_token, session_hash);
    }
}
