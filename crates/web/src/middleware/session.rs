use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::MiddlewareError;
use crate::middleware::{Flow, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::session::{SESSION_COOKIE_NAME, Session, SessionId, SessionStore};

/// Attaches a [`Session`] to every request.
///
/// The id comes from the `__SESSION` cookie, so [`CookieDecoder`](super::CookieDecoder) must run
/// first. Requests without a cookie, or with an id the store does not know, get a fresh session
/// and a `Set-Cookie` header on the response.
#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    store: Arc<SessionStore>,
}

impl SessionMiddleware {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    fn known_session(&self, request: &Request) -> Option<SessionId> {
        let id = request.cookie(SESSION_COOKIE_NAME)?.parse::<SessionId>().ok()?;
        self.store.contains(id).then_some(id)
    }
}

#[async_trait]
impl Middleware for SessionMiddleware {
    async fn handle(&self, request: &mut Request, response: &mut Response) -> Result<Flow, MiddlewareError> {
        let id = if let Some(id) = self.known_session(request) {
            id
        } else {
            let id = self.store.create();
            response.add_cookie(format!("{SESSION_COOKIE_NAME}={id}"));
            debug!(session = %id, "issued session cookie");
            id
        };

        request.set_session(Session::new(id, Arc::clone(&self.store)));
        Ok(Flow::Continue)
    }
}
