use bytes::Bytes;
use tokio::sync::watch;

use crate::protocol::ParseError;

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Resolved(Bytes),
    Failed(ParseError),
}

impl Slot {
    #[inline]
    fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }

    fn outcome(&self) -> Option<Result<Bytes, ParseError>> {
        match self {
            Slot::Pending => None,
            Slot::Resolved(bytes) => Some(Ok(bytes.clone())),
            Slot::Failed(e) => Some(Err(e.clone())),
        }
    }
}

/// Creates a pending body and the resolver that will settle it.
pub fn deferred_body() -> (BodyResolver, DeferredBody) {
    let (sender, receiver) = watch::channel(Slot::Pending);
    (BodyResolver { sender }, DeferredBody { receiver })
}

/// Producer half of a [`DeferredBody`].
#[derive(Debug)]
pub struct BodyResolver {
    sender: watch::Sender<Slot>,
}

impl BodyResolver {
    /// Settles the body with its complete bytes.
    pub fn resolve(self, body: Bytes) {
        self.sender.send_replace(Slot::Resolved(body));
    }

    /// Settles the body with an error.
    pub fn fail(self, error: ParseError) {
        self.sender.send_replace(Slot::Failed(error));
    }
}

/// Consumer half: a body that is absent until resolved exactly once.
#[derive(Debug, Clone)]
pub struct DeferredBody {
    receiver: watch::Receiver<Slot>,
}

impl DeferredBody {
    /// A body that is already resolved, for messages built outside the parser.
    pub fn resolved(body: impl Into<Bytes>) -> Self {
        let (resolver, deferred) = deferred_body();
        resolver.resolve(body.into());
        deferred
    }

    /// Waits until the body is resolved or failed.
    ///
    /// Any number of tasks may wait concurrently; all observe the same outcome, and calling
    /// `wait` again after settlement returns immediately.
    ///
    /// # Errors
    ///
    /// Returns the error the parser failed the body with, or [`ParseError::BodyCanceled`] when
    /// the resolver was dropped without settling it.
    pub async fn wait(&self) -> Result<Bytes, ParseError> {
        let mut receiver = self.receiver.clone();
        let slot = receiver.wait_for(|slot| !slot.is_pending()).await.map_err(|_e| ParseError::BodyCanceled)?;
        slot.outcome().unwrap_or(Err(ParseError::BodyCanceled))
    }

    /// Blocks the current thread until the body settles.
    ///
    /// Must not be called from within an async task; use [`wait`](Self::wait) there.
    ///
    /// # Errors
    ///
    /// Same as [`wait`](Self::wait).
    pub fn wait_blocking(&self) -> Result<Bytes, ParseError> {
        futures::executor::block_on(self.wait())
    }

    /// Returns the outcome if the body has already settled, without waiting.
    pub fn try_get(&self) -> Option<Result<Bytes, ParseError>> {
        self.receiver.borrow().outcome()
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.borrow().is_pending()
    }
}
