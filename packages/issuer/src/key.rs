//! Key material and key sources.
//!
//! A key is either available when the options are built or arrives later
//! through a future. Deferred keys follow the channel-backed future pattern
//! used across the workspace: the provider holds a sender, the issuer polls
//! the receiving end.

use crate::error::{IssuerError, IssuerResult};
use futures::future::BoxFuture;
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::oneshot;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw key bytes handed to the signing primitive. Wiped on drop.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    /// Empty key, used when the options carry none
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Key bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the key has no bytes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of key bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {}])", self.0.len())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for KeyMaterial {
    fn from(bytes: &[u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for KeyMaterial {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<String> for KeyMaterial {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

enum Pending {
    Boxed(BoxFuture<'static, Result<KeyMaterial, String>>),
    Channel(oneshot::Receiver<Result<KeyMaterial, String>>),
}

/// Future resolving a deferred key.
///
/// Rejections surface as `IssuerError::KeyResolution`.
pub struct KeyFuture {
    pending: Pending,
}

impl Future for KeyFuture {
    type Output = IssuerResult<KeyMaterial>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let outcome = match &mut self.pending {
            Pending::Boxed(fut) => match fut.as_mut().poll(cx) {
                Poll::Ready(result) => result,
                Poll::Pending => return Poll::Pending,
            },
            Pending::Channel(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(result)) => result,
                Poll::Ready(Err(_)) => {
                    Err("key provider dropped before delivering a key".to_string())
                }
                Poll::Pending => return Poll::Pending,
            },
        };
        Poll::Ready(outcome.map_err(|cause| IssuerError::key_resolution(&cause)))
    }
}

/// Providing half of [`KeySource::channel`].
pub struct KeySender {
    tx: oneshot::Sender<Result<KeyMaterial, String>>,
}

impl KeySender {
    /// Hand over the key. Returns `false` if the issuer is no longer waiting.
    pub fn deliver(self, key: impl Into<KeyMaterial>) -> bool {
        self.tx.send(Ok(key.into())).is_ok()
    }

    /// Reject the pending key. Returns `false` if the issuer is no longer
    /// waiting.
    pub fn reject(self, cause: impl fmt::Display) -> bool {
        self.tx.send(Err(cause.to_string())).is_ok()
    }
}

/// Where the signing key comes from.
pub enum KeySource {
    /// Key available up front
    Ready(KeyMaterial),
    /// Key delivered later
    Deferred(KeyFuture),
}

impl KeySource {
    /// Key available now
    #[inline]
    #[must_use]
    pub fn ready(key: impl Into<KeyMaterial>) -> Self {
        KeySource::Ready(key.into())
    }

    /// Key produced by a future. An `Err` from the future becomes the
    /// key-resolution cause, rendered with `Display`.
    #[must_use]
    pub fn deferred<F, K, E>(future: F) -> Self
    where
        F: Future<Output = Result<K, E>> + Send + 'static,
        K: Into<KeyMaterial> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let fut = async move { future.await.map(Into::into).map_err(|e| e.to_string()) };
        KeySource::Deferred(KeyFuture {
            pending: Pending::Boxed(Box::pin(fut)),
        })
    }

    /// Deferred key fed through a channel. Dropping the sender without
    /// delivering rejects the key.
    #[must_use]
    pub fn channel() -> (KeySender, Self) {
        let (tx, rx) = oneshot::channel();
        let source = KeySource::Deferred(KeyFuture {
            pending: Pending::Channel(rx),
        });
        (KeySender { tx }, source)
    }

    /// Whether the key still has to be awaited
    #[inline]
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, KeySource::Deferred(_))
    }

    /// Wait for the key.
    ///
    /// # Errors
    /// Returns `IssuerError::KeyResolution` if a deferred key is rejected.
    pub async fn resolve(self) -> IssuerResult<KeyMaterial> {
        match self {
            KeySource::Ready(key) => Ok(key),
            KeySource::Deferred(fut) => fut.await,
        }
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Ready(key) => f.debug_tuple("Ready").field(key).finish(),
            KeySource::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<KeyMaterial> for KeySource {
    fn from(key: KeyMaterial) -> Self {
        KeySource::Ready(key)
    }
}

impl From<&str> for KeySource {
    fn from(key: &str) -> Self {
        KeySource::ready(key)
    }
}

impl From<String> for KeySource {
    fn from(key: String) -> Self {
        KeySource::ready(key)
    }
}

impl From<Vec<u8>> for KeySource {
    fn from(key: Vec<u8>) -> Self {
        KeySource::ready(key)
    }
}

impl From<&[u8]> for KeySource {
    fn from(key: &[u8]) -> Self {
        KeySource::ready(key)
    }
}
