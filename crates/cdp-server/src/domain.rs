//! The contract a domain implementation fulfils to be served over a channel.

use std::future::Future;
use std::pin::Pin;

use cdp_protocol::HandlerResult;
use serde_json::Value;

/// Trait implemented by every CDP domain (`Runtime`, `Debugger`, ...).
///
/// A domain may define more behaviour than it exposes: only the names in
/// [`Domain::methods`] are reachable from the remote side. Implementations
/// keep whatever state they need (typically a [`Peer`](crate::Peer) for
/// emitting their own events) and receive `&self` on every call.
pub trait Domain: Send + Sync {
    /// Method names reachable over the wire, without the domain prefix.
    fn methods(&self) -> &'static [&'static str];

    /// Handle one call. `method` is always one of [`Domain::methods`].
    ///
    /// Returning `Value::Null` answers the caller with an empty object.
    fn call(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = HandlerResult> + Send;
}

/// Object-safe wrapper for the Domain trait.
pub(crate) trait DomainDyn: Send + Sync {
    fn methods_dyn(&self) -> &'static [&'static str];
    fn call_dyn<'a>(
        &'a self,
        method: &'a str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;
}

impl<T: Domain> DomainDyn for T {
    fn methods_dyn(&self) -> &'static [&'static str] {
        self.methods()
    }

    fn call_dyn<'a>(
        &'a self,
        method: &'a str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>> {
        Box::pin(self.call(method, params))
    }
}
