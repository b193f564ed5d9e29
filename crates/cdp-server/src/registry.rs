//! DomainRegistry — maps `Domain.method` names to handlers.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use cdp_protocol::{HandlerResult, split_method};
use serde_json::Value;
use tracing::debug;

use crate::domain::{Domain, DomainDyn};

/// Boxed future returned by standalone method callables.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A standalone method callable, registered without a [`Domain`] impl.
pub type MethodFn = Arc<dyn Fn(Value) -> BoxFuture<HandlerResult> + Send + Sync>;

/// Box a closure into a [`MethodFn`].
pub fn method_fn<F, Fut>(f: F) -> MethodFn
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |params| Box::pin(f(params)))
}

/// A resolved method handler.
#[derive(Clone)]
pub struct Handler(HandlerKind);

#[derive(Clone)]
enum HandlerKind {
    /// A method from a domain's allow-list, bound to that domain instance.
    Bound {
        domain: Arc<dyn DomainDyn>,
        method: &'static str,
    },
    /// A callable registered directly under a method name.
    Function(MethodFn),
}

impl Handler {
    pub async fn invoke(&self, params: Value) -> HandlerResult {
        match &self.0 {
            HandlerKind::Bound { domain, method } => domain.call_dyn(*method, params).await,
            HandlerKind::Function(f) => f(params).await,
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            HandlerKind::Bound { method, .. } => write!(f, "Handler::Bound({method})"),
            HandlerKind::Function(_) => write!(f, "Handler::Function"),
        }
    }
}

/// Per-channel table of domains and their exposed methods.
///
/// Registering a domain name twice merges the method tables; a later
/// registration only replaces handlers for method names it also exposes.
#[derive(Default, Debug)]
pub struct DomainRegistry {
    domains: HashMap<String, HashMap<String, Handler>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every method on a domain's allow-list.
    pub fn register<D: Domain + 'static>(&mut self, name: &str, domain: Arc<D>) {
        let methods = domain.methods();
        let domain: Arc<dyn DomainDyn> = domain;
        let table = self.domains.entry(name.to_string()).or_default();
        for &method in methods {
            table.insert(
                method.to_string(),
                Handler(HandlerKind::Bound {
                    domain: domain.clone(),
                    method,
                }),
            );
        }
        debug!("Registered domain {name} ({} methods)", methods.len());
    }

    /// Register a direct mapping of method name to callable.
    pub fn register_methods<I, S>(&mut self, name: &str, methods: I)
    where
        I: IntoIterator<Item = (S, MethodFn)>,
        S: Into<String>,
    {
        let table = self.domains.entry(name.to_string()).or_default();
        for (method, f) in methods {
            table.insert(method.into(), Handler(HandlerKind::Function(f)));
        }
    }

    /// Register a single callable under `domain.method`.
    pub fn register_fn<F, Fut>(&mut self, domain: &str, method: &str, f: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_methods(domain, [(method, method_fn(f))]);
    }

    /// Resolve a combined `Domain.method` name.
    ///
    /// An unknown domain and a known domain lacking the method are both `None`.
    pub fn lookup(&self, method: &str) -> Option<&Handler> {
        let (domain, method) = split_method(method)?;
        self.domains.get(domain)?.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.lookup(method).is_some()
    }

    /// Exposed method names of one domain, sorted.
    pub fn methods_of(&self, domain: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .domains
            .get(domain)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}
