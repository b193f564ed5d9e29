//! CDP Server — dispatches DevTools protocol messages to domains.
//!
//! The dispatcher owns one channel's domain registry and the table of
//! outbound requests awaiting answers. It never touches a socket: frames
//! leave through an `mpsc` sender and decoded messages come in through
//! [`Dispatcher::receive`].

pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod peer;
pub mod registry;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use domain::Domain;
pub use error::DispatchError;
pub use peer::{IdGenerator, Peer, PendingResponse};
pub use registry::{DomainRegistry, Handler, MethodFn, method_fn};
