//! CDP (Chrome DevTools Protocol) - Protocol Types
//!
//! Wire types for the subset of the DevTools protocol this server speaks.
//! This crate is the single source of truth for message shapes, method
//! names, event names, error codes, and the remote value descriptors used
//! when forwarding console output.

pub mod error;
pub mod events;
pub mod message;
pub mod methods;
pub mod remote;

pub use error::{DecodeError, ErrorCode, ProtocolError};
pub use events::Events;
pub use message::{Event, HandlerResult, Message, Outcome, Request, RequestId, Response};
pub use methods::{Methods, split_method};
pub use remote::{
    CallFrame, ConsoleApiCalledParams, ConsoleApiType, ExecutionContextCreatedParams,
    ExecutionContextDescription, RemoteObject, RemoteObjectSubtype, RemoteObjectType, StackTrace,
};
