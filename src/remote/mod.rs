//! Remote data sources
//!
//! [`RemoteAdapter`] is the seam for sources that evaluate queries
//! themselves. Calls are async and cancellable through a caller-owned
//! [`CancelSignal`]; a cancelled call yields no page.

mod adapter;
mod cancel;
mod http;

pub use adapter::RemoteAdapter;
pub use cancel::{cancellation, CancelHandle, CancelSignal};
pub use http::HttpRemoteAdapter;
