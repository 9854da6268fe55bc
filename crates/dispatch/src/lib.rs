//! The Dispatch Engine, Connectivity Probe, Upstream Model Discovery, and
//! the url-building helper they share (§4.2, §4.4, §4.5).

pub mod discovery;
pub mod engine;
pub mod error;
pub mod headers;
pub mod probe;
pub mod url;

pub use discovery::{matches_known_family, DiscoveredModel, DiscoveryResult, ModelDiscovery};
pub use engine::{DispatchEngine, DispatchOutput};
pub use error::{DispatchError, DispatchResult};
pub use headers::build_headers;
pub use probe::ConnectivityProbe;
pub use url::build_url;
