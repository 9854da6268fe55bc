//! The Vendor Adapter Registry: per-vendor metadata, request builders,
//! response parsers, and stream-chunk parsers (§4.1).

pub mod error;
pub mod registry;
pub mod request;
pub mod response;
pub mod stream;
pub mod table;
pub mod test_request;
pub mod types;

pub use error::{AdapterError, AdapterResult};
pub use registry::{AdapterRegistry, ResolvedAdapter};
pub use request::build_request;
pub use response::parse_response;
pub use stream::{parse_stream_chunk, StreamEvent, DONE_FRAME};
pub use test_request::{build_test_request, default_test_model};
pub use types::{ApiSpec, VendorAdapter, VendorShape};
