//! Provider wire-format adapters.
//!
//! Each supported provider format gets one [`ProviderAdapter`] that turns a
//! normalized [`GenerationRequest`](vgen_models::GenerationRequest) into the
//! provider's submit and poll calls, and turns provider responses back into a
//! [`NormalizedStatus`]. Adapters are pure: they never perform I/O.

pub mod adapter;
pub mod call;
pub mod doubao;
pub mod error;
pub mod extract;
pub mod openai;
pub mod registry;
pub mod shape;
pub mod siliconflow;
pub mod status;
pub mod vectorengine;

pub use adapter::ProviderAdapter;
pub use call::{HttpCall, HttpMethod};
pub use error::{ProviderError, ProviderResult};
pub use extract::{extract_artifact, ExtractionStrategy, DEFAULT_STRATEGIES};
pub use registry::AdapterRegistry;
pub use shape::apply_shape;
pub use status::{classify_status, NormalizedStatus, StatusClass};
