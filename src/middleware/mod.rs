pub mod gatekeeper;
pub mod identity;
pub mod response;

pub use gatekeeper::{gatekeeper, Decision};
pub use identity::{Identity, VerifiedSession};
pub use response::{ApiResponse, ApiResult};
