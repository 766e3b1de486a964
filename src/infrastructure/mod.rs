pub mod http_session;

pub use http_session::{PortalResponse, PortalSession};
