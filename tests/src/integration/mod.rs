//! Cross-component integration tests.

pub mod request_flows;
pub mod tenant_isolation;
