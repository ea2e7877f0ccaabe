//! Bearer authentication for the dashboard API.
//!
//! The middleware verifies the token with the identity provider, provisions the tenant on
//! first sight and stores it as `Arc<models::Tenant>` in the request extensions, where
//! handlers read it with `web::ReqData<Arc<models::Tenant>>`.

mod bearer;
mod getheader;
mod manager;
mod manager_middleware;

pub use bearer::try_bearer;
pub use getheader::get_header;
pub use manager::*;
pub use manager_middleware::*;
