//! RAII guards for per-session resources.

mod request_guard;

pub use request_guard::RequestGuard;
