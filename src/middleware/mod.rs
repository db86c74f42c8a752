pub mod method_not_allowed;
pub mod not_found;
pub mod require_bearer;
pub mod trace_headers;
pub mod trace_response_body;
