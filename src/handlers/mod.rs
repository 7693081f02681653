// handlers/mod.rs - HTTP handlers grouped by access level
//
// public:    no authentication (token issuance, banner, health)
// protected: bearer token verified by `jwt_auth_middleware`

pub mod protected;
pub mod public;
