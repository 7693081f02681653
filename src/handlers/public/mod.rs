// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, service description and health.

pub mod info;
pub mod token;

pub use info::{api_info, health, not_found, root};
pub use token::get_token;
