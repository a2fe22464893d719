pub mod explore;
pub use explore::ExploreService;

pub mod lookup;
pub use lookup::{CacheTtls, LookupError, LookupService};
