//! TTL-bounded response cache for the proxied identity documents.

mod clock;
mod entry;
mod manager;
mod policy;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use manager::{CacheManager, CacheStatus, ServedResponse};
pub use policy::CachePolicy;
pub use store::MemoryCacheStore;
