pub mod badges;
pub mod live_queue;
pub mod stream_cache;

pub use badges::{BadgeState, UnreadBadges};
pub use live_queue::{pending_label, LiveQueue};
pub use stream_cache::{SharedCache, StreamCache};
