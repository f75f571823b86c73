//! Defenses against path traversal, decompression bombs and archive bombs.

pub mod path;
pub mod permissions;
pub mod quota;

pub use path::contains_parent_traversal;
pub use path::expand_home;
pub use path::resolve_within_root;
pub use path::validate_entry_name;
pub use permissions::sanitize_permissions;
pub use quota::QuotaTracker;
