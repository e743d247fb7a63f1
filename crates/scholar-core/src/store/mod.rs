// ── Entity storage ──
//
// One ordered, watch-backed cache per entity kind.

mod cache;

pub(crate) use cache::EntityCache;
