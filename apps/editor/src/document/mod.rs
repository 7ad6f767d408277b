// Document editing core: path-addressed mutations over an immutable
// in-memory CV snapshot. Persistence is the autosave scheduler's job —
// nothing in here touches the network.

pub mod items;
pub mod path;
pub mod store;
