mod link;
mod selection;

pub use link::{inbound_identifier, AddressBar, MemoryAddressBar, ShareableLink};
pub use selection::{Phase, Selection, SelectionMachine};
