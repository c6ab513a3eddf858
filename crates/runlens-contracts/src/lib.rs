// Shared wire contracts for Runlens
//
// history: the engine's raw event-log JSON as it arrives from upstream.
// timeline: the reconstructed span model served to visualization clients.

pub mod history;
pub mod timeline;

pub use history::*;
pub use timeline::*;
