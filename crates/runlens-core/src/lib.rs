// Timeline Reconstruction Core
//
// This crate turns one workflow execution's raw event log into an ordered
// list of workflow and activity spans, and assembles a root execution
// together with its direct children into a single timeline tree.
//
// Key design decisions:
// - Retrieval is behind the HistoryFetcher trait so the reconstruction stays
//   testable without a live engine
// - HistoryParser is a pure single-pass state machine over an already-fetched
//   event list; it never performs I/O and never fails (unmatched or malformed
//   events degrade the timeline instead of aborting it)
// - Activity events carry no owning-workflow id on the wire, so attribution
//   uses a scope stack of workflows currently narrating the log
// - In-flight activities are tracked per scope in open lists; resolution picks
//   the most recently opened span still matching, mirroring log proximity
// - WorkflowTreeAssembler isolates per-child fetch failures: a broken child is
//   logged and omitted, never fatal to the root or to siblings

pub mod assembler;
pub mod error;
pub mod parser;
pub mod traits;

pub use assembler::WorkflowTreeAssembler;
pub use error::{Result, TimelineError};
pub use parser::HistoryParser;
pub use traits::{HistoryFetcher, WorkflowSearcher};
