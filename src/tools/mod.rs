//! Tool-call types shared by the completion requestor, the dispatch bridge
//! and the orchestrator.

pub mod tool_calling;

pub use tool_calling::{ArgumentMap, CapabilityInvocation, InvocationRecord, InvocationResult};
