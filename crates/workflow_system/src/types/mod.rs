pub mod workflow;

pub use workflow::{Workflow, WorkflowError, WorkflowNode};
