pub mod executor;
pub mod types;

pub use executor::{WorkflowExecutor, DEFAULT_STEP_MAX_OUTPUT_TOKENS};
pub use types::{Workflow, WorkflowError, WorkflowNode};
