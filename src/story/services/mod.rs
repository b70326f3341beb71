//! Application services for story workflow orchestration.

mod workflow;

pub use workflow::{
    ErrorKind, StoryTableRow, StoryWorkflowError, StoryWorkflowResult, StoryWorkflowService,
    TransitionStoryRequest,
};
