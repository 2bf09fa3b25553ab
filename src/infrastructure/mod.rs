pub mod cancel;
pub mod command_runner;
pub mod workspace;

pub use cancel::CancelToken;
pub use command_runner::{CommandOutput, CommandRunner, Invocation, ProcessRunner};
pub use workspace::{Workspace, SEPARATED_PATTERN};
