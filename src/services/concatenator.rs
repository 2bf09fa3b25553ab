//! 拼接服务 - 业务能力层
//!
//! 把同一个单页文件重复 N 次拼成一个文档

use crate::error::JobError;
use crate::infrastructure::{CommandRunner, Invocation};
use std::path::Path;

pub struct Concatenator {
    program: String,
}

impl Concatenator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `<program> <input> × repeats <output>`
    pub fn invocation(&self, input: &Path, repeats: u32, output: &Path) -> Invocation {
        let mut invocation = Invocation::new(&self.program);
        for _ in 0..repeats {
            invocation = invocation.path_arg(input);
        }
        invocation.path_arg(output)
    }

    pub async fn concat(
        &self,
        runner: &dyn CommandRunner,
        input: &Path,
        repeats: u32,
        output: &Path,
    ) -> Result<(), JobError> {
        let invocation = self.invocation(input, repeats, output);
        runner
            .check_call(&invocation)
            .await
            .map(|_| ())
            .map_err(|failure| JobError::Concatenation {
                command: invocation.to_string(),
                failure,
            })
    }
}
