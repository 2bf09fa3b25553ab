//! 优化服务 - 业务能力层
//!
//! 通过 Ghostscript 风格的命令重写文档，合并重复嵌入的图片资源

use crate::error::JobError;
use crate::infrastructure::{CommandRunner, Invocation};
use std::path::Path;

pub struct Optimizer {
    program: String,
    extra_args: Vec<String>,
}

impl Optimizer {
    pub fn new(program: impl Into<String>, extra_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            extra_args,
        }
    }

    pub fn invocation(&self, input: &Path, output: &Path) -> Invocation {
        Invocation::new(&self.program)
            .args(["-dBATCH", "-dDetectDuplicateImages=true", "-dNOPAUSE"])
            .args(self.extra_args.iter().map(String::as_str))
            .args(["-q", "-sDEVICE=pdfwrite", "-o"])
            .path_arg(output)
            .path_arg(input)
    }

    pub async fn optimize(
        &self,
        runner: &dyn CommandRunner,
        input: &Path,
        output: &Path,
    ) -> Result<(), JobError> {
        let invocation = self.invocation(input, output);
        runner
            .check_call(&invocation)
            .await
            .map(|_| ())
            .map_err(|failure| JobError::Optimization {
                command: invocation.to_string(),
                failure,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_invocation_layout() {
        let optimizer = Optimizer::new("gs", vec!["-dPDFSETTINGS=/printer".to_string()]);
        let inv = optimizer.invocation(&PathBuf::from("in.pdf"), &PathBuf::from("out/cover.pdf"));

        assert_eq!(
            inv.to_string(),
            "gs -dBATCH -dDetectDuplicateImages=true -dNOPAUSE -dPDFSETTINGS=/printer \
             -q -sDEVICE=pdfwrite -o out/cover.pdf in.pdf"
        );
    }
}
