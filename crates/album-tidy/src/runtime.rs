//! Runtime wiring: real collaborators on a single-threaded tokio runtime.

use anyhow::{Context, Result};

use crate::config::RunConfig;
use crate::cover::ImageResizer;
use crate::pipeline::{Pipeline, RunSummary};
use crate::tool::ProcessRunner;

/// Process one album with ffmpeg child processes and the in-process resizer.
pub fn run(config: RunConfig) -> Result<RunSummary> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(async move {
        let runner = ProcessRunner;
        let resizer = ImageResizer;
        Pipeline::new(&runner, &resizer, &config).run().await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_dir;
    use album_meta::ReconcileOptions;

    #[test]
    fn missing_input_fails_before_touching_output() {
        let root = temp_dir("runtime");
        let config = RunConfig {
            input_dir: root.join("missing"),
            output_dir: root.join("out"),
            ffmpeg: "ffmpeg".to_string(),
            cover_size: 500,
            reconcile: ReconcileOptions::default(),
        };
        let err = run(config).unwrap_err();
        assert!(err.to_string().contains("input directory not found"));
        assert!(!root.join("out").exists());
        let _ = std::fs::remove_dir_all(&root);
    }
}
