//! `scorpion generate` — Add or update a workload and regenerate the program.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use scorpion_common::config::{load_config, save_config};
use scorpion_common::workload::load_workload_file;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Score workload file to add or update before generating.
    pub file: Option<PathBuf>,

    /// Write the program to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `generate` command.
///
/// The project file is only saved once the program has been generated and
/// written, so a failed run leaves it untouched.
///
/// # Errors
///
/// Returns an error if the workload file is invalid, the graph cannot be
/// built, or the output cannot be written.
pub fn execute(dir: &Path, args: &GenerateArgs) -> anyhow::Result<()> {
    let (mut config, found) = load_config(dir)?;
    if !found {
        tracing::warn!(dir = %dir.display(), "no project file found, starting from defaults");
    }

    if let Some(file) = &args.file {
        let workload = load_workload_file(file)?;
        config.upsert_workload(workload)?;
    }

    let graph = super::build_graph(&config)?;
    let source = scorpion_codegen::generate_program(&graph)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &source)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), nodes = graph.nodes.len(), "program written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(source.as_bytes())?;
            stdout.flush()?;
        }
    }

    save_config(dir, &config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::commands::init::{self, InitArgs};

    const WORKLOAD: &str = "\
apiVersion: score.dev/v1b1
metadata:
  name: api
containers:
  main:
    image: nginx
";

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        init::execute(
            dir.path(),
            &InitArgs {
                profile: "debug".into(),
            },
        )
        .expect("init");
        dir
    }

    #[test]
    fn generate_adds_workload_and_writes_program() {
        let dir = project();
        let file = dir.path().join("score.yaml");
        std::fs::write(&file, WORKLOAD).expect("write workload");
        let output = dir.path().join("main.go");

        execute(
            dir.path(),
            &GenerateArgs {
                file: Some(file),
                output: Some(output.clone()),
            },
        )
        .expect("generate");

        let src = std::fs::read_to_string(&output).expect("read program");
        assert!(src.starts_with("package main\n"), "got:\n{src}");
        assert!(src.contains("debug.New(ctx, \"workload.api\", &debug.Args{"), "got:\n{src}");

        let (config, _) = load_config(dir.path()).expect("load");
        assert_eq!(config.workloads.len(), 1);
    }

    #[test]
    fn generate_twice_replaces_workload() {
        let dir = project();
        let file = dir.path().join("score.yaml");
        std::fs::write(&file, WORKLOAD).expect("write workload");
        let output = dir.path().join("main.go");
        let args = GenerateArgs {
            file: Some(file),
            output: Some(output),
        };
        execute(dir.path(), &args).expect("first");
        execute(dir.path(), &args).expect("second");
        let (config, _) = load_config(dir.path()).expect("load");
        assert_eq!(config.workloads.len(), 1);
    }

    #[test]
    fn failed_generation_leaves_project_untouched() {
        let dir = project();
        let file = dir.path().join("score.yaml");
        std::fs::write(
            &file,
            "metadata:\n  name: api\nresources:\n  db:\n    type: postgres\n",
        )
        .expect("write workload");

        let err = execute(
            dir.path(),
            &GenerateArgs {
                file: Some(file),
                output: Some(dir.path().join("main.go")),
            },
        )
        .expect_err("no component for postgres");
        assert!(err.to_string().contains("postgres"), "got: {err}");
        let (config, _) = load_config(dir.path()).expect("load");
        assert!(config.workloads.is_empty());
        assert!(!dir.path().join("main.go").exists());
    }
}
