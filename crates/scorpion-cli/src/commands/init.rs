//! `scorpion init` — Create a project or switch its workload profile.

use std::path::Path;

use clap::Args;

use scorpion_common::config::{
    ProjectConfig, load_config, save_config, workload_component_for_profile,
};
use scorpion_common::constants::DEFAULT_PROFILE;

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Workload profile: a builtin name or `<package>.<Constructor>(<ArgsType>)`.
    #[arg(default_value = DEFAULT_PROFILE)]
    pub profile: String,
}

/// Executes the `init` command.
///
/// Creates the project file when missing. Otherwise replaces the default
/// workload component if the profile names a different one.
///
/// # Errors
///
/// Returns an error if the profile is invalid or the project file cannot be
/// read or written.
pub fn execute(dir: &Path, args: &InitArgs) -> anyhow::Result<()> {
    let component = workload_component_for_profile(&args.profile)?;
    let (mut config, found) = load_config(dir)?;

    if !found {
        tracing::info!(profile = %args.profile, "creating project");
        config = ProjectConfig {
            default_workload_component: component,
            ..ProjectConfig::default()
        };
        save_config(dir, &config)?;
        println!("Initialised project with profile {}", args.profile);
    } else if config.default_workload_component == component {
        tracing::info!(profile = %args.profile, "project already uses this profile");
    } else {
        tracing::info!(profile = %args.profile, "updating workload profile");
        config.default_workload_component = component;
        save_config(dir, &config)?;
        println!("Updated workload profile to {}", args.profile);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(profile: &str) -> InitArgs {
        InitArgs {
            profile: profile.into(),
        }
    }

    #[test]
    fn init_creates_project_with_debug_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        execute(dir.path(), &args("debug")).expect("init");
        let (config, found) = load_config(dir.path()).expect("load");
        assert!(found);
        assert_eq!(
            config.default_workload_component.package,
            "github.com/astromechza/scorpion/lib/debug"
        );
        assert_eq!(config.default_workload_component.constructor_func, "New");
        assert!(config.workloads.is_empty());
    }

    #[test]
    fn init_switches_profile_and_keeps_workloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        execute(dir.path(), &args("debug")).expect("init");
        let (mut config, _) = load_config(dir.path()).expect("load");
        let mut w = scorpion_common::workload::Workload::default();
        let _ = w.metadata.insert("name".into(), "api".into());
        config.workloads.push(w);
        save_config(dir.path(), &config).expect("save");

        execute(dir.path(), &args("example.com/platform/app.NewApp(AppArgs)")).expect("reinit");
        let (config, _) = load_config(dir.path()).expect("load");
        assert_eq!(config.default_workload_component.package, "example.com/platform/app");
        assert_eq!(config.default_workload_component.args_struct, "AppArgs");
        assert_eq!(config.workloads.len(), 1);
    }

    #[test]
    fn init_rejects_unparseable_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = execute(dir.path(), &args("not-a-profile")).expect_err("bad profile");
        let msg = err.to_string();
        assert!(msg.contains("as workload profile"), "got: {msg}");
        assert!(!dir.path().join("score.config.json").exists());
    }
}
