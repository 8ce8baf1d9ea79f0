//! System-wide constants and default paths.

/// Project configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "score.config.json";

/// Suffix of the temporary file written before the configuration is renamed into place.
pub const CONFIG_TEMP_SUFFIX: &str = ".tmp";

/// Class assumed for resources that do not declare one.
pub const DEFAULT_RESOURCE_CLASS: &str = "default";

/// Logical path prefix of workload nodes and workload-scoped resources.
pub const WORKLOAD_PREFIX: &str = "workload";

/// Logical path prefix of shared resources.
pub const SHARED_PREFIX: &str = "shared";

/// Import path of the Pulumi Go SDK package targeted by the generated program.
pub const PULUMI_PACKAGE: &str = "github.com/pulumi/pulumi/sdk/v3/go/pulumi";

/// Package name of the generated program.
pub const GENERATED_PACKAGE: &str = "main";

/// Profile used by `init` when none is given.
pub const DEFAULT_PROFILE: &str = "debug";

/// Builtin workload profiles, as `(alias, one-liner)` pairs.
pub const BUILTIN_PROFILES: &[(&str, &str)] = &[(
    "debug",
    "github.com/astromechza/scorpion/lib/debug.New(Args)",
)];
