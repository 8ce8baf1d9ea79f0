//! Score workload model.
//!
//! These types mirror the Score specification closely enough to decode real
//! workload files. Absent optional fields are skipped on serialization so the
//! normalized value tree never carries explicit nulls for them.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_RESOURCE_CLASS;
use crate::error::{Result, ScorpionError};
use crate::value::{Value, ValueMap};

/// A single Score workload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    /// Score API version, e.g. `score.dev/v1b1`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    /// Free-form metadata. Must contain a string `name`.
    #[serde(default)]
    pub metadata: ValueMap,
    /// Containers keyed by container name.
    #[serde(default)]
    pub containers: BTreeMap<String, Container>,
    /// Optional network service exposure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    /// Resources keyed by local alias.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Resource>,
}

impl Workload {
    /// Returns the workload name from `metadata.name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `metadata.name` is missing, not a string, or empty.
    pub fn name(&self) -> Result<&str> {
        match self.metadata.get("name") {
            Some(Value::String(name)) if !name.is_empty() => Ok(name),
            Some(Value::String(_)) => Err(ScorpionError::config("workload metadata.name is empty")),
            Some(other) => Err(ScorpionError::config(format!(
                "workload metadata.name must be a string, got {}",
                other.kind()
            ))),
            None => Err(ScorpionError::config("workload metadata.name is missing")),
        }
    }

    /// Checks the structural constraints the graph builder relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or a resource has no type.
    pub fn validate(&self) -> Result<()> {
        let name = self.name()?;
        for (alias, resource) in &self.resources {
            if resource.resource_type.is_empty() {
                return Err(ScorpionError::config(format!(
                    "resource \"{alias}\" in workload \"{name}\" has no type"
                )));
            }
        }
        Ok(())
    }
}

/// A container within a workload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Image reference.
    pub image: String,
    /// Entrypoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Arguments passed to the entrypoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    /// Files mounted into the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ContainerFile>>,
    /// Volumes mounted into the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<ContainerVolume>>,
    /// Compute resource limits and requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ContainerResources>,
    /// Liveness probe, kept as a free-form value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Value>,
    /// Readiness probe, kept as a free-form value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Value>,
}

/// A file mounted into a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFile {
    /// Path inside the container.
    pub target: String,
    /// Octal file mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Local source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Inline content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Disable placeholder expansion in the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_expand: Option<bool>,
}

/// A volume mounted into a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerVolume {
    /// Volume source, usually a resource placeholder.
    pub source: String,
    /// Sub path within the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Mount path inside the container.
    pub target: String,
    /// Mount read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

/// Limits and requests of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerResources {
    /// Upper bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourcesLimits>,
    /// Reserved amounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourcesLimits>,
}

/// CPU and memory quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesLimits {
    /// CPU quantity, e.g. `500m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory quantity, e.g. `128Mi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// Network service exposure of a workload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Ports keyed by port name.
    #[serde(default)]
    pub ports: BTreeMap<String, ServicePort>,
}

/// A single exposed port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Public port.
    pub port: i64,
    /// Transport protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Container port, defaults to `port`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<i64>,
}

/// A resource dependency declared by a workload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type, e.g. `postgres`.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource class, `default` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Shared identity. Resources with the same id are provisioned once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Free-form resource metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ValueMap>,
    /// Provisioning parameters, may contain placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ValueMap>,
}

impl Resource {
    /// Returns the declared class or the default class.
    #[must_use]
    pub fn class_or_default(&self) -> &str {
        self.class.as_deref().unwrap_or(DEFAULT_RESOURCE_CLASS)
    }
}

/// Decodes a workload from YAML source text and validates it.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or fails validation.
pub fn parse_workload(input: &str) -> Result<Workload> {
    let workload: Workload = serde_yaml::from_str(input)?;
    workload.validate()?;
    Ok(workload)
}

/// Reads and decodes a workload file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, decoded, or validated.
pub fn load_workload_file(path: &Path) -> Result<Workload> {
    tracing::info!(path = %path.display(), "loading workload file");
    let content = std::fs::read_to_string(path).map_err(|e| ScorpionError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_workload(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
apiVersion: score.dev/v1b1
metadata:
  name: hello-world
containers:
  hello:
    image: busybox
    command: ["/bin/sh"]
    variables:
      DB_HOST: ${resources.db.host}
service:
  ports:
    www:
      port: 8080
      targetPort: 80
resources:
  db:
    type: postgres
    id: shared-db
    params:
      size: 10
"#;

    #[test]
    fn parse_full_workload() {
        let w = parse_workload(EXAMPLE).expect("should parse");
        assert_eq!(w.name().expect("name"), "hello-world");
        assert_eq!(w.containers["hello"].image, "busybox");
        let service = w.service.as_ref().expect("service");
        assert_eq!(service.ports["www"].target_port, Some(80));
        let db = &w.resources["db"];
        assert_eq!(db.resource_type, "postgres");
        assert_eq!(db.id.as_deref(), Some("shared-db"));
        assert_eq!(db.class_or_default(), "default");
        let params = db.params.as_ref().expect("params");
        assert_eq!(params["size"], Value::Int(10));
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = parse_workload("metadata: {}\n").expect_err("should fail");
        assert!(err.to_string().contains("metadata.name is missing"), "got: {err}");
    }

    #[test]
    fn non_string_name_is_rejected() {
        let err = parse_workload("metadata:\n  name: 42\n").expect_err("should fail");
        assert!(err.to_string().contains("must be a string"), "got: {err}");
    }

    #[test]
    fn resource_without_type_is_rejected() {
        let input = "metadata:\n  name: app\nresources:\n  db:\n    type: \"\"\n";
        let err = parse_workload(input).expect_err("should fail");
        assert!(err.to_string().contains("has no type"), "got: {err}");
    }

    #[test]
    fn absent_optionals_are_not_serialized() {
        let container = Container {
            image: "nginx".into(),
            ..Container::default()
        };
        let json = serde_json::to_string(&container).expect("serialize");
        assert_eq!(json, r#"{"image":"nginx"}"#);
    }

    #[test]
    fn load_workload_file_reports_missing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_workload_file(&dir.path().join("score.yaml")).expect_err("should fail");
        assert!(matches!(err, ScorpionError::Io { .. }));
    }
}
