//! Conversion of typed workload records into the generic value tree.
//!
//! Records are serialized through `serde_json` and the resulting document is
//! converted kind by kind. Anything the value tree cannot represent is
//! rejected with a shape error naming its path.

use serde::Serialize;

use scorpion_common::error::{Result, ScorpionError};
use scorpion_common::value::{Value, ValueMap};
use scorpion_common::workload::Workload;

/// Converts any serializable record into a [`Value`].
///
/// # Errors
///
/// Returns a shape error if the record does not serialize to a representable value.
pub fn to_value<T: Serialize + ?Sized>(path: &str, record: &T) -> Result<Value> {
    let json = serde_json::to_value(record).map_err(|e| ScorpionError::shape(path, e.to_string()))?;
    from_json(path, json)
}

/// Converts a JSON document into a [`Value`].
///
/// # Errors
///
/// Returns a shape error for numbers outside the signed 64-bit or finite float range.
pub fn from_json(path: &str, json: serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if n.is_u64() {
                return Err(ScorpionError::shape(
                    path,
                    format!("integer {n} does not fit in a signed 64-bit value"),
                ));
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() => Value::Float(f),
                    _ => {
                        return Err(ScorpionError::shape(
                            path,
                            format!("number {n} is not representable"),
                        ));
                    }
                }
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_json(&format!("{path}[{i}]"), item))
                .collect::<Result<_>>()?,
        ),
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| {
                    let child = from_json(&format!("{path}.{k}"), v)?;
                    Ok::<_, ScorpionError>((k, child))
                })
                .collect::<Result<_>>()?,
        ),
    })
}

/// Builds the parameter tree of a workload node: `{metadata, containers, service?}`.
///
/// `containers` is always present, empty when the workload declares none;
/// `service` is omitted when absent.
///
/// # Errors
///
/// Returns a shape error if any part of the workload cannot be represented.
pub fn workload_params(workload: &Workload) -> Result<ValueMap> {
    let mut params = ValueMap::new();
    let _ = params.insert("metadata".into(), to_value("metadata", &workload.metadata)?);
    let _ = params.insert("containers".into(), to_value("containers", &workload.containers)?);
    if let Some(service) = &workload.service {
        let _ = params.insert("service".into(), to_value("service", service)?);
    }
    Ok(params)
}
