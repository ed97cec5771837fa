//! `vigil validate`: check a data document against a schema

use crate::cli::ValidateArgs;
use crate::config::{is_yaml, Config};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use vigil_schemas::Schema;

/// Handle the validate command
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mut settings = config.validation.clone();
    settings.merge_args(&args);
    let options = settings.options();

    output.info(&format!(
        "Validating {} against {}",
        args.data.display(),
        args.schema.display()
    ))?;

    let document = load_document(&args.schema)?;
    let data = load_document(&args.data)?;

    if contains_reference(&document) {
        output.warning("Schema contains $ref; references are not resolved and are ignored")?;
    }

    let mut builder = Schema::builder(document);
    if let Some(draft) = settings.draft {
        builder = builder.with_version(draft);
    }
    let schema = builder.build();

    info!(options = ?options, "Running validation");
    match schema.validate_value(&data, &options) {
        Ok(validated) => {
            debug!(draft = ?schema.version(), "Validation succeeded");
            output.success(&format!(
                "{} is valid ({})",
                args.data.display(),
                schema.profile().draft()
            ))?;
            if args.print_data {
                output.data(&validated)?;
            }
            Ok(())
        }
        Err(error) => {
            output.engine_error(&error)?;
            Err(error.into())
        }
    }
}

/// Read a JSON or YAML document, chosen by file extension
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            reason: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Whether any schema node uses `$ref`
fn contains_reference(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("$ref") || map.values().any(contains_reference),
        Value::Array(items) => items.iter().any(contains_reference),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use serde_json::json;
    use tempfile::TempDir;
    use vigil_schemas::Draft;

    fn args(dir: &TempDir, schema: &str, data: &str) -> ValidateArgs {
        let schema_path = dir.path().join("schema.json");
        let data_path = dir.path().join("data.yaml");
        fs::write(&schema_path, schema).unwrap();
        fs::write(&data_path, data).unwrap();
        ValidateArgs {
            schema: schema_path,
            data: data_path,
            draft: None,
            set_default: false,
            remove_additional: false,
            no_annotate: false,
            context: None,
            print_data: false,
        }
    }

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(std::io::sink()))
    }

    #[test]
    fn test_valid_yaml_data() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"type": "object", "required": ["name"]}"#, "name: vigil\n");
        assert!(handle_validate(args, &Config::default(), &mut quiet_output()).is_ok());
    }

    #[test]
    fn test_validation_failure_exit_code() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"type": "object", "required": ["name"]}"#, "other: 1\n");
        let error = handle_validate(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert_eq!(error.exit_code(), 1);
        assert_eq!(error.engine().map(|e| e.kind().to_string()).as_deref(), Some("required"));
    }

    #[test]
    fn test_schema_error_exit_code() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"minimum": "zero"}"#, "5\n");
        let error = handle_validate(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_config_draft_applies() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, r#"{"dependentRequired": {"a": ["b"]}}"#, "a: 1\n");

        assert!(handle_validate(args.clone(), &Config::default(), &mut quiet_output()).is_ok());

        let mut config = Config::default();
        config.validation.draft = Some(Draft::Draft201909);
        assert!(handle_validate(args, &config, &mut quiet_output()).is_err());
    }

    #[test]
    fn test_missing_data_file() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir, "{}", "1\n");
        args.data = dir.path().join("absent.json");
        let error = handle_validate(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert!(matches!(error, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_yaml_data() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, "{}", "name: [unclosed\n");
        let error = handle_validate(args, &Config::default(), &mut quiet_output()).unwrap_err();
        assert!(matches!(&error, Error::InvalidFormat { expected, .. } if expected == "YAML"));
        assert_eq!(error.exit_code(), 6);
    }

    #[test]
    fn test_contains_reference() {
        assert!(contains_reference(&json!({"properties": {"a": {"$ref": "#/definitions/a"}}})));
        assert!(contains_reference(&json!({"allOf": [{"$ref": "x"}]})));
        assert!(!contains_reference(&json!({"properties": {"ref": {"type": "string"}}})));
    }
}
