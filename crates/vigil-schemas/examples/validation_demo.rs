//! Validation demonstration example
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

use serde_json::json;
use vigil_schemas::{Context, DataValue, Schema, ValidationOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Vigil Schema Validation Demo ===\n");

    let schema = Schema::new(json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["id", "name", "created"],
        "properties": {
            "id": {"type": "integer", "readOnly": true},
            "name": {"type": "string", "minLength": 1},
            "created": {"type": "string", "format": "date"},
            "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true, "default": []}
        },
        "additionalProperties": false
    }));

    demo_valid_write(&schema)?;
    println!();
    demo_error_tree(&schema)?;
    println!();
    demo_remove_additional(&schema)?;

    Ok(())
}

fn demo_valid_write(schema: &Schema) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Write context with defaults ---");

    let options = ValidationOptions::new()
        .with_context(Context::Write)
        .with_set_default(true);
    let data = DataValue::from(&json!({"name": "probe", "created": "2024-02-29"}));

    let result = schema.validate(data, &options, "")?;
    println!("✅ Valid, draft {}", schema.version().map(|v| v.to_string()).unwrap_or_default());
    println!("   {}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(())
}

fn demo_error_tree(schema: &Schema) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Error tree ---");

    let data = json!({"id": 1.5, "name": "", "created": "2023-02-29", "tags": ["a", "a"], "extra": true});
    match schema.validate_value(&data, &ValidationOptions::default()) {
        Ok(_) => println!("   Unexpectedly valid"),
        Err(error) => {
            println!("❌ {}", error);
            println!("{}", serde_json::to_string_pretty(&error.info())?);
        }
    }
    Ok(())
}

fn demo_remove_additional(schema: &Schema) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Removing additional properties ---");

    let options = ValidationOptions::new().with_remove_additional(true);
    let data = json!({"id": 7, "name": "probe", "created": "2024-01-01", "debug": true});
    let result = schema.validate_value(&data, &options)?;
    println!("✅ {}", result);
    Ok(())
}
