use serde_json::{json, Value};
use std::io::Read;

use crate::cli::OutputFormat;
use crate::error::GatewayError;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            match data {
                Some(Value::Object(fields)) => {
                    if let Some(object) = response.as_object_mut() {
                        object.extend(fields);
                    }
                }
                Some(other) => response["data"] = other,
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an API payload; text mode pretty-prints it under a heading
pub fn output_payload(output_format: &OutputFormat, heading: &str, payload: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "success": true,
                "data": payload
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", heading);
            if !payload.is_null() {
                println!("{}", serde_json::to_string_pretty(payload)?);
            }
        }
    }
    Ok(())
}

/// Report a gateway result: payload on success, classified error otherwise.
/// The error is still returned so the process exits non-zero.
pub fn output_result(
    output_format: &OutputFormat,
    heading: &str,
    result: Result<Value, GatewayError>,
) -> anyhow::Result<()> {
    match result {
        Ok(payload) => output_payload(output_format, heading, &payload),
        Err(e) => {
            if matches!(output_format, OutputFormat::Json) {
                output_error(output_format, &e.to_string(), Some(e.error_code()))?;
            }
            Err(e.into())
        }
    }
}

/// Parse a JSON argument, or read it from stdin when the argument is absent
pub fn read_json_input(provided: Option<String>) -> anyhow::Result<Value> {
    let raw = match provided {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid JSON input: {}", e))
}
