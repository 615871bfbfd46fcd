use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success line, or `{"success": true, "message": ..., ...data}` with --json
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message,
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a value as pretty JSON regardless of format; text mode adds a heading
pub fn output_value(output_format: OutputFormat, heading: &str, value: &Value) -> anyhow::Result<()> {
    if let OutputFormat::Text = output_format {
        println!("{}:", heading);
    }
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
