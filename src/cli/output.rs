//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{ChatscoreArgs, OutputFormat};
use crate::error::Result;

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &ChatscoreArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &ChatscoreArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    let mut lines = Vec::new();
    render_human(&value, 0, &mut lines);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ChatscoreArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Render nested objects as indented `key: value` lines.
///
/// Arrays of scalars stay on one line; arrays of objects are listed with
/// their index.
fn render_human(value: &serde_json::Value, indent: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                if is_scalar_like(val) {
                    lines.push(format!("{pad}{key}: {}", format_value(val)));
                } else {
                    lines.push(format!("{pad}{key}:"));
                    render_human(val, indent + 1, lines);
                }
            }
        }
        serde_json::Value::Array(arr) if !is_scalar_like(value) => {
            for (i, val) in arr.iter().enumerate() {
                lines.push(format!("{pad}[{i}]"));
                render_human(val, indent + 1, lines);
            }
        }
        _ => lines.push(format!("{pad}{}", format_value(value))),
    }
}

/// Scalars, empty containers and arrays of scalars.
fn is_scalar_like(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Object(obj) => obj.is_empty(),
        serde_json::Value::Array(arr) => arr
            .iter()
            .all(|v| !matches!(v, serde_json::Value::Object(_) | serde_json::Value::Array(_))),
        _ => true,
    }
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => format_float(f),
            _ => n.to_string(),
        },
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(obj) if obj.is_empty() => "{}".to_string(),
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

/// Up to four decimals, trailing zeros trimmed.
fn format_float(value: f64) -> String {
    let formatted = format!("{value:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("test")), "test");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!(0.123456)), "0.1235");
        assert_eq!(format_value(&json!(2.5)), "2.5");
        assert_eq!(format_value(&json!(false)), "false");
        assert_eq!(format_value(&json!(null)), "-");
        assert_eq!(format_value(&json!(["a", 1])), "[a, 1]");
    }

    #[test]
    fn test_render_human() {
        let value = json!({
            "riskScore": 72.5,
            "riskLevel": "high",
            "factors": [{"factor": "inactive"}],
            "tags": ["x", "y"],
            "lifetimeValue": {"total": 100}
        });
        let mut lines = Vec::new();
        render_human(&value, 0, &mut lines);

        assert_eq!(
            lines,
            vec![
                "factors:",
                "  [0]",
                "    factor: inactive",
                "lifetimeValue:",
                "  total: 100",
                "riskLevel: high",
                "riskScore: 72.5",
                "tags: [x, y]",
            ]
        );
    }
}
