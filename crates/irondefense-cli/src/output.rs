//! Output formatting for action results.

use std::io::Write;

use irondefense_connector::ActionResult;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;
    fn format_json(&self) -> Result<String, serde_json::Error>;
}

fn render<T: FormattedOutput>(ctx: &CommandContext, value: &T) -> Result<String, CliError> {
    match ctx.format {
        OutputFormat::Text => Ok(value.format_text()),
        OutputFormat::Json => value
            .format_json()
            .map_err(|e| CliError::Other(anyhow::anyhow!("JSON serialization failed: {}", e))),
    }
}

/// Print formatted output to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput,
{
    let output = render(ctx, value)?;
    println!("{}", output);
    Ok(())
}

/// Print formatted output to a writer
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput,
    W: Write,
{
    let output = render(ctx, value)?;
    writeln!(writer, "{}", output).map_err(CliError::Io)?;
    Ok(())
}

/// Results of one invocation.
///
/// JSON output is the bare result object for a single run and an array
/// otherwise.
#[derive(Debug)]
pub struct ActionReport<'a> {
    results: &'a [ActionResult],
}

impl<'a> ActionReport<'a> {
    pub fn new(results: &'a [ActionResult]) -> Self {
        Self { results }
    }
}

fn format_result(result: &ActionResult) -> String {
    let icon = if result.is_success() { "✓" } else { "✗" };
    let mut out = format!("{icon} {}: {}", result.action, result.message);

    for (key, value) in &result.summary {
        out.push_str(&format!("\n  {key}: {value}"));
    }
    for data in &result.data {
        let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        out.push('\n');
        out.push_str(&pretty);
    }
    out
}

impl FormattedOutput for ActionReport<'_> {
    fn format_text(&self) -> String {
        self.results
            .iter()
            .map(format_result)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        match self.results {
            [single] => serde_json::to_string_pretty(single),
            all => serde_json::to_string_pretty(all),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn ctx(format: OutputFormat) -> CommandContext {
        CommandContext {
            config_path: PathBuf::from("irondefense.yaml"),
            state_path: None,
            format,
        }
    }

    fn results() -> Vec<ActionResult> {
        let mut ok = ActionResult::new("irondefense_get_alerts", json!({}));
        ok.update_summary("total_alerts", 1);
        ok.add_data(json!({"alerts": [{"id": "a-1"}]}));
        let failed = ActionResult::new("irondefense_get_event", json!({"event_id": "e-1"}))
            .fail("Event retrieval failed. Error: boom");
        vec![ok.succeed("Alerts were retrieved"), failed]
    }

    #[test]
    fn test_text_output() {
        let results = results();
        let mut buf = Vec::new();
        write_output(&ctx(OutputFormat::Text), &ActionReport::new(&results), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("✓ irondefense_get_alerts: Alerts were retrieved\n  total_alerts: 1\n"));
        assert!(text.contains("\"id\": \"a-1\""));
        assert!(text.contains("✗ irondefense_get_event: Event retrieval failed. Error: boom"));
    }

    #[test]
    fn test_json_single_result_is_an_object() {
        let results = results();
        let single = ActionReport::new(&results[..1]).format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&single).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["summary"]["total_alerts"], 1);

        let many = ActionReport::new(&results).format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&many).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["status"], "failed");
    }
}
