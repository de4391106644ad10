use serde::Serialize;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;
mod views;

pub use table::{Column, Tabular};

/// Render a command response in the requested format.
pub fn render<T: Serialize + Tabular>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => {
            let prefs = ui::prefs();
            Ok(table::render(
                value,
                table::TableOptions {
                    max_width: prefs.term_width,
                    color: prefs.table_color,
                },
            ))
        }
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a command response in the requested format.
pub fn output<T: Serialize + Tabular>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Two-decimal score cell; `-` when absent.
pub fn score_cell(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Count {
        agent: &'static str,
        findings: u32,
    }

    impl Tabular for Count {
        fn columns(&self) -> &'static [Column] {
            const COLUMNS: &[Column] = &[Column::text("agent"), Column::number("findings")];
            COLUMNS
        }

        fn rows(&self) -> Vec<Vec<String>> {
            vec![vec![self.agent.to_string(), self.findings.to_string()]]
        }
    }

    const COUNT: Count = Count {
        agent: "security",
        findings: 7,
    };

    #[test]
    fn json_render_is_pretty_json() {
        let out = render(&COUNT, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["agent"], "security");
        assert_eq!(parsed["findings"], 7);
        assert!(out.contains('\n'));
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&COUNT, OutputFormat::Raw).unwrap();
        assert_eq!(out, r#"{"agent":"security","findings":7}"#);
    }

    #[test]
    fn table_render_uses_declared_columns() {
        let out = render(&COUNT, OutputFormat::Table).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("agent     findings"));
        assert_eq!(lines.nth(1), Some("security         7"));
    }

    #[test]
    fn scores_print_with_two_decimals() {
        assert_eq!(score_cell(Some(0.8444)), "0.84");
        assert_eq!(score_cell(None), "-");
    }
}
