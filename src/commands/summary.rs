use crate::commands::{write_report, CommandContext, Outcome};
use crate::report::{self, ReportOptions};
use chrono::Local;

const SUMMARY_TITLE: &str = "Error Monitor Summary";

/// Imprime el resumen por frecuencia del almacén y lo guarda en `report_dir`.
pub fn run_summary(ctx: &CommandContext) -> anyhow::Result<Outcome> {
    let store = ctx.open_store()?;
    let events = store.load_all();

    let now = Local::now().naive_local();
    let options = ReportOptions {
        title: SUMMARY_TITLE.to_string(),
        generated_at: now,
        group_by_category: false,
    };
    let text = report::summarize_by_frequency(&events, &options);
    println!("{}", text);

    let path = ctx.report_path("error_summary", now);
    write_report(&path, &text)?;
    println!("📄 Resumen guardado en {}", path.display());

    Ok(Outcome::Clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, Origin, Severity};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_summary_saves_ranked_report() {
        let tmp = TempDir::new().unwrap();
        let ctx = CommandContext::load(Some(tmp.path().to_path_buf()), true).unwrap();
        let store = ctx.open_store().unwrap();
        for category in ["missing-header", "unresolved-symbol", "missing-header"] {
            store
                .append(Diagnostic {
                    origin: Origin::Build,
                    source: "build/msbuild.log".to_string(),
                    line: None,
                    located_file: None,
                    rule: None,
                    category: category.to_string(),
                    severity: Severity::Error,
                    message: category.to_string(),
                    description: None,
                    suggested_fix: None,
                    owner: None,
                    auto_fixable: false,
                    timestamp: None,
                })
                .unwrap();
        }

        assert_eq!(run_summary(&ctx).unwrap(), Outcome::Clean);

        let saved: Vec<_> = fs::read_dir(tmp.path().join("runtime"))
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.to_string_lossy().contains("error_summary_"))
            .collect();
        assert_eq!(saved.len(), 1);
        let text = fs::read_to_string(&saved[0]).unwrap();
        assert!(text.contains("- missing-header: 2 occurrences"));
        assert!(text.find("missing-header").unwrap() < text.find("unresolved-symbol").unwrap());
    }
}
