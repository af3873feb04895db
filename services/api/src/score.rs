use clap::Args;
use school_hr::employees::{
    assess, profile_from_json, CompletionReport, ProfileShapeError, SectionProgress,
};
use school_hr::error::AppError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Profile document (JSON) to score
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_profile_score(args: ScoreArgs) -> Result<(), AppError> {
    let report = score_file(&args.file)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_report(&args.file, &report);
    }
    Ok(())
}

pub(crate) fn score_file(path: &Path) -> Result<CompletionReport, AppError> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw).map_err(ProfileShapeError::from)?;
    let profile = profile_from_json(&value)?;
    Ok(assess(&profile))
}

fn render_report(path: &Path, report: &CompletionReport) {
    let status = &report.status;
    println!("Profile completion for {}", path.display());
    println!("  Overall: {}%", status.overall_percentage);
    render_section(
        "Personal details",
        &report.breakdown.personal_details,
        status.personal_details_complete,
    );
    render_section(
        "Documents",
        &report.breakdown.documents,
        status.required_documents_complete,
    );
    if report.ready_for_verification {
        println!("  Ready for verification");
    } else {
        println!("  Not ready for verification");
    }
}

fn render_section(label: &str, section: &SectionProgress, complete: bool) {
    let marker = if complete { "complete" } else { "incomplete" };
    println!("  {label}: {}/{} ({marker})", section.filled, section.total);
    for field in &section.missing {
        println!("    missing {field}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("school-hr-{}-{name}", process::id()));
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn scores_a_profile_file() {
        let path = write_temp(
            "partial.json",
            r#"{ "personal_details": { "contact_number": "555-0101", "tax_id": "" } }"#,
        );

        let report = score_file(&path).expect("profile scored");
        fs::remove_file(&path).ok();

        assert_eq!(report.status.overall_percentage, 28);
        assert_eq!(report.breakdown.personal_details.filled, 1);
        assert!(!report.ready_for_verification);
    }

    #[test]
    fn rejects_non_object_documents() {
        let path = write_temp("array.json", "[1, 2, 3]");

        let error = score_file(&path).expect_err("array rejected");
        fs::remove_file(&path).ok();

        assert!(matches!(
            error,
            AppError::Profile(ProfileShapeError::NotAnObject { found: "array" })
        ));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let path = env::temp_dir().join("school-hr-does-not-exist.json");
        let error = score_file(&path).expect_err("missing file");
        assert!(matches!(error, AppError::Io(_)));
    }
}
