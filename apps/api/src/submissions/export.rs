//! CSV export of the admin submission list.

use anyhow::{anyhow, Context, Result};

use crate::submissions::models::Submission;

const BASE_HEADERS: &[&str] = &[
    "ID",
    "Participation Type",
    "Contact Name",
    "Mobile",
    "Email",
    "Team Name",
    "Total Team Size",
    "Concept",
    "Objective",
    "Requirements",
    "Tech Applications",
    "Slides Link",
    "Submission Timestamp",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders submissions as CSV, one row per submission.
///
/// Member columns are sized to the largest team in the set and numbered from
/// 2, since member 1 is the contact person. Missing members leave empty cells.
pub fn submissions_to_csv(submissions: &[Submission]) -> Result<String> {
    let max_members = submissions
        .iter()
        .map(|s| s.team_members.len())
        .max()
        .unwrap_or(0);

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
    for n in 2..=max_members + 1 {
        headers.push(format!("Member {n} Name"));
        headers.push(format!("Member {n} Email"));
    }
    writer.write_record(&headers)?;

    for submission in submissions {
        let mut record = vec![
            submission.id.to_string(),
            submission.participation_type.to_string(),
            submission.contact_person_name.clone(),
            submission.mobile_number.clone(),
            submission.email.clone(),
            submission.team_name.clone().unwrap_or_default(),
            submission.total_team_size().to_string(),
            submission.concept.clone(),
            submission.objective.clone(),
            submission.requirements.clone(),
            submission.technical_applications.clone(),
            submission.slides_link.clone(),
            submission
                .submission_timestamp
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        ];
        for i in 0..max_members {
            match submission.team_members.get(i) {
                Some(member) => {
                    record.push(member.name.clone());
                    record.push(member.email.clone());
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
