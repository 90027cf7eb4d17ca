use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Upper bound on additional members per team entry (the lead is not counted).
pub const MAX_TEAM_MEMBERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationType {
    Solo,
    Team,
}

impl ParticipationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationType::Solo => "solo",
            ParticipationType::Team => "team",
        }
    }
}

impl fmt::Display for ParticipationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solo" => Ok(ParticipationType::Solo),
            "team" => Ok(ParticipationType::Team),
            other => Err(format!("unknown participation type '{other}'")),
        }
    }
}

/// A team member as accepted by the validator, before it has been stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeamMember {
    pub name: String,
    pub email: String,
}

/// A validated, normalized submission ready to be written.
///
/// Solo entries always carry an empty `team_members` list and no `team_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub participation_type: ParticipationType,
    pub contact_person_name: String,
    pub mobile_number: String,
    pub email: String,
    pub team_name: Option<String>,
    pub team_members: Vec<NewTeamMember>,
    pub concept: String,
    pub objective: String,
    pub requirements: String,
    pub technical_applications: String,
    pub slides_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i64,
    pub submission_id: i64,
    pub name: String,
    pub email: String,
}

/// Raw `submissions` row. `participation_type` is kept as text here and
/// parsed when the row is turned into a [`Submission`].
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: i64,
    pub participation_type: String,
    pub contact_person_name: String,
    pub mobile_number: String,
    pub email: String,
    pub team_name: Option<String>,
    pub concept: String,
    pub objective: String,
    pub requirements: String,
    pub technical_applications: String,
    pub slides_link: String,
    pub submission_timestamp: DateTime<Utc>,
}

/// A stored submission as returned to the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub participation_type: ParticipationType,
    pub contact_person_name: String,
    pub mobile_number: String,
    pub email: String,
    pub team_name: Option<String>,
    pub concept: String,
    pub objective: String,
    pub requirements: String,
    pub technical_applications: String,
    pub slides_link: String,
    pub submission_timestamp: DateTime<Utc>,
    /// Additional members only; the lead is never counted.
    pub team_member_count: usize,
    pub team_members: Vec<TeamMember>,
}

impl Submission {
    pub fn from_row(
        row: SubmissionRow,
        team_members: Vec<TeamMember>,
    ) -> Result<Self, String> {
        Ok(Submission {
            id: row.id,
            participation_type: row.participation_type.parse()?,
            contact_person_name: row.contact_person_name,
            mobile_number: row.mobile_number,
            email: row.email,
            team_name: row.team_name,
            concept: row.concept,
            objective: row.objective,
            requirements: row.requirements,
            technical_applications: row.technical_applications,
            slides_link: row.slides_link,
            submission_timestamp: row.submission_timestamp,
            team_member_count: team_members.len(),
            team_members,
        })
    }

    /// Lead plus additional members.
    pub fn total_team_size(&self) -> usize {
        match self.participation_type {
            ParticipationType::Solo => 1,
            ParticipationType::Team => self.team_member_count + 1,
        }
    }
}
