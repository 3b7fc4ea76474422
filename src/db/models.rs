use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub student_name: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
    /// `None` until the submission has been graded.
    pub result: Option<GradeResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeResult {
    Pass,
    Fail,
}

impl GradeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for GradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGradeResult(pub String);

impl fmt::Display for UnknownGradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown grade result `{}` (expected `pass` or `fail`)", self.0)
    }
}

impl std::error::Error for UnknownGradeResult {}

impl FromStr for GradeResult {
    type Err = UnknownGradeResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Self::Pass),
            "fail" => Ok(Self::Fail),
            other => Err(UnknownGradeResult(other.to_string())),
        }
    }
}

/// Input for a new assignment, before the store assigns an id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Input for a new submission, before normalization and id assignment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    #[serde(default)]
    pub assignment_id: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_result_accepts_only_exact_names() {
        assert_eq!("pass".parse::<GradeResult>(), Ok(GradeResult::Pass));
        assert_eq!("fail".parse::<GradeResult>(), Ok(GradeResult::Fail));
        assert!(" PASS ".parse::<GradeResult>().is_err());
        assert!("Fail".parse::<GradeResult>().is_err());
        assert!("ungraded".parse::<GradeResult>().is_err());
    }

    #[test]
    fn submission_serializes_with_camel_case_and_null_result() {
        let submission = Submission {
            id: "sub_1".to_string(),
            assignment_id: "asg_1".to_string(),
            student_id: "HE000111".to_string(),
            student_name: "Nguyen Van A".to_string(),
            code: "int main(){return 0;}".to_string(),
            timestamp: Utc::now(),
            result: None,
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["assignmentId"], "asg_1");
        assert_eq!(json["studentId"], "HE000111");
        assert!(json["result"].is_null());

        let graded = Submission {
            result: Some(GradeResult::Fail),
            ..submission
        };
        assert_eq!(serde_json::to_value(&graded).unwrap()["result"], "fail");
    }
}
