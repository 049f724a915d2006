/// Course types shared by the repository and the HTTP layer
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::error::CourseError;

/// A stored course offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub subject: String,
    pub credit: u32,
    pub section: Vec<String>,
    pub day_of_week: String,
    #[serde(with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub end_time: NaiveTime,
    pub capacity: u32,
    pub state: String,
    #[serde(default)]
    pub current_student: Vec<String>,
    /// `None` means the course has no prerequisite
    #[serde(default)]
    pub prerequisite: Option<Vec<String>>,
}

/// Body of a create request. Every field is optional here so that a missing
/// field can be reported by name instead of as a generic decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseDraft {
    pub course_id: Option<i64>,
    pub subject: Option<String>,
    pub credit: Option<u32>,
    pub section: Option<Vec<String>>,
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<u32>,
    pub state: Option<String>,
    pub current_student: Option<Vec<String>>,
    pub prerequisite: Option<Vec<String>>,
}

impl CourseDraft {
    /// Checks that every required field is present and well formed.
    ///
    /// # Returns
    /// * `Ok(Course)` - The course exactly as it should be stored
    /// * `Err(CourseError::Validation)` - Naming the first offending field
    pub fn validate(self) -> Result<Course, CourseError> {
        let course_id = self.course_id.ok_or_else(|| CourseError::missing("course_id"))?;
        let subject = non_empty("subject", required("subject", self.subject)?)?;
        let credit = positive("credit", required("credit", self.credit)?)?;
        let section = required("section", self.section)?;
        let day_of_week = non_empty("day_of_week", required("day_of_week", self.day_of_week)?)?;
        let start_time = parse_time("start_time", &required("start_time", self.start_time)?)?;
        let end_time = parse_time("end_time", &required("end_time", self.end_time)?)?;
        let capacity = positive("capacity", required("capacity", self.capacity)?)?;
        let state = non_empty("state", required("state", self.state)?)?;

        Ok(Course {
            course_id,
            subject,
            credit,
            section,
            day_of_week,
            start_time,
            end_time,
            capacity,
            state,
            current_student: self.current_student.unwrap_or_default(),
            prerequisite: self.prerequisite,
        })
    }
}

/// Body of an update request.
///
/// `None` means "leave the stored value alone"; a JSON `null` is treated the
/// same as a missing key. `course_id` cannot be changed, so a `course_id`
/// key in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CoursePatch {
    pub subject: Option<String>,
    pub credit: Option<u32>,
    pub section: Option<Vec<String>>,
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<u32>,
    pub state: Option<String>,
    pub current_student: Option<Vec<String>>,
    pub prerequisite: Option<Vec<String>>,
}

impl CoursePatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == CoursePatch::default()
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, CourseError> {
    value.ok_or_else(|| CourseError::missing(field))
}

pub(crate) fn non_empty(field: &'static str, value: String) -> Result<String, CourseError> {
    if value.trim().is_empty() {
        return Err(CourseError::Validation {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

pub(crate) fn positive(field: &'static str, value: u32) -> Result<u32, CourseError> {
    if value == 0 {
        return Err(CourseError::Validation {
            field,
            message: "must be a positive integer".to_string(),
        });
    }
    Ok(value)
}

pub(crate) fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, CourseError> {
    time_of_day::parse(value).map_err(|e| CourseError::Validation {
        field,
        message: format!("expected HH:MM or HH:MM:SS, got {:?} ({})", value, e),
    })
}

/// Serde adapter for time-of-day values written as `HH:MM[:SS]`.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Canonical storage and wire format.
    pub const FORMAT: &str = "%H:%M:%S";

    /// Parses `HH:MM:SS`, falling back to `HH:MM`.
    pub fn parse(value: &str) -> Result<NaiveTime, chrono::ParseError> {
        let value = value.trim();
        NaiveTime::parse_from_str(value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
    }

    pub fn format(time: &NaiveTime) -> String {
        time.format(FORMAT).to_string()
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_draft() -> CourseDraft {
        serde_json::from_value(json!({
            "course_id": 4,
            "subject": "Chemistry",
            "credit": 3,
            "section": ["1"],
            "day_of_week": "Friday",
            "start_time": "09:00",
            "end_time": "12:00",
            "capacity": 20,
            "state": "open"
        }))
        .unwrap()
    }

    #[test]
    fn test_draft_defaults_optional_fields() {
        let course = full_draft().validate().unwrap();
        assert_eq!(course.course_id, 4);
        assert_eq!(course.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(course.current_student.is_empty());
        assert_eq!(course.prerequisite, None);
    }

    #[test]
    fn test_draft_reports_missing_field() {
        let draft = CourseDraft {
            capacity: None,
            ..full_draft()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err, CourseError::missing("capacity"));
    }

    #[test]
    fn test_draft_rejects_zero_credit_and_bad_time() {
        let zero_credit = CourseDraft {
            credit: Some(0),
            ..full_draft()
        };
        assert!(matches!(
            zero_credit.validate(),
            Err(CourseError::Validation { field: "credit", .. })
        ));

        let bad_time = CourseDraft {
            end_time: Some("noon".to_string()),
            ..full_draft()
        };
        assert!(matches!(
            bad_time.validate(),
            Err(CourseError::Validation { field: "end_time", .. })
        ));
    }

    #[test]
    fn test_time_of_day_accepts_seconds_and_serializes_them() {
        assert_eq!(
            time_of_day::parse("13:05:30").unwrap(),
            NaiveTime::from_hms_opt(13, 5, 30).unwrap()
        );
        assert_eq!(
            time_of_day::parse("13:05").unwrap(),
            NaiveTime::from_hms_opt(13, 5, 0).unwrap()
        );
        assert!(time_of_day::parse("25:00").is_err());

        let course = full_draft().validate().unwrap();
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(value["start_time"], "09:00:00");
        assert_eq!(value["prerequisite"], serde_json::Value::Null);
        assert_eq!(value["current_student"], json!([]));
    }

    #[test]
    fn test_patch_treats_null_as_absent() {
        let patch: CoursePatch =
            serde_json::from_value(json!({ "state": null, "course_id": 9 })).unwrap();
        assert!(patch.is_empty());

        let patch: CoursePatch = serde_json::from_value(json!({ "state": "closed" })).unwrap();
        assert!(!patch.is_empty());
        assert_eq!(patch.state.as_deref(), Some("closed"));
    }
}
