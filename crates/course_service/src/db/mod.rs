/// Database module for storing and querying course offerings

mod error;
mod pool;
mod types;

pub use error::CourseError;
pub use pool::{create_pool, seed, DbPool, PoolSettings};
pub use types::{time_of_day, Course, CourseDraft, CoursePatch};

use rusqlite::types::{Type, Value};
use rusqlite::{ffi, params, params_from_iter, OptionalExtension, Row};
use tracing::debug;

use types::{non_empty, parse_time, positive};

const COURSE_COLUMNS: &str = "course_id, subject, credit, section, day_of_week, \
     start_time, end_time, capacity, state, current_student, prerequisite";

/// Reads and writes rows of the `courses` table.
///
/// Every method checks out one pooled connection for the duration of a
/// single statement and hands it back on return.
#[derive(Clone)]
pub struct CourseRepository {
    pool: DbPool,
}

impl CourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Checks that a connection can be acquired and used.
    pub fn ping(&self) -> Result<(), CourseError> {
        let conn = self.pool.get()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Gets every course in storage order.
    ///
    /// A single undecodable row fails the whole call.
    pub fn list_all(&self) -> Result<Vec<Course>, CourseError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY course_id"
        ))?;

        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(courses)
    }

    /// Gets the course with the given ID.
    ///
    /// The ID is bound as text; SQLite's integer affinity on `course_id`
    /// handles the comparison, so a non-numeric ID simply matches nothing.
    pub fn get_by_id(&self, course_id: &str) -> Result<Course, CourseError> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = ?1"),
            params![course_id],
            course_from_row,
        )
        .optional()?
        .ok_or(CourseError::NotFound)
    }

    /// Validates and inserts a new course.
    ///
    /// # Returns
    /// * `Ok(Course)` - The stored course
    /// * `Err(CourseError::Validation)` - If a required field is missing or invalid
    /// * `Err(CourseError::Conflict)` - If the ID is already taken
    pub fn create(&self, draft: CourseDraft) -> Result<Course, CourseError> {
        let course = draft.validate()?;
        let conn = self.pool.get()?;

        let inserted = conn.execute(
            &format!(
                "INSERT INTO courses ({COURSE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                course.course_id,
                &course.subject,
                course.credit,
                encode_list(&course.section)?,
                &course.day_of_week,
                time_of_day::format(&course.start_time),
                time_of_day::format(&course.end_time),
                course.capacity,
                &course.state,
                encode_list(&course.current_student)?,
                course.prerequisite.as_deref().map(encode_list).transpose()?,
            ],
        );

        match inserted {
            Ok(_) => Ok(course),
            Err(e) if is_primary_key_violation(&e) => Err(CourseError::Conflict {
                course_id: course.course_id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Applies a partial update.
    ///
    /// Only the fields present in `patch` are written, in one `UPDATE`
    /// statement. An empty patch changes nothing but still reports
    /// `NotFound` for an unknown ID.
    pub fn update(&self, course_id: &str, patch: CoursePatch) -> Result<(), CourseError> {
        let assignments = patch_assignments(patch)?;
        let conn = self.pool.get()?;

        if assignments.is_empty() {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM courses WHERE course_id = ?1",
                    params![course_id],
                    |_| Ok(()),
                )
                .optional()?;
            return exists.ok_or(CourseError::NotFound);
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE courses SET {} WHERE course_id = ?{}",
            set_clause,
            assignments.len() + 1
        );
        debug!("Updating course {} with: {}", course_id, set_clause);

        let values = assignments
            .into_iter()
            .map(|(_, value)| value)
            .chain(std::iter::once(Value::Text(course_id.to_string())));

        match conn.execute(&sql, params_from_iter(values))? {
            0 => Err(CourseError::NotFound),
            _ => Ok(()),
        }
    }

    /// Deletes the course with the given ID.
    pub fn delete(&self, course_id: &str) -> Result<(), CourseError> {
        let conn = self.pool.get()?;
        match conn.execute("DELETE FROM courses WHERE course_id = ?1", params![course_id])? {
            0 => Err(CourseError::NotFound),
            _ => Ok(()),
        }
    }
}

/// Turns the present fields of a patch into `(column, value)` pairs.
fn patch_assignments(patch: CoursePatch) -> Result<Vec<(&'static str, Value)>, CourseError> {
    let mut assignments = Vec::new();

    if let Some(subject) = patch.subject {
        assignments.push(("subject", Value::Text(non_empty("subject", subject)?)));
    }
    if let Some(credit) = patch.credit {
        assignments.push(("credit", Value::Integer(positive("credit", credit)?.into())));
    }
    if let Some(section) = patch.section {
        assignments.push(("section", Value::Text(encode_list(&section)?)));
    }
    if let Some(day_of_week) = patch.day_of_week {
        assignments.push((
            "day_of_week",
            Value::Text(non_empty("day_of_week", day_of_week)?),
        ));
    }
    if let Some(start_time) = patch.start_time {
        let time = parse_time("start_time", &start_time)?;
        assignments.push(("start_time", Value::Text(time_of_day::format(&time))));
    }
    if let Some(end_time) = patch.end_time {
        let time = parse_time("end_time", &end_time)?;
        assignments.push(("end_time", Value::Text(time_of_day::format(&time))));
    }
    if let Some(capacity) = patch.capacity {
        assignments.push((
            "capacity",
            Value::Integer(positive("capacity", capacity)?.into()),
        ));
    }
    if let Some(state) = patch.state {
        assignments.push(("state", Value::Text(non_empty("state", state)?)));
    }
    if let Some(current_student) = patch.current_student {
        assignments.push(("current_student", Value::Text(encode_list(&current_student)?)));
    }
    if let Some(prerequisite) = patch.prerequisite {
        assignments.push(("prerequisite", Value::Text(encode_list(&prerequisite)?)));
    }

    Ok(assignments)
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    let prerequisite: Option<String> = row.get(10)?;

    Ok(Course {
        course_id: row.get(0)?,
        subject: row.get(1)?,
        credit: row.get(2)?,
        section: decode_list(3, &row.get::<_, String>(3)?)?,
        day_of_week: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        capacity: row.get(7)?,
        state: row.get(8)?,
        current_student: decode_list(9, &row.get::<_, String>(9)?)?,
        prerequisite: prerequisite
            .map(|raw| decode_list(10, &raw))
            .transpose()?,
    })
}

fn encode_list(items: &[String]) -> Result<String, CourseError> {
    Ok(serde_json::to_string(items)?)
}

fn decode_list(column: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error()
        .is_some_and(|e| e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
}
