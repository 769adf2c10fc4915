use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type Id = i64;

/// Distinguishes "key absent" (outer None) from "key set to null" (Some(None))
/// in patch payloads. Plain `Option<Option<T>>` collapses both to None.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Accepts either a full RFC 3339 timestamp or a bare YYYY-MM-DD day
/// (interpreted as midnight UTC). Client payloads mix both shapes.
pub fn parse_flexible_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let t = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(t, "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc())
}

fn flexible_datetime<'de, D>(de: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(de)?;
    parse_flexible_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom("expected RFC 3339 timestamp or YYYY-MM-DD date"))
}

fn flexible_datetime_opt<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_flexible_datetime(&s).map(Some).ok_or_else(|| {
            serde::de::Error::custom("expected RFC 3339 timestamp or YYYY-MM-DD date")
        }),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// School years
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolYear {
    pub id: Id,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertSchoolYear {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolYearPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    Dance,
    Music,
    Culture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    pub school_year_id: Id,
    pub monthly_fee: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertCourse {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CourseKind,
    pub school_year_id: Id,
    pub monthly_fee: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(rename = "type")]
    pub kind: Option<CourseKind>,
    pub school_year_id: Option<Id>,
    pub monthly_fee: Option<i64>,
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// One recurring slot in a class timetable. Times are kept as the "HH:MM"
/// strings the client sends; the daemon never does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Id,
    pub name: String,
    pub course_id: Id,
    pub level: Level,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_size: Option<i64>,
    pub schedule: Vec<ScheduleSlot>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertClass {
    pub name: String,
    pub course_id: Id,
    pub level: Level,
    #[serde(default)]
    pub min_age: Option<i64>,
    #[serde(default)]
    pub max_age: Option<i64>,
    #[serde(default)]
    pub max_size: Option<i64>,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    pub name: Option<String>,
    pub course_id: Option<Id>,
    pub level: Option<Level>,
    #[serde(default, deserialize_with = "double_option")]
    pub min_age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_size: Option<Option<i64>>,
    pub schedule: Option<Vec<ScheduleSlot>>,
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub guardian_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertStudent {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub guardian_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub guardian_name: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Id,
    pub student_id: Id,
    pub class_id: Id,
    pub enrolled_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertEnrollment {
    pub student_id: Id,
    pub class_id: Id,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub enrolled_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentPatch {
    pub student_id: Option<Id>,
    pub class_id: Option<Id>,
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Id,
    pub student_id: Id,
    pub class_id: Id,
    pub date: DateTime<Utc>,
    pub present: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAttendance {
    pub student_id: Id,
    pub class_id: Id,
    #[serde(deserialize_with = "flexible_datetime")]
    pub date: DateTime<Utc>,
    pub present: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    pub student_id: Option<Id>,
    pub class_id: Option<Id>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub date: Option<DateTime<Utc>>,
    pub present: Option<bool>,
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Id,
    pub student_id: Id,
    pub course_id: Id,
    pub amount: i64,
    pub month: u32,
    pub year: i32,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertPayment {
    pub student_id: Id,
    pub course_id: Id,
    pub amount: i64,
    pub month: u32,
    pub year: i32,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    pub student_id: Option<Id>,
    pub course_id: Option<Id>,
    pub amount: Option<i64>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "flexible_datetime_opt")]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFilter {
    pub student_id: Option<Id>,
    pub course_id: Option<Id>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

fn default_true() -> bool {
    true
}
