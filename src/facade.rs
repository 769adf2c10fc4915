use chrono::{NaiveDate, Utc};

use crate::model::{
    Attendance, AttendancePatch, Class, ClassPatch, Course, CoursePatch, Enrollment,
    EnrollmentPatch, Id, InsertAttendance, InsertClass, InsertCourse, InsertEnrollment,
    InsertPayment, InsertSchoolYear, InsertStudent, InsertUser, Payment, PaymentFilter,
    PaymentPatch, SchoolYear, SchoolYearPatch, Student, StudentPatch, User,
};
use crate::store::Table;

/// Owns every entity table. Built once in `main` and threaded through the
/// IPC layer inside `AppState`; nothing in the crate touches entity data
/// except through these methods, and every method hands back owned clones.
#[derive(Debug)]
pub struct Store {
    users: Table<User>,
    school_years: Table<SchoolYear>,
    courses: Table<Course>,
    classes: Table<Class>,
    students: Table<Student>,
    enrollments: Table<Enrollment>,
    attendance: Table<Attendance>,
    payments: Table<Payment>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: Table::new(),
            school_years: Table::new(),
            courses: Table::new(),
            classes: Table::new(),
            students: Table::new(),
            enrollments: Table::new(),
            attendance: Table::new(),
            payments: Table::new(),
        }
    }

    // -- users ---------------------------------------------------------

    pub fn create_user(&mut self, input: InsertUser) -> User {
        let id = self.users.next_id();
        let user = User {
            id,
            username: input.username,
            password: input.password,
            display_name: input.display_name,
            is_admin: input.is_admin,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }

    pub fn user(&self, id: Id) -> Option<User> {
        self.users.get(id).cloned()
    }

    pub fn user_by_username(&self, username: &str) -> Option<User> {
        self.users.find(|u| u.username == username).cloned()
    }

    pub fn users(&self) -> Vec<User> {
        self.users.list()
    }

    // -- school years ----------------------------------------------------

    pub fn create_school_year(&mut self, input: InsertSchoolYear) -> SchoolYear {
        let id = self.school_years.next_id();
        let year = SchoolYear {
            id,
            name: input.name,
            start_date: input.start_date,
            end_date: input.end_date,
            active: input.active,
            created_at: Utc::now(),
        };
        self.school_years.insert(id, year.clone());
        year
    }

    pub fn school_year(&self, id: Id) -> Option<SchoolYear> {
        self.school_years.get(id).cloned()
    }

    pub fn school_years(&self) -> Vec<SchoolYear> {
        self.school_years.list()
    }

    pub fn update_school_year(&mut self, id: Id, patch: SchoolYearPatch) -> Option<SchoolYear> {
        let year = self.school_years.get_mut(id)?;
        if let Some(v) = patch.name {
            year.name = v;
        }
        if let Some(v) = patch.start_date {
            year.start_date = v;
        }
        if let Some(v) = patch.end_date {
            year.end_date = v;
        }
        if let Some(v) = patch.active {
            year.active = v;
        }
        Some(year.clone())
    }

    pub fn delete_school_year(&mut self, id: Id) -> bool {
        self.school_years.delete(id)
    }

    // -- courses ---------------------------------------------------------

    pub fn create_course(&mut self, input: InsertCourse) -> Course {
        let id = self.courses.next_id();
        let course = Course {
            id,
            name: input.name,
            description: input.description,
            kind: input.kind,
            school_year_id: input.school_year_id,
            monthly_fee: input.monthly_fee,
            active: input.active,
            created_at: Utc::now(),
        };
        self.courses.insert(id, course.clone());
        course
    }

    pub fn course(&self, id: Id) -> Option<Course> {
        self.courses.get(id).cloned()
    }

    /// Optional equality filter on the owning school year.
    pub fn courses(&self, school_year_id: Option<Id>) -> Vec<Course> {
        self.courses
            .list_where(|c| school_year_id.map_or(true, |y| c.school_year_id == y))
    }

    pub fn update_course(&mut self, id: Id, patch: CoursePatch) -> Option<Course> {
        let course = self.courses.get_mut(id)?;
        if let Some(v) = patch.name {
            course.name = v;
        }
        if let Some(v) = patch.description {
            course.description = v;
        }
        if let Some(v) = patch.kind {
            course.kind = v;
        }
        if let Some(v) = patch.school_year_id {
            course.school_year_id = v;
        }
        if let Some(v) = patch.monthly_fee {
            course.monthly_fee = v;
        }
        if let Some(v) = patch.active {
            course.active = v;
        }
        Some(course.clone())
    }

    pub fn delete_course(&mut self, id: Id) -> bool {
        self.courses.delete(id)
    }

    // -- classes ---------------------------------------------------------

    pub fn create_class(&mut self, input: InsertClass) -> Class {
        let id = self.classes.next_id();
        let class = Class {
            id,
            name: input.name,
            course_id: input.course_id,
            level: input.level,
            min_age: input.min_age,
            max_age: input.max_age,
            max_size: input.max_size,
            schedule: input.schedule,
            created_at: Utc::now(),
        };
        self.classes.insert(id, class.clone());
        class
    }

    pub fn class(&self, id: Id) -> Option<Class> {
        self.classes.get(id).cloned()
    }

    pub fn classes(&self, course_id: Option<Id>) -> Vec<Class> {
        self.classes
            .list_where(|c| course_id.map_or(true, |cid| c.course_id == cid))
    }

    pub fn update_class(&mut self, id: Id, patch: ClassPatch) -> Option<Class> {
        let class = self.classes.get_mut(id)?;
        if let Some(v) = patch.name {
            class.name = v;
        }
        if let Some(v) = patch.course_id {
            class.course_id = v;
        }
        if let Some(v) = patch.level {
            class.level = v;
        }
        if let Some(v) = patch.min_age {
            class.min_age = v;
        }
        if let Some(v) = patch.max_age {
            class.max_age = v;
        }
        if let Some(v) = patch.max_size {
            class.max_size = v;
        }
        if let Some(v) = patch.schedule {
            class.schedule = v;
        }
        Some(class.clone())
    }

    pub fn delete_class(&mut self, id: Id) -> bool {
        self.classes.delete(id)
    }

    // -- students --------------------------------------------------------

    pub fn create_student(&mut self, input: InsertStudent) -> Student {
        let id = self.students.next_id();
        let student = Student {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            email: input.email,
            guardian_name: input.guardian_name,
            created_at: Utc::now(),
        };
        self.students.insert(id, student.clone());
        student
    }

    /// Sequential single creates; output order mirrors input order. There
    /// is no rollback path: a single create cannot fail once the payload
    /// has deserialized, so the batch cannot partially fail either.
    pub fn create_students(&mut self, inputs: Vec<InsertStudent>) -> Vec<Student> {
        inputs
            .into_iter()
            .map(|input| self.create_student(input))
            .collect()
    }

    pub fn student(&self, id: Id) -> Option<Student> {
        self.students.get(id).cloned()
    }

    pub fn students(&self) -> Vec<Student> {
        self.students.list()
    }

    pub fn update_student(&mut self, id: Id, patch: StudentPatch) -> Option<Student> {
        let student = self.students.get_mut(id)?;
        if let Some(v) = patch.first_name {
            student.first_name = v;
        }
        if let Some(v) = patch.last_name {
            student.last_name = v;
        }
        if let Some(v) = patch.phone {
            student.phone = v;
        }
        if let Some(v) = patch.email {
            student.email = v;
        }
        if let Some(v) = patch.guardian_name {
            student.guardian_name = v;
        }
        Some(student.clone())
    }

    pub fn delete_student(&mut self, id: Id) -> bool {
        self.students.delete(id)
    }

    // -- enrollments -------------------------------------------------------

    pub fn create_enrollment(&mut self, input: InsertEnrollment) -> Enrollment {
        let id = self.enrollments.next_id();
        let enrollment = Enrollment {
            id,
            student_id: input.student_id,
            class_id: input.class_id,
            enrolled_at: input.enrolled_at.unwrap_or_else(Utc::now),
            active: input.active,
            created_at: Utc::now(),
        };
        self.enrollments.insert(id, enrollment.clone());
        enrollment
    }

    pub fn enrollment(&self, id: Id) -> Option<Enrollment> {
        self.enrollments.get(id).cloned()
    }

    /// Both filters optional; when both are present they AND together.
    pub fn enrollments(&self, student_id: Option<Id>, class_id: Option<Id>) -> Vec<Enrollment> {
        self.enrollments.list_where(|e| {
            student_id.map_or(true, |s| e.student_id == s)
                && class_id.map_or(true, |c| e.class_id == c)
        })
    }

    pub fn update_enrollment(&mut self, id: Id, patch: EnrollmentPatch) -> Option<Enrollment> {
        let enrollment = self.enrollments.get_mut(id)?;
        if let Some(v) = patch.student_id {
            enrollment.student_id = v;
        }
        if let Some(v) = patch.class_id {
            enrollment.class_id = v;
        }
        if let Some(v) = patch.active {
            enrollment.active = v;
        }
        Some(enrollment.clone())
    }

    pub fn delete_enrollment(&mut self, id: Id) -> bool {
        self.enrollments.delete(id)
    }

    // -- attendance --------------------------------------------------------

    pub fn create_attendance(&mut self, input: InsertAttendance) -> Attendance {
        let id = self.attendance.next_id();
        let record = Attendance {
            id,
            student_id: input.student_id,
            class_id: input.class_id,
            date: input.date,
            present: input.present,
            created_at: Utc::now(),
        };
        self.attendance.insert(id, record.clone());
        record
    }

    pub fn attendance(&self, id: Id) -> Option<Attendance> {
        self.attendance.get(id).cloned()
    }

    /// Class register. The optional `on` filter compares calendar days,
    /// never timestamps: a record stamped 18:30 still belongs to its day.
    pub fn attendance_by_class(&self, class_id: Id, on: Option<NaiveDate>) -> Vec<Attendance> {
        self.attendance.list_where(|a| {
            a.class_id == class_id && on.map_or(true, |day| a.date.date_naive() == day)
        })
    }

    pub fn attendance_by_student(&self, student_id: Id, class_id: Option<Id>) -> Vec<Attendance> {
        self.attendance.list_where(|a| {
            a.student_id == student_id && class_id.map_or(true, |c| a.class_id == c)
        })
    }

    pub fn update_attendance(&mut self, id: Id, patch: AttendancePatch) -> Option<Attendance> {
        let record = self.attendance.get_mut(id)?;
        if let Some(v) = patch.student_id {
            record.student_id = v;
        }
        if let Some(v) = patch.class_id {
            record.class_id = v;
        }
        if let Some(v) = patch.date {
            record.date = v;
        }
        if let Some(v) = patch.present {
            record.present = v;
        }
        Some(record.clone())
    }

    pub fn delete_attendance(&mut self, id: Id) -> bool {
        self.attendance.delete(id)
    }

    /// Upsert keyed on (student, class, calendar day). An input whose day
    /// matches an existing record updates that record in place, keeping its
    /// id and created_at; anything else inserts. One output per input, in
    /// input order. Inputs are taken strictly one at a time, so duplicates
    /// within one batch collapse onto the record the first one created.
    pub fn bulk_upsert_attendance(&mut self, records: Vec<InsertAttendance>) -> Vec<Attendance> {
        let mut out = Vec::with_capacity(records.len());
        for input in records {
            let day = input.date.date_naive();
            let found = self.attendance.find_mut(|a| {
                a.student_id == input.student_id
                    && a.class_id == input.class_id
                    && a.date.date_naive() == day
            });
            let record = match found {
                Some(existing) => {
                    existing.date = input.date;
                    existing.present = input.present;
                    existing.clone()
                }
                None => self.create_attendance(input),
            };
            out.push(record);
        }
        out
    }

    // -- payments ----------------------------------------------------------

    pub fn create_payment(&mut self, input: InsertPayment) -> Payment {
        let id = self.payments.next_id();
        let payment = Payment {
            id,
            student_id: input.student_id,
            course_id: input.course_id,
            amount: input.amount,
            month: input.month,
            year: input.year,
            paid_at: input.paid_at.unwrap_or_else(Utc::now),
            created_at: Utc::now(),
        };
        self.payments.insert(id, payment.clone());
        payment
    }

    pub fn payment(&self, id: Id) -> Option<Payment> {
        self.payments.get(id).cloned()
    }

    /// Whichever filter fields are present AND together; an empty filter
    /// returns every payment.
    pub fn payments(&self, filter: &PaymentFilter) -> Vec<Payment> {
        self.payments.list_where(|p| {
            filter.student_id.map_or(true, |s| p.student_id == s)
                && filter.course_id.map_or(true, |c| p.course_id == c)
                && filter.month.map_or(true, |m| p.month == m)
                && filter.year.map_or(true, |y| p.year == y)
        })
    }

    pub fn update_payment(&mut self, id: Id, patch: PaymentPatch) -> Option<Payment> {
        let payment = self.payments.get_mut(id)?;
        if let Some(v) = patch.student_id {
            payment.student_id = v;
        }
        if let Some(v) = patch.course_id {
            payment.course_id = v;
        }
        if let Some(v) = patch.amount {
            payment.amount = v;
        }
        if let Some(v) = patch.month {
            payment.month = v;
        }
        if let Some(v) = patch.year {
            payment.year = v;
        }
        if let Some(v) = patch.paid_at {
            payment.paid_at = v;
        }
        Some(payment.clone())
    }

    pub fn delete_payment(&mut self, id: Id) -> bool {
        self.payments.delete(id)
    }

    // -- existence checks used by handler-side validation -------------------

    pub fn has_school_year(&self, id: Id) -> bool {
        self.school_years.contains(id)
    }

    pub fn has_course(&self, id: Id) -> bool {
        self.courses.contains(id)
    }

    pub fn has_class(&self, id: Id) -> bool {
        self.classes.contains(id)
    }

    pub fn has_student(&self, id: Id) -> bool {
        self.students.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_flexible_datetime, CourseKind, Level};

    fn insert_student(first: &str, last: &str) -> InsertStudent {
        InsertStudent {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: "600000000".to_string(),
            email: None,
            guardian_name: None,
        }
    }

    fn insert_year(name: &str) -> InsertSchoolYear {
        InsertSchoolYear {
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            active: true,
        }
    }

    fn insert_course(name: &str, school_year_id: Id) -> InsertCourse {
        InsertCourse {
            name: name.to_string(),
            description: None,
            kind: CourseKind::Dance,
            school_year_id,
            monthly_fee: 30,
            active: true,
        }
    }

    fn insert_attendance(student_id: Id, class_id: Id, date: &str, present: bool) -> InsertAttendance {
        InsertAttendance {
            student_id,
            class_id,
            date: parse_flexible_datetime(date).expect("test date"),
            present,
        }
    }

    #[test]
    fn create_then_get_returns_equal_record() {
        let mut store = Store::new();
        let created = store.create_student(insert_student("Ana", "Serra"));
        assert_eq!(created.id, 1);
        assert_eq!(store.student(created.id), Some(created));
    }

    #[test]
    fn unknown_ids_are_not_found_everywhere() {
        let mut store = Store::new();
        assert!(store.student(42).is_none());
        assert!(store.update_student(42, StudentPatch::default()).is_none());
        assert!(!store.delete_student(42));
    }

    #[test]
    fn patch_merges_and_preserves_untouched_fields() {
        let mut store = Store::new();
        let created = store.create_student(InsertStudent {
            email: Some("ana@club.example".to_string()),
            guardian_name: Some("Maria Serra".to_string()),
            ..insert_student("Ana", "Serra")
        });

        let updated = store
            .update_student(
                created.id,
                StudentPatch {
                    phone: Some("699111222".to_string()),
                    email: Some(None), // explicit null clears
                    ..StudentPatch::default()
                },
            )
            .expect("student exists");

        assert_eq!(updated.phone, "699111222");
        assert_eq!(updated.email, None);
        assert_eq!(updated.first_name, "Ana");
        assert_eq!(updated.guardian_name.as_deref(), Some("Maria Serra"));
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = Store::new();
        let created = store.create_student(insert_student("Ana", "Serra"));
        assert!(store.delete_student(created.id));
        assert!(!store.delete_student(created.id));
    }

    #[test]
    fn course_filter_by_school_year() {
        let mut store = Store::new();
        let year = store.create_school_year(insert_year("2024-2025"));
        let other = store.create_school_year(insert_year("2025-2026"));
        let course = store.create_course(insert_course("Sevillanas", year.id));

        let hits = store.courses(Some(year.id));
        assert_eq!(hits, vec![course]);
        assert!(store.courses(Some(other.id)).is_empty());
        assert_eq!(store.courses(None).len(), 1);
    }

    #[test]
    fn enrollment_filters_and_together() {
        let mut store = Store::new();
        let ana = store.create_student(insert_student("Ana", "Serra"));
        let enrollment = store.create_enrollment(InsertEnrollment {
            student_id: ana.id,
            class_id: 5,
            enrolled_at: None,
            active: true,
        });
        store.create_enrollment(InsertEnrollment {
            student_id: ana.id,
            class_id: 6,
            enrolled_at: None,
            active: true,
        });

        let by_student = store.enrollments(Some(ana.id), None);
        assert_eq!(by_student.len(), 2);

        let both = store.enrollments(Some(ana.id), Some(5));
        assert_eq!(both, vec![enrollment.clone()]);
        assert_eq!(both[0].class_id, 5);
        assert!(both[0].active);

        assert!(store.enrollments(Some(ana.id + 1), Some(5)).is_empty());
    }

    #[test]
    fn create_students_preserves_input_order() {
        let mut store = Store::new();
        let created = store.create_students(vec![
            insert_student("Ana", "Serra"),
            insert_student("Pau", "Vila"),
            insert_student("Júlia", "Font"),
        ]);
        let names: Vec<&str> = created.iter().map(|s| s.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Pau", "Júlia"]);
        assert_eq!(created[0].id + 1, created[1].id);
        assert_eq!(store.students().len(), 3);
    }

    #[test]
    fn bulk_upsert_updates_same_calendar_day_in_place() {
        let mut store = Store::new();
        let existing =
            store.create_attendance(insert_attendance(1, 2, "2024-03-04T18:30:00Z", false));

        let result = store.bulk_upsert_attendance(vec![insert_attendance(1, 2, "2024-03-04", true)]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, existing.id, "same day must reuse the record");
        assert!(result[0].present);
        assert_eq!(store.attendance_by_class(2, None).len(), 1);
        assert_eq!(
            store.attendance(existing.id).map(|a| a.created_at),
            Some(existing.created_at)
        );
    }

    #[test]
    fn bulk_upsert_inserts_new_triples() {
        let mut store = Store::new();
        store.create_attendance(insert_attendance(1, 2, "2024-03-04", false));

        let result = store.bulk_upsert_attendance(vec![
            insert_attendance(1, 2, "2024-03-05", true),
            insert_attendance(3, 2, "2024-03-04", true),
        ]);

        assert_eq!(result.len(), 2);
        assert_eq!(store.attendance_by_class(2, None).len(), 3);
    }

    #[test]
    fn attendance_by_class_filters_on_calendar_day() {
        let mut store = Store::new();
        store.create_attendance(insert_attendance(1, 2, "2024-03-04T09:00:00Z", true));
        store.create_attendance(insert_attendance(4, 2, "2024-03-04T19:45:00Z", false));
        store.create_attendance(insert_attendance(1, 2, "2024-03-05", true));
        store.create_attendance(insert_attendance(1, 9, "2024-03-04", true));

        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let hits = store.attendance_by_class(2, Some(day));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|a| a.class_id == 2 && a.date.date_naive() == day));

        assert_eq!(store.attendance_by_student(1, Some(2)).len(), 2);
        assert_eq!(store.attendance_by_student(1, None).len(), 3);
    }

    #[test]
    fn payment_filter_subsets_and_together() {
        let mut store = Store::new();
        for (student, course, month, year) in [(1, 1, 3, 2024), (1, 2, 3, 2024), (2, 1, 4, 2024)] {
            store.create_payment(InsertPayment {
                student_id: student,
                course_id: course,
                amount: 30,
                month,
                year,
                paid_at: None,
            });
        }

        assert_eq!(store.payments(&PaymentFilter::default()).len(), 3);
        let march_for_one = store.payments(&PaymentFilter {
            student_id: Some(1),
            month: Some(3),
            ..PaymentFilter::default()
        });
        assert_eq!(march_for_one.len(), 2);
        assert!(march_for_one.iter().all(|p| p.student_id == 1 && p.month == 3));

        let narrow = store.payments(&PaymentFilter {
            student_id: Some(1),
            course_id: Some(2),
            month: Some(3),
            year: Some(2024),
        });
        assert_eq!(narrow.len(), 1);
        assert_eq!(narrow[0].course_id, 2);
    }

    #[test]
    fn class_patch_clears_optional_limits() {
        let mut store = Store::new();
        let class = store.create_class(InsertClass {
            name: "Iniciación".to_string(),
            course_id: 1,
            level: Level::Beginner,
            min_age: Some(6),
            max_age: Some(9),
            max_size: Some(15),
            schedule: Vec::new(),
        });

        let updated = store
            .update_class(
                class.id,
                ClassPatch {
                    max_size: Some(None),
                    ..ClassPatch::default()
                },
            )
            .expect("class exists");
        assert_eq!(updated.max_size, None);
        assert_eq!(updated.min_age, Some(6), "untouched limit survives");
    }
}
