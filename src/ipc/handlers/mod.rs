pub mod attendance;
pub mod classes;
pub mod core;
pub mod courses;
pub mod enrollments;
pub mod payments;
pub mod school_years;
pub mod students;
pub mod users;
