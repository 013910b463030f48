use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    #[sqlx(rename = "student_id")]
    pub id: String,
    #[sqlx(rename = "student_name")]
    pub name: String,
    #[sqlx(rename = "student_course")]
    pub course: String,
}

impl Student {
    /// Multi-line form used for a single lookup.
    pub fn record_text(&self) -> String {
        format!("ID: {}\nName: {}\nCourse: {}\n", self.id, self.name, self.course)
    }

    /// One-line form used in listings.
    pub fn listing_line(&self) -> String {
        format!("ID: {}, Name: {}, Course: {}\n", self.id, self.name, self.course)
    }
}

pub fn listing_text(students: &[Student]) -> String {
    students.iter().map(Student::listing_line).collect()
}
