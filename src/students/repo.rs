use async_trait::async_trait;

use crate::db::{PgStore, StoreError};
use crate::students::repo_types::Student;

#[async_trait]
pub trait StudentRepo: Send + Sync {
    async fn insert(&self, student: &Student) -> Result<(), StoreError>;
    async fn find(&self, id: &str) -> Result<Option<Student>, StoreError>;
    /// Returns the number of rows touched.
    async fn update(&self, id: &str, name: &str, course: &str) -> Result<u64, StoreError>;
    /// Returns the number of rows touched.
    async fn delete(&self, id: &str) -> Result<u64, StoreError>;
    /// All records ordered by id.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;
}

#[async_trait]
impl StudentRepo for PgStore {
    async fn insert(&self, student: &Student) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO students (student_id, student_name, student_course)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&student.id)
        .bind(&student.name)
        .bind(&student.course)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, student_name, student_course
              FROM students
             WHERE student_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: &str, name: &str, course: &str) -> Result<u64, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE students
               SET student_name = $1, student_course = $2
             WHERE student_id = $3
            "#,
        )
        .bind(name)
        .bind(course)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn delete(&self, id: &str) -> Result<u64, StoreError> {
        let res = sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let rows = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, student_name, student_course
              FROM students
             ORDER BY student_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
