//! In-memory repositories for tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::auth::{repo::UserRepo, repo_types::User};
use crate::students::{repo::StudentRepo, repo_types::Student};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    students: RwLock<BTreeMap<String, Student>>,
}

fn missing_user(username: &str) -> StoreError {
    StoreError::Query(format!("no user {}", username))
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("users_username_key".into()),
            });
        }
        let user = User {
            user_id: Uuid::new_v4(),
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            login_attempts: 0,
            last_login: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(username.to_owned(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn record_failed_login(&self, username: &str) -> Result<i32, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(username).ok_or_else(|| missing_user(username))?;
        user.login_attempts += 1;
        Ok(user.login_attempts)
    }

    async fn record_successful_login(
        &self,
        username: &str,
    ) -> Result<OffsetDateTime, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(username).ok_or_else(|| missing_user(username))?;
        let now = OffsetDateTime::now_utc();
        user.login_attempts = 0;
        user.last_login = Some(now);
        Ok(now)
    }
}

#[async_trait]
impl StudentRepo for MemoryStore {
    async fn insert(&self, student: &Student) -> Result<(), StoreError> {
        let mut students = self.students.write().await;
        if students.contains_key(&student.id) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("students_pkey".into()),
            });
        }
        students.insert(student.id.clone(), student.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Student>, StoreError> {
        Ok(self.students.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, name: &str, course: &str) -> Result<u64, StoreError> {
        let mut students = self.students.write().await;
        match students.get_mut(id) {
            Some(s) => {
                s.name = name.to_owned();
                s.course = course.to_owned();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &str) -> Result<u64, StoreError> {
        Ok(self.students.write().await.remove(id).map_or(0, |_| 1))
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.students.read().await.values().cloned().collect())
    }
}
