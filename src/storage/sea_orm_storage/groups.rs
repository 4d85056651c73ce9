use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{class_users, classes, course_users, courses, team_users};
use crate::errors::{Result, SchulCloudError};
use crate::models::groups::entities::{
    ClassMemberRole, Course, CourseRole, Membership, SchoolClass, Team, TeamRole,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::warn;

/// 由外部系统给定名称的班级
const NAME_FORMAT_STATIC: &str = "static";

impl SeaOrmStorage {
    pub async fn create_course_impl(
        &self,
        school_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();
        let model = CourseActiveModel {
            school_id: Set(school_id),
            name: Set(name.to_string()),
            color: Set(color.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    pub async fn add_course_member_impl(
        &self,
        course_id: i64,
        user_id: i64,
        role: CourseRole,
    ) -> Result<()> {
        CourseUserActiveModel {
            course_id: Set(course_id),
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchulCloudError::database_operation(format!("添加课程成员失败: {e}")))?;

        Ok(())
    }

    pub async fn get_course_memberships_impl(
        &self,
        user_id: i64,
    ) -> Result<Vec<Membership<CourseRole>>> {
        let rows = CourseUsers::find()
            .filter(course_users::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询课程成员失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.role.parse::<CourseRole>() {
                Ok(role) => Some(Membership {
                    group_id: row.course_id,
                    role,
                }),
                Err(e) => {
                    warn!("忽略未知课程角色: {}", e);
                    None
                }
            })
            .collect())
    }

    pub async fn get_courses_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Courses::find()
            .filter(courses::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_course()).collect())
    }

    pub async fn count_course_students_impl(
        &self,
        course_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = CourseUsers::find()
            .filter(course_users::Column::CourseId.is_in(course_ids.to_vec()))
            .filter(course_users::Column::Role.eq(CourseRole::Student.as_str()))
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询课程成员失败: {e}")))?;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for row in rows {
            *counts.entry(row.course_id).or_default() += 1;
        }
        Ok(counts)
    }

    pub async fn create_team_impl(&self, school_id: i64, name: &str) -> Result<Team> {
        let now = chrono::Utc::now().timestamp();
        let model = TeamActiveModel {
            school_id: Set(school_id),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建团队失败: {e}")))?;

        Ok(result.into_team())
    }

    pub async fn add_team_member_impl(
        &self,
        team_id: i64,
        user_id: i64,
        role: TeamRole,
    ) -> Result<()> {
        TeamUserActiveModel {
            team_id: Set(team_id),
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchulCloudError::database_operation(format!("添加团队成员失败: {e}")))?;

        Ok(())
    }

    pub async fn get_team_memberships_impl(
        &self,
        user_id: i64,
    ) -> Result<Vec<Membership<TeamRole>>> {
        let rows = TeamUsers::find()
            .filter(team_users::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询团队成员失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.role.parse::<TeamRole>() {
                Ok(role) => Some(Membership {
                    group_id: row.team_id,
                    role,
                }),
                Err(e) => {
                    warn!("忽略未知团队角色: {}", e);
                    None
                }
            })
            .collect())
    }

    /// 按学年与 LDAP DN 查找班级
    pub async fn get_class_by_ldap_dn_impl(
        &self,
        school_id: i64,
        year: &str,
        ldap_dn: &str,
    ) -> Result<Option<SchoolClass>> {
        let result = Classes::find()
            .filter(classes::Column::SchoolId.eq(school_id))
            .filter(classes::Column::Year.eq(year))
            .filter(classes::Column::LdapDn.eq(ldap_dn))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn create_class_impl(
        &self,
        school_id: i64,
        name: &str,
        ldap_dn: Option<&str>,
        year: Option<&str>,
    ) -> Result<SchoolClass> {
        let now = chrono::Utc::now().timestamp();
        let model = ClassActiveModel {
            school_id: Set(school_id),
            name: Set(name.to_string()),
            name_format: Set(NAME_FORMAT_STATIC.to_string()),
            ldap_dn: Set(ldap_dn.map(str::to_string)),
            year: Set(year.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_class())
    }

    pub async fn update_class_name_impl(&self, id: i64, name: &str) -> Result<Option<SchoolClass>> {
        let Some(existing) = Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询班级失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新班级失败: {e}")))?;

        Ok(Some(result.into_class()))
    }

    /// 以新的成员列表整体替换班级成员
    pub async fn replace_class_members_impl(
        &self,
        class_id: i64,
        student_ids: &[i64],
        teacher_ids: &[i64],
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        ClassUsers::delete_many()
            .filter(class_users::Column::ClassId.eq(class_id))
            .exec(&txn)
            .await?;

        let members = student_ids
            .iter()
            .map(|id| (*id, ClassMemberRole::Student))
            .chain(teacher_ids.iter().map(|id| (*id, ClassMemberRole::Teacher)))
            .map(|(user_id, role)| ClassUserActiveModel {
                class_id: Set(class_id),
                user_id: Set(user_id),
                role: Set(role.as_str().to_string()),
                created_at: Set(now),
                ..Default::default()
            })
            .collect::<Vec<_>>();

        if !members.is_empty() {
            ClassUsers::insert_many(members).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};

    #[tokio::test]
    async fn test_replace_class_members() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let anna = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let ben = seed_user(&storage, school_id, "ben@gym.de", UserRole::Student).await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;

        let class = storage
            .create_class_impl(school_id, "5a", Some("cn=5a,ou=gym"), Some("2025/26"))
            .await
            .unwrap();
        assert_eq!(class.name_format, "static");

        storage
            .replace_class_members_impl(class.id, &[anna.id], &[teacher.id])
            .await
            .unwrap();
        storage
            .replace_class_members_impl(class.id, &[ben.id], &[])
            .await
            .unwrap();

        let names = storage
            .get_class_names_by_user_ids_impl(&[anna.id, ben.id, teacher.id])
            .await
            .unwrap();
        assert!(!names.contains_key(&anna.id));
        assert!(!names.contains_key(&teacher.id));
        assert_eq!(names.get(&ben.id), Some(&vec!["5a".to_string()]));

        let found = storage
            .get_class_by_ldap_dn_impl(school_id, "2025/26", "cn=5a,ou=gym")
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(class.id));
    }

    #[tokio::test]
    async fn test_course_student_count_ignores_teachers() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let anna = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let ben = seed_user(&storage, school_id, "ben@gym.de", UserRole::Student).await;

        let course = storage
            .create_course_impl(school_id, "Mathe", None)
            .await
            .unwrap();
        storage
            .add_course_member_impl(course.id, teacher.id, CourseRole::Teacher)
            .await
            .unwrap();
        for student in [&anna, &ben] {
            storage
                .add_course_member_impl(course.id, student.id, CourseRole::Student)
                .await
                .unwrap();
        }

        let counts = storage
            .count_course_students_impl(&[course.id])
            .await
            .unwrap();
        assert_eq!(counts.get(&course.id), Some(&2));

        let memberships = storage.get_course_memberships_impl(teacher.id).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].role, CourseRole::Teacher);
    }
}
