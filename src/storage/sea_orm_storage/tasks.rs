use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{submission_files, submission_members, submissions, task_archives, tasks};
use crate::errors::{Result, SchulCloudError};
use crate::models::tasks::{
    entities::{Submission, Task, UserTaskReferences},
    requests::{CreateSubmissionRequest, CreateTaskRequest, OpenTaskQuery},
};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_task_impl(&self, req: CreateTaskRequest) -> Result<Task> {
        let now = chrono::Utc::now().timestamp();

        let model = TaskActiveModel {
            school_id: Set(req.school_id),
            course_id: Set(req.course_id),
            teacher_id: Set(req.teacher_id),
            name: Set(req.name),
            description: Set(req.description),
            private: Set(req.private),
            available_at: Set(req.available_at.timestamp()),
            due_at: Set(req.due_at.map(|d| d.timestamp())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建任务失败: {e}")))?;

        Ok(result.into_task())
    }

    /// 创建提交，成员与附件在同一事务中写入
    pub async fn create_submission_impl(&self, req: CreateSubmissionRequest) -> Result<Submission> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let submission = SubmissionActiveModel {
            task_id: Set(req.task_id),
            school_id: Set(req.school_id),
            student_id: Set(req.student_id),
            comment: Set(req.comment),
            grade: Set(req.grade),
            grade_comment: Set(req.grade_comment),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let members = req
            .team_member_ids
            .iter()
            .map(|user_id| SubmissionMemberActiveModel {
                submission_id: Set(submission.id),
                user_id: Set(*user_id),
                ..Default::default()
            })
            .collect::<Vec<_>>();
        if !members.is_empty() {
            SubmissionMembers::insert_many(members).exec(&txn).await?;
        }

        let files = req
            .student_file_ids
            .iter()
            .map(|id| (*id, submission_files::KIND_STUDENT))
            .chain(
                req.grade_file_ids
                    .iter()
                    .map(|id| (*id, submission_files::KIND_GRADE)),
            )
            .map(|(file_id, kind)| SubmissionFileActiveModel {
                submission_id: Set(submission.id),
                file_id: Set(file_id),
                kind: Set(kind.to_string()),
                ..Default::default()
            })
            .collect::<Vec<_>>();
        if !files.is_empty() {
            SubmissionFiles::insert_many(files).exec(&txn).await?;
        }

        txn.commit().await?;

        Ok(submission.into_submission(
            req.team_member_ids,
            req.student_file_ids,
            req.grade_file_ids,
        ))
    }

    /// 为用户归档任务，重复归档不报错
    pub async fn archive_task_impl(&self, task_id: i64, user_id: i64) -> Result<()> {
        let existing = TaskArchives::find()
            .filter(task_archives::Column::TaskId.eq(task_id))
            .filter(task_archives::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询归档失败: {e}")))?;
        if existing.is_some() {
            return Ok(());
        }

        TaskArchiveActiveModel {
            task_id: Set(task_id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| SchulCloudError::database_operation(format!("归档任务失败: {e}")))?;

        Ok(())
    }

    /// 未结束的任务：课程中的公开任务，以及教师自己创建的任务
    pub async fn find_open_tasks_impl(&self, query: OpenTaskQuery) -> Result<(Vec<Task>, u64)> {
        let mut scope = Condition::any();
        if !query.course_ids.is_empty() {
            scope = scope.add(
                Condition::all()
                    .add(tasks::Column::CourseId.is_in(query.course_ids.clone()))
                    .add(tasks::Column::Private.eq(false)),
            );
        }
        if let Some(teacher_id) = query.teacher_id {
            scope = scope.add(tasks::Column::TeacherId.eq(teacher_id));
        }
        if query.course_ids.is_empty() && query.teacher_id.is_none() {
            return Ok((Vec::new(), 0));
        }

        let archived = Query::select()
            .column(task_archives::Column::TaskId)
            .from(TaskArchives)
            .and_where(task_archives::Column::UserId.eq(query.archived_by))
            .to_owned();

        let mut select = Tasks::find()
            .filter(scope)
            .filter(
                Condition::any()
                    .add(tasks::Column::DueAt.is_null())
                    .add(tasks::Column::DueAt.gte(query.due_after)),
            )
            .filter(tasks::Column::Id.not_in_subquery(archived));

        if let Some(before) = query.available_before {
            select = select.filter(tasks::Column::AvailableAt.lte(before));
        }

        let select = select
            .order_by_asc(tasks::Column::DueAt)
            .order_by_asc(tasks::Column::Id);

        let page = query.page.max(1);
        let size = query.size.max(1);
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询任务总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询任务列表失败: {e}")))?;

        Ok((items.into_iter().map(|m| m.into_task()).collect(), total))
    }

    pub async fn get_submissions_by_task_ids_impl(
        &self,
        task_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Submissions::find()
            .filter(submissions::Column::TaskId.is_in(task_ids.to_vec()))
            .order_by_asc(submissions::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询提交失败: {e}")))?;

        load_submission_details(&self.db, rows).await
    }

    pub async fn get_task_by_id_impl(&self, id: i64) -> Result<Option<Task>> {
        let result = Tasks::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询任务失败: {e}")))?;

        Ok(result.map(|m| m.into_task()))
    }

    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let Some(row) = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询提交失败: {e}")))?
        else {
            return Ok(None);
        };

        Ok(load_submission_details(&self.db, vec![row]).await?.pop())
    }

    /// 删除用户前收集其任务相关引用
    ///
    /// 小组提交指用户作为成员出现的提交，单人提交指用户自己的且没有其他成员的提交。
    pub async fn get_user_task_references_impl(&self, user_id: i64) -> Result<UserTaskReferences> {
        let own_tasks: Vec<(i64, bool)> = Tasks::find()
            .select_only()
            .column(tasks::Column::Id)
            .column(tasks::Column::Private)
            .filter(tasks::Column::TeacherId.eq(user_id))
            .order_by_asc(tasks::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询任务失败: {e}")))?;

        let (private_tasks, public_tasks): (Vec<_>, Vec<_>) =
            own_tasks.into_iter().partition(|(_, private)| *private);

        let archived_task_ids: Vec<i64> = TaskArchives::find()
            .select_only()
            .column(task_archives::Column::TaskId)
            .filter(task_archives::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询归档失败: {e}")))?;

        let group_submission_ids: Vec<i64> = SubmissionMembers::find()
            .select_only()
            .column(submission_members::Column::SubmissionId)
            .filter(submission_members::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询小组提交失败: {e}")))?;

        let with_members = Query::select()
            .column(submission_members::Column::SubmissionId)
            .from(SubmissionMembers)
            .to_owned();
        let single_submission_ids: Vec<i64> = Submissions::find()
            .select_only()
            .column(submissions::Column::Id)
            .filter(submissions::Column::StudentId.eq(user_id))
            .filter(submissions::Column::Id.not_in_subquery(with_members))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(UserTaskReferences {
            private_task_ids: private_tasks.into_iter().map(|(id, _)| id).collect(),
            public_task_ids: public_tasks.into_iter().map(|(id, _)| id).collect(),
            archived_task_ids,
            group_submission_ids,
            single_submission_ids,
        })
    }
}

/// 补全提交的小组成员与附件
async fn load_submission_details<C>(
    conn: &C,
    rows: Vec<submissions::Model>,
) -> Result<Vec<Submission>>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = rows.iter().map(|s| s.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut members: HashMap<i64, Vec<i64>> = HashMap::new();
    for member in SubmissionMembers::find()
        .filter(submission_members::Column::SubmissionId.is_in(ids.clone()))
        .order_by_asc(submission_members::Column::Id)
        .all(conn)
        .await?
    {
        members
            .entry(member.submission_id)
            .or_default()
            .push(member.user_id);
    }

    let mut student_files: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut grade_files: HashMap<i64, Vec<i64>> = HashMap::new();
    for file in SubmissionFiles::find()
        .filter(submission_files::Column::SubmissionId.is_in(ids))
        .order_by_asc(submission_files::Column::Id)
        .all(conn)
        .await?
    {
        let target = if file.kind == submission_files::KIND_GRADE {
            &mut grade_files
        } else {
            &mut student_files
        };
        target.entry(file.submission_id).or_default().push(file.file_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            row.into_submission(
                members.remove(&id).unwrap_or_default(),
                student_files.remove(&id).unwrap_or_default(),
                grade_files.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::groups::entities::CourseRole;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};
    use chrono::{Duration, Utc};

    fn task(school_id: i64, course_id: Option<i64>, teacher_id: i64, name: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            school_id,
            course_id,
            teacher_id,
            name: name.to_string(),
            description: None,
            private: false,
            available_at: Utc::now() - Duration::days(1),
            due_at: None,
        }
    }

    #[tokio::test]
    async fn test_open_tasks_respect_window_archive_and_privacy() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let student = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let course = storage
            .create_course_impl(school_id, "Mathe", None)
            .await
            .unwrap();
        storage
            .add_course_member_impl(course.id, student.id, CourseRole::Student)
            .await
            .unwrap();

        let now = Utc::now();
        let open = storage
            .create_task_impl(CreateTaskRequest {
                due_at: Some(now + Duration::days(3)),
                ..task(school_id, Some(course.id), teacher.id, "offen")
            })
            .await
            .unwrap();
        storage
            .create_task_impl(CreateTaskRequest {
                due_at: Some(now - Duration::weeks(4)),
                ..task(school_id, Some(course.id), teacher.id, "zu alt")
            })
            .await
            .unwrap();
        storage
            .create_task_impl(CreateTaskRequest {
                private: true,
                ..task(school_id, Some(course.id), teacher.id, "privat")
            })
            .await
            .unwrap();
        let archived = storage
            .create_task_impl(task(school_id, Some(course.id), teacher.id, "archiviert"))
            .await
            .unwrap();
        storage
            .archive_task_impl(archived.id, student.id)
            .await
            .unwrap();
        storage
            .archive_task_impl(archived.id, student.id)
            .await
            .unwrap();

        let due_after = (now - Duration::weeks(3)).timestamp();
        let (tasks, total) = storage
            .find_open_tasks_impl(OpenTaskQuery {
                course_ids: vec![course.id],
                teacher_id: None,
                archived_by: student.id,
                due_after,
                available_before: Some(now.timestamp()),
                page: 1,
                size: 10,
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(tasks[0].id, open.id);

        let (tasks, total) = storage
            .find_open_tasks_impl(OpenTaskQuery {
                course_ids: vec![],
                teacher_id: Some(teacher.id),
                archived_by: teacher.id,
                due_after,
                available_before: None,
                page: 1,
                size: 10,
            })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert!(tasks.iter().any(|t| t.private));
    }

    #[tokio::test]
    async fn test_submission_details_are_loaded() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let anna = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        let ben = seed_user(&storage, school_id, "ben@gym.de", UserRole::Student).await;
        let task = storage
            .create_task_impl(task(school_id, None, teacher.id, "Gruppenarbeit"))
            .await
            .unwrap();

        let created = storage
            .create_submission_impl(CreateSubmissionRequest {
                task_id: task.id,
                school_id,
                student_id: anna.id,
                team_member_ids: vec![ben.id],
                student_file_ids: vec![5],
                grade_file_ids: vec![9],
                ..Default::default()
            })
            .await
            .unwrap();

        let loaded = storage
            .get_submission_by_id_impl(created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.team_member_ids, vec![ben.id]);
        assert_eq!(loaded.student_file_ids, vec![5]);
        assert_eq!(loaded.grade_file_ids, vec![9]);
        assert!(loaded.is_graded());

        let refs = storage.get_user_task_references_impl(ben.id).await.unwrap();
        assert_eq!(refs.group_submission_ids, vec![created.id]);
        assert!(refs.single_submission_ids.is_empty());

        let refs = storage.get_user_task_references_impl(anna.id).await.unwrap();
        assert!(refs.group_submission_ids.is_empty());
        assert!(refs.single_submission_ids.is_empty());
    }
}
