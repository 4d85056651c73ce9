use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::errors::Result;
use crate::models::groups::entities::{Course, CourseRole};
use crate::models::tasks::{
    entities::{Submission, Task, TaskSubmissionMetadata},
    requests::OpenTaskQuery,
    responses::TaskResponse,
};
use crate::models::users::entities::User;
use crate::models::{PaginatedResponse, PaginationQuery};
use crate::storage::Storage;

/// 截止日期早于该时长的任务不再列出
const OPEN_TASK_WINDOW_WEEKS: i64 = 3;

fn due_after() -> i64 {
    (Utc::now() - Duration::weeks(OPEN_TASK_WINDOW_WEEKS)).timestamp()
}

pub async fn find_all_open_for_student(
    storage: Arc<dyn Storage>,
    user: &User,
    pagination: &PaginationQuery,
) -> Result<PaginatedResponse<TaskResponse>> {
    let course_ids: Vec<i64> = storage
        .get_course_memberships(user.id)
        .await?
        .into_iter()
        .filter(|m| m.role == CourseRole::Student)
        .map(|m| m.group_id)
        .collect();

    let (page, size) = pagination.normalized();
    let (tasks, total) = storage
        .find_open_tasks(OpenTaskQuery {
            course_ids,
            teacher_id: None,
            archived_by: user.id,
            due_after: due_after(),
            available_before: Some(Utc::now().timestamp()),
            page,
            size,
        })
        .await?;

    let submissions = submissions_by_task(&storage, &tasks).await?;
    let courses = courses_by_id(&storage, &tasks).await?;

    let items = tasks
        .into_iter()
        .map(|task| {
            let own: Vec<Submission> = submissions
                .get(&task.id)
                .into_iter()
                .flatten()
                .filter(|s| s.student_ids().any(|id| id == user.id))
                .cloned()
                .collect();
            let status = TaskSubmissionMetadata::compute(&own, 1);
            with_course(task, &courses, status)
        })
        .collect();

    Ok(PaginatedResponse::new(items, page, size, total))
}

pub async fn find_all_open_by_teacher(
    storage: Arc<dyn Storage>,
    user: &User,
    pagination: &PaginationQuery,
) -> Result<PaginatedResponse<TaskResponse>> {
    let course_ids: Vec<i64> = storage
        .get_course_memberships(user.id)
        .await?
        .into_iter()
        .filter(|m| matches!(m.role, CourseRole::Teacher | CourseRole::SubstituteTeacher))
        .map(|m| m.group_id)
        .collect();

    let (page, size) = pagination.normalized();
    let (tasks, total) = storage
        .find_open_tasks(OpenTaskQuery {
            course_ids,
            teacher_id: Some(user.id),
            archived_by: user.id,
            due_after: due_after(),
            available_before: None,
            page,
            size,
        })
        .await?;

    let submissions = submissions_by_task(&storage, &tasks).await?;
    let courses = courses_by_id(&storage, &tasks).await?;
    let task_course_ids: Vec<i64> = courses.keys().copied().collect();
    let student_counts = storage.count_course_students(&task_course_ids).await?;

    let items = tasks
        .into_iter()
        .map(|task| {
            let max = task
                .course_id
                .map(|id| student_counts.get(&id).copied().unwrap_or(0))
                .unwrap_or(-1);
            let status = TaskSubmissionMetadata::compute(
                submissions.get(&task.id).map(Vec::as_slice).unwrap_or(&[]),
                max,
            );
            with_course(task, &courses, status)
        })
        .collect();

    Ok(PaginatedResponse::new(items, page, size, total))
}

async fn submissions_by_task(
    storage: &Arc<dyn Storage>,
    tasks: &[Task],
) -> Result<HashMap<i64, Vec<Submission>>> {
    let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let mut grouped: HashMap<i64, Vec<Submission>> = HashMap::new();
    for submission in storage.get_submissions_by_task_ids(&task_ids).await? {
        grouped.entry(submission.task_id).or_default().push(submission);
    }
    Ok(grouped)
}

async fn courses_by_id(storage: &Arc<dyn Storage>, tasks: &[Task]) -> Result<HashMap<i64, Course>> {
    let mut ids: Vec<i64> = tasks.iter().filter_map(|t| t.course_id).collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(storage
        .get_courses_by_ids(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect())
}

fn with_course(
    task: Task,
    courses: &HashMap<i64, Course>,
    status: TaskSubmissionMetadata,
) -> TaskResponse {
    let course = task.course_id.and_then(|id| courses.get(&id));
    TaskResponse::new(
        task,
        course.map(|c| c.name.clone()),
        course.and_then(|c| c.color.clone()),
        status,
    )
}
