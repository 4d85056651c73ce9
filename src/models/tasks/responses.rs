use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entities::{Task, TaskSubmissionMetadata};

// 仪表盘中的任务
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub course_id: Option<i64>,
    pub course_name: Option<String>,
    pub display_color: Option<String>,
    pub available_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub private: bool,
    pub status: TaskSubmissionMetadata,
}

impl TaskResponse {
    pub fn new(
        task: Task,
        course_name: Option<String>,
        display_color: Option<String>,
        status: TaskSubmissionMetadata,
    ) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            course_id: task.course_id,
            course_name,
            display_color,
            available_date: task.available_at,
            due_date: task.due_at,
            private: task.private,
            status,
        }
    }
}
