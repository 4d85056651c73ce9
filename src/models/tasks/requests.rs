use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::common::PaginationQuery;

// 任务创建（存储层）
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub school_id: i64,
    pub course_id: Option<i64>,
    pub teacher_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub private: bool,
    pub available_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

// 提交创建（存储层）
#[derive(Debug, Clone, Default)]
pub struct CreateSubmissionRequest {
    pub task_id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub comment: Option<String>,
    pub grade: Option<i32>,
    pub grade_comment: Option<String>,
    pub team_member_ids: Vec<i64>,
    pub student_file_ids: Vec<i64>,
    pub grade_file_ids: Vec<i64>,
}

/// 未结束任务查询（存储层）
#[derive(Debug, Clone, Default)]
pub struct OpenTaskQuery {
    pub course_ids: Vec<i64>,
    /// 同时包含该教师创建的任务（含私有任务）
    pub teacher_id: Option<i64>,
    /// 排除该用户归档的任务
    pub archived_by: i64,
    pub due_after: i64,
    /// 非空时只返回已开放的任务
    pub available_before: Option<i64>,
    pub page: u64,
    pub size: u64,
}

// 仪表盘查询参数
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskDashboardParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl TaskDashboardParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::from_options(self.page, self.size)
    }
}
