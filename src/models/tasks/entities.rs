use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 任务（作业）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub school_id: i64,
    pub course_id: Option<i64>,
    pub teacher_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// 私有任务只对创建者可见
    pub private: bool,
    pub available_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 提交
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub task_id: i64,
    pub school_id: i64,
    pub student_id: i64,
    pub comment: Option<String>,
    pub grade: Option<i32>,
    pub grade_comment: Option<String>,
    /// 小组提交的其他成员
    pub team_member_ids: Vec<i64>,
    pub student_file_ids: Vec<i64>,
    pub grade_file_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// 有分数、评语或批改文件即视为已批改
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
            || self
                .grade_comment
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty())
            || !self.grade_file_ids.is_empty()
    }

    /// 提交者与小组成员
    pub fn student_ids(&self) -> impl Iterator<Item = i64> + '_ {
        std::iter::once(self.student_id).chain(self.team_member_ids.iter().copied())
    }
}

/// 一个任务的提交统计
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSubmissionMetadata {
    pub submitted: i64,
    /// -1 表示未知
    pub max_submissions: i64,
    pub graded: i64,
}

impl TaskSubmissionMetadata {
    pub fn compute(submissions: &[Submission], max_submissions: i64) -> Self {
        let mut submitted = HashSet::new();
        let mut graded = HashSet::new();
        for submission in submissions {
            for student_id in submission.student_ids() {
                submitted.insert(student_id);
                if submission.is_graded() {
                    graded.insert(student_id);
                }
            }
        }
        Self {
            submitted: submitted.len() as i64,
            max_submissions,
            graded: graded.len() as i64,
        }
    }
}

/// 删除用户前记录的任务相关引用
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserTaskReferences {
    pub private_task_ids: Vec<i64>,
    pub public_task_ids: Vec<i64>,
    pub archived_task_ids: Vec<i64>,
    pub group_submission_ids: Vec<i64>,
    pub single_submission_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(student_id: i64, members: Vec<i64>, grade: Option<i32>) -> Submission {
        let now = Utc::now();
        Submission {
            id: student_id,
            task_id: 1,
            school_id: 1,
            student_id,
            comment: None,
            grade,
            grade_comment: None,
            team_member_ids: members,
            student_file_ids: vec![],
            grade_file_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_metadata_counts_distinct_students() {
        let submissions = vec![
            submission(1, vec![2, 3], Some(12)),
            submission(2, vec![], None),
            submission(4, vec![], None),
        ];
        let meta = TaskSubmissionMetadata::compute(&submissions, 10);
        assert_eq!(meta.submitted, 4);
        assert_eq!(meta.graded, 3);
        assert_eq!(meta.max_submissions, 10);
    }

    #[test]
    fn test_grade_comment_or_files_count_as_graded() {
        let mut s = submission(1, vec![], None);
        assert!(!s.is_graded());
        s.grade_comment = Some("   ".into());
        assert!(!s.is_graded());
        s.grade_comment = Some("gut".into());
        assert!(s.is_graded());

        let mut s = submission(2, vec![], None);
        s.grade_file_ids = vec![7];
        assert!(s.is_graded());
    }

    #[test]
    fn test_metadata_without_submissions() {
        let meta = TaskSubmissionMetadata::compute(&[], -1);
        assert_eq!(
            meta,
            TaskSubmissionMetadata {
                submitted: 0,
                max_submissions: -1,
                graded: 0
            }
        );
    }
}
