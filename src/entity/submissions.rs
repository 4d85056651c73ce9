//! 提交实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub school_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub grade: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub grade_comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id",
        on_delete = "Cascade"
    )]
    Task,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 成员与文件需另行查询后传入
    pub fn into_submission(
        self,
        team_member_ids: Vec<i64>,
        student_file_ids: Vec<i64>,
        grade_file_ids: Vec<i64>,
    ) -> crate::models::tasks::entities::Submission {
        crate::models::tasks::entities::Submission {
            id: self.id,
            task_id: self.task_id,
            school_id: self.school_id,
            student_id: self.student_id,
            comment: self.comment,
            grade: self.grade,
            grade_comment: self.grade_comment,
            team_member_ids,
            student_file_ids,
            grade_file_ids,
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
