//! 新闻实体

use sea_orm::entity::prelude::*;

use super::to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "news")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub school_id: i64,
    pub creator_id: i64,
    pub updater_id: Option<i64>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub display_at: i64,
    pub target_model: String,
    pub target_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_news(self) -> crate::models::news::entities::News {
        use crate::models::news::entities::{News, NewsTarget, NewsTargetModel};

        News {
            id: self.id,
            school_id: self.school_id,
            creator_id: self.creator_id,
            updater_id: self.updater_id,
            title: self.title,
            content: self.content,
            display_at: to_datetime(self.display_at),
            target: NewsTarget {
                model: self
                    .target_model
                    .parse::<NewsTargetModel>()
                    .unwrap_or(NewsTargetModel::School),
                id: self.target_id,
            },
            created_at: to_datetime(self.created_at),
            updated_at: to_datetime(self.updated_at),
        }
    }
}
