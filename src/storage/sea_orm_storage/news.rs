use super::SeaOrmStorage;
use crate::entity::news;
use crate::entity::prelude::*;
use crate::errors::{Result, SchulCloudError};
use crate::models::news::{
    entities,
    requests::{CreateNewsRecord, NewsQuery, UpdateNewsRecord},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_news_impl(&self, record: CreateNewsRecord) -> Result<entities::News> {
        let now = chrono::Utc::now().timestamp();

        let model = NewsActiveModel {
            school_id: Set(record.school_id),
            creator_id: Set(record.creator_id),
            updater_id: Set(None),
            title: Set(record.title),
            content: Set(record.content),
            display_at: Set(record.display_at.timestamp()),
            target_model: Set(record.target.model.as_str().to_string()),
            target_id: Set(record.target.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建新闻失败: {e}")))?;

        Ok(result.into_news())
    }

    pub async fn get_news_by_id_impl(&self, id: i64) -> Result<Option<entities::News>> {
        let result = News::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询新闻失败: {e}")))?;

        Ok(result.map(|m| m.into_news()))
    }

    /// 按目标与发布状态分页查询
    ///
    /// 没有任何可查询目标时直接返回空结果。
    pub async fn find_news_impl(&self, query: NewsQuery) -> Result<(Vec<entities::News>, u64)> {
        let mut targets = Condition::any();
        let mut has_target = false;
        for target in query.targets.iter().filter(|t| !t.ids.is_empty()) {
            has_target = true;
            targets = targets.add(
                Condition::all()
                    .add(news::Column::TargetModel.eq(target.model.as_str()))
                    .add(news::Column::TargetId.is_in(target.ids.clone())),
            );
        }
        if !has_target {
            return Ok((Vec::new(), 0));
        }

        let now = query.now.timestamp();
        let published = if query.unpublished {
            news::Column::DisplayAt.gt(now)
        } else {
            news::Column::DisplayAt.lte(now)
        };

        let select = News::find()
            .filter(targets)
            .filter(published)
            .order_by_desc(news::Column::DisplayAt)
            .order_by_desc(news::Column::Id);

        let page = query.page.max(1);
        let size = query.size.max(1);
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询新闻总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询新闻列表失败: {e}")))?;

        Ok((items.into_iter().map(|m| m.into_news()).collect(), total))
    }

    pub async fn update_news_impl(
        &self,
        id: i64,
        update: UpdateNewsRecord,
    ) -> Result<Option<entities::News>> {
        let Some(existing) = News::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询新闻失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        model.updater_id = Set(Some(update.updater_id));
        model.updated_at = Set(chrono::Utc::now().timestamp());
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(content) = update.content {
            model.content = Set(content);
        }
        if let Some(display_at) = update.display_at {
            model.display_at = Set(display_at.timestamp());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("更新新闻失败: {e}")))?;

        Ok(Some(result.into_news()))
    }

    pub async fn delete_news_impl(&self, id: i64) -> Result<bool> {
        let result = News::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("删除新闻失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::news::entities::{NewsTarget, NewsTargetModel};
    use crate::models::news::requests::NewsTargetFilter;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};
    use chrono::{Duration, Utc};

    fn record(school_id: i64, creator_id: i64, title: &str, offset: Duration) -> CreateNewsRecord {
        CreateNewsRecord {
            school_id,
            creator_id,
            title: title.to_string(),
            content: "Inhalt".to_string(),
            display_at: Utc::now() + offset,
            target: NewsTarget {
                model: NewsTargetModel::School,
                id: school_id,
            },
        }
    }

    fn school_query(school_id: i64, unpublished: bool) -> NewsQuery {
        NewsQuery {
            targets: vec![NewsTargetFilter {
                model: NewsTargetModel::School,
                ids: vec![school_id],
            }],
            unpublished,
            now: Utc::now(),
            page: 1,
            size: 10,
        }
    }

    #[tokio::test]
    async fn test_find_news_splits_published_and_unpublished() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;

        storage
            .create_news_impl(record(school_id, teacher.id, "alt", -Duration::days(2)))
            .await
            .unwrap();
        storage
            .create_news_impl(record(school_id, teacher.id, "neu", -Duration::hours(1)))
            .await
            .unwrap();
        storage
            .create_news_impl(record(school_id, teacher.id, "morgen", Duration::days(1)))
            .await
            .unwrap();

        let (published, total) = storage
            .find_news_impl(school_query(school_id, false))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(published[0].title, "neu");
        assert_eq!(published[1].title, "alt");

        let (unpublished, total) = storage
            .find_news_impl(school_query(school_id, true))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(unpublished[0].title, "morgen");
    }

    #[tokio::test]
    async fn test_find_news_without_targets_is_empty() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let mut query = school_query(1, false);
        query.targets.clear();
        let (items, total) = storage.find_news_impl(query).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_update_news_records_updater() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let news = storage
            .create_news_impl(record(school_id, teacher.id, "alt", Duration::zero()))
            .await
            .unwrap();

        let updated = storage
            .update_news_impl(
                news.id,
                UpdateNewsRecord {
                    updater_id: 42,
                    title: Some("Neu".to_string()),
                    content: None,
                    display_at: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Neu");
        assert_eq!(updated.content, "Inhalt");
        assert_eq!(updated.updater_id, Some(42));

        assert!(storage.delete_news_impl(news.id).await.unwrap());
        assert!(!storage.delete_news_impl(news.id).await.unwrap());
    }
}
