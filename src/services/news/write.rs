use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::auth::permissions::Permission;
use crate::models::news::{
    entities::NewsTarget,
    requests::{CreateNewsRecord, CreateNewsRequest, UpdateNewsRecord, UpdateNewsRequest},
    responses::{NewsDeleteResponse, NewsResponse},
};
use crate::models::users::entities::User;
use crate::services::authorization::AuthorizationService;
use crate::storage::Storage;

use super::find::news_permissions;

pub const INVALID_TARGET: &str = "Invalid news target";

pub async fn create(
    storage: Arc<dyn Storage>,
    user: &User,
    params: CreateNewsRequest,
) -> Result<NewsResponse> {
    let (Some(model), Some(id)) = (params.target_model, params.target_id) else {
        return Err(SchulCloudError::conflict(INVALID_TARGET));
    };
    let target = NewsTarget { model, id };

    let authorization = AuthorizationService::new(storage.clone());
    authorization
        .check_entity_permissions(user, model, id, &[Permission::NewsCreate])
        .await?;

    let news = storage
        .create_news(CreateNewsRecord {
            school_id: user.school_id,
            creator_id: user.id,
            title: params.title,
            content: params.content,
            display_at: params.display_at.unwrap_or_else(chrono::Utc::now),
            target,
        })
        .await?;

    tracing::info!("User {} created news {} on {:?}", user.id, news.id, target);
    let permissions = news_permissions(&authorization, user, target).await?;
    Ok(NewsResponse { news, permissions })
}

pub async fn update(
    storage: Arc<dyn Storage>,
    id: i64,
    user: &User,
    params: UpdateNewsRequest,
) -> Result<NewsResponse> {
    let authorization = AuthorizationService::new(storage.clone());
    let target = editable_target(&storage, &authorization, id, user).await?;

    let news = storage
        .update_news(
            id,
            UpdateNewsRecord {
                updater_id: user.id,
                title: params.title,
                content: params.content,
                display_at: params.display_at,
            },
        )
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("News {id} not found")))?;

    let permissions = news_permissions(&authorization, user, target).await?;
    Ok(NewsResponse { news, permissions })
}

pub async fn remove(storage: Arc<dyn Storage>, id: i64, user: &User) -> Result<NewsDeleteResponse> {
    let authorization = AuthorizationService::new(storage.clone());
    editable_target(&storage, &authorization, id, user).await?;

    if !storage.delete_news(id).await? {
        return Err(SchulCloudError::not_found(format!("News {id} not found")));
    }
    tracing::info!("User {} deleted news {}", user.id, id);
    Ok(NewsDeleteResponse { id })
}

/// 新闻存在且用户在其目标上有 NEWS_EDIT
async fn editable_target(
    storage: &Arc<dyn Storage>,
    authorization: &AuthorizationService,
    id: i64,
    user: &User,
) -> Result<NewsTarget> {
    let news = storage
        .get_news_by_id(id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("News {id} not found")))?;
    authorization
        .check_entity_permissions(user, news.target.model, news.target.id, &[Permission::NewsEdit])
        .await?;
    Ok(news.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::news::entities::NewsTargetModel;
    use crate::models::news::requests::NewsListParams;
    use crate::models::users::entities::UserRole;
    use crate::services::news::find;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};
    use chrono::{Duration, Utc};

    async fn setup() -> (Arc<dyn Storage>, User, User) {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let teacher = seed_user(&storage, school_id, "lehrer@gym.de", UserRole::Teacher).await;
        let student = seed_user(&storage, school_id, "anna@gym.de", UserRole::Student).await;
        (Arc::new(storage), teacher, student)
    }

    fn school_news(school_id: i64, display_at: Option<chrono::DateTime<Utc>>) -> CreateNewsRequest {
        CreateNewsRequest {
            title: "Sportfest".to_string(),
            content: "Am Freitag".to_string(),
            display_at,
            target_model: Some(NewsTargetModel::School),
            target_id: Some(school_id),
        }
    }

    #[tokio::test]
    async fn test_create_requires_target() {
        let (storage, teacher, _) = setup().await;
        let mut params = school_news(teacher.school_id, None);
        params.target_id = None;
        let err = create(storage, &teacher, params).await.unwrap_err();
        assert_eq!(err.message(), INVALID_TARGET);
        assert_eq!(err.status().as_u16(), 409);
    }

    #[tokio::test]
    async fn test_superhero_cannot_create_news_on_missing_school() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let hero = seed_user(&storage, school_id, "hero@gym.de", UserRole::Superhero).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);

        let err = create(storage.clone(), &hero, school_news(school_id + 1000, None))
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);

        let created = create(storage, &hero, school_news(school_id, None))
            .await
            .unwrap();
        assert_eq!(created.news.school_id, school_id);
    }

    #[tokio::test]
    async fn test_student_cannot_create_school_news() {
        let (storage, _, student) = setup().await;
        let err = create(storage, &student, school_news(student.school_id, None))
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);
    }

    #[tokio::test]
    async fn test_unpublished_news_visible_to_editors_only() {
        let (storage, teacher, student) = setup().await;
        let future = Some(Utc::now() + Duration::days(2));
        let created = create(storage.clone(), &teacher, school_news(teacher.school_id, future))
            .await
            .unwrap();
        assert!(created.permissions.contains(&Permission::NewsEdit));

        let err = find::find_one_by_id_for_user(storage.clone(), created.news.id, &student)
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 403);

        let page = find::find_all_for_user(
            storage.clone(),
            &student,
            NewsListParams::default(),
        )
        .await
        .unwrap();
        assert!(page.items.is_empty());

        let page = find::find_all_for_user(
            storage.clone(),
            &teacher,
            NewsListParams {
                unpublished: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.items.len(), 1);

        let page = find::find_all_for_user(
            storage,
            &student,
            NewsListParams {
                unpublished: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove_require_edit() {
        let (storage, teacher, student) = setup().await;
        let created = create(storage.clone(), &teacher, school_news(teacher.school_id, None))
            .await
            .unwrap();

        let denied = update(
            storage.clone(),
            created.news.id,
            &student,
            UpdateNewsRequest {
                title: Some("x".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(denied.status().as_u16(), 403);

        let updated = update(
            storage.clone(),
            created.news.id,
            &teacher,
            UpdateNewsRequest {
                title: Some("Sportfest verschoben".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.news.updater_id, Some(teacher.id));

        let removed = remove(storage.clone(), created.news.id, &teacher).await.unwrap();
        assert_eq!(removed.id, created.news.id);
        let missing = find::find_one_by_id_for_user(storage, created.news.id, &teacher)
            .await
            .unwrap_err();
        assert_eq!(missing.status().as_u16(), 404);
    }
}
