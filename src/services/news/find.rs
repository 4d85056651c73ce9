use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::PaginatedResponse;
use crate::models::auth::permissions::Permission;
use crate::models::news::{
    entities::{News, NewsTarget, NewsTargetModel},
    requests::{NewsListParams, NewsQuery, NewsTargetFilter},
    responses::NewsResponse,
};
use crate::models::users::entities::User;
use crate::services::authorization::AuthorizationService;
use crate::storage::Storage;

/// 当前用户可见的新闻
///
/// 未发布新闻需要 NEWS_EDIT，已发布新闻需要 NEWS_VIEW。
pub async fn find_all_for_user(
    storage: Arc<dyn Storage>,
    user: &User,
    params: NewsListParams,
) -> Result<PaginatedResponse<NewsResponse>> {
    let authorization = AuthorizationService::new(storage.clone());
    let required = if params.unpublished {
        Permission::NewsEdit
    } else {
        Permission::NewsView
    };

    let targets = match (params.target_model, params.target_id) {
        (Some(model), Some(id)) => {
            authorization
                .check_entity_permissions(user, model, id, &[required])
                .await?;
            vec![NewsTargetFilter {
                model,
                ids: vec![id],
            }]
        }
        (Some(model), None) => vec![NewsTargetFilter {
            model,
            ids: authorization
                .get_permitted_entities(user, model, &[required])
                .await?,
        }],
        (None, _) => {
            let mut targets = Vec::with_capacity(NewsTargetModel::ALL.len());
            for model in NewsTargetModel::ALL {
                targets.push(NewsTargetFilter {
                    model,
                    ids: authorization
                        .get_permitted_entities(user, model, &[required])
                        .await?,
                });
            }
            targets
        }
    };

    let (page, size) = params.pagination().normalized();
    let (items, total) = storage
        .find_news(NewsQuery {
            targets,
            unpublished: params.unpublished,
            now: chrono::Utc::now(),
            page,
            size,
        })
        .await?;

    let items = with_permissions(&authorization, user, items).await?;
    Ok(PaginatedResponse::new(items, page, size, total))
}

pub async fn find_one_by_id_for_user(
    storage: Arc<dyn Storage>,
    id: i64,
    user: &User,
) -> Result<NewsResponse> {
    let news = storage
        .get_news_by_id(id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(format!("News {id} not found")))?;

    let required = if news.is_published(chrono::Utc::now()) {
        Permission::NewsView
    } else {
        Permission::NewsEdit
    };

    let authorization = AuthorizationService::new(storage);
    authorization
        .check_entity_permissions(user, news.target.model, news.target.id, &[required])
        .await?;

    let permissions = news_permissions(&authorization, user, news.target).await?;
    Ok(NewsResponse { news, permissions })
}

/// 用户在新闻目标上的 NEWS 权限
pub(super) async fn news_permissions(
    authorization: &AuthorizationService,
    user: &User,
    target: NewsTarget,
) -> Result<Vec<Permission>> {
    Ok(authorization
        .get_entity_permissions(user, target.model, target.id)
        .await?
        .into_iter()
        .filter(Permission::is_news)
        .collect())
}

async fn with_permissions(
    authorization: &AuthorizationService,
    user: &User,
    items: Vec<News>,
) -> Result<Vec<NewsResponse>> {
    let mut by_target: HashMap<(NewsTargetModel, i64), Vec<Permission>> = HashMap::new();
    let mut responses = Vec::with_capacity(items.len());
    for news in items {
        let key = (news.target.model, news.target.id);
        let permissions = match by_target.get(&key) {
            Some(permissions) => permissions.clone(),
            None => {
                let permissions = news_permissions(authorization, user, news.target).await?;
                by_target.insert(key, permissions.clone());
                permissions
            }
        };
        responses.push(NewsResponse { news, permissions });
    }
    Ok(responses)
}
