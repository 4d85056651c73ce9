use crate::cache::{
    ObjectCache,
    register::{get_object_cache_plugin, registered_object_cache_plugins},
};
use crate::config::AppConfig;
use crate::models::schools::entities::CreateSchoolRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{CreateAccountRequest, CreateUserRequest};
use crate::storage::Storage;
use crate::sync::{SyncMessageProcessor, SyncQueue, create_sync_queue, spawn_sync_consumer};
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_token;
use crate::utils::school_year::current_school_year;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SUPERHERO_EMAIL: &str = "superhero@schul-cloud.local";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub sync_queue: Arc<dyn SyncQueue>,
}

async fn try_cache_backend(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name)?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} cache: {}", name, e);
            None
        }
    }
}

/// 创建缓存实例，配置的后端不可用时回退到 moka
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(cache) = try_cache_backend(cache_type).await {
        return Ok(cache);
    }

    if cache_type != "moka" {
        warn!("Falling back to memory cache");
        if let Some(cache) = try_cache_backend("moka").await {
            return Ok(cache);
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 空库时创建平台超级管理员及其学校
async fn seed_superhero(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!("Database already has {} user(s), skipping superhero seed", count);
            return;
        }
        Ok(_) => info!("No users found in database, creating superhero account..."),
        Err(e) => {
            warn!("Failed to count users: {}, skipping superhero seed", e);
            return;
        }
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_token(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated superhero password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash superhero password: {}, skipping seed", e);
            return;
        }
    };

    let school = match storage
        .create_school(CreateSchoolRequest {
            name: "Schul-Cloud".to_string(),
            current_year: Some(current_school_year()),
            ..Default::default()
        })
        .await
    {
        Ok(school) => school,
        Err(e) => {
            warn!("Failed to create seed school: {}", e);
            return;
        }
    };

    let user = match storage
        .create_user(CreateUserRequest {
            school_id: school.id,
            first_name: "Super".to_string(),
            last_name: "Hero".to_string(),
            email: SUPERHERO_EMAIL.to_string(),
            role: UserRole::Superhero,
            birthday: None,
            import_hash: None,
            ldap_dn: None,
            ldap_id: None,
        })
        .await
    {
        Ok(user) => user,
        Err(e) => {
            warn!("Failed to create superhero user: {}", e);
            return;
        }
    };

    match storage
        .create_account(CreateAccountRequest {
            user_id: user.id,
            username: SUPERHERO_EMAIL.to_string(),
            password_hash: Some(password_hash),
            system_id: None,
            activated: true,
        })
        .await
    {
        Ok(_) => info!(
            "Superhero account created successfully (ID: {}, username: {})",
            user.id, SUPERHERO_EMAIL
        ),
        Err(e) => warn!("Failed to create superhero account: {}", e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和同步队列
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    debug!(
        "Registered cache backends: {:?}",
        registered_object_cache_plugins()
    );

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_superhero(&storage).await;

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    let sync_queue = create_sync_queue();
    spawn_sync_consumer(
        sync_queue.clone(),
        SyncMessageProcessor::new(storage.clone()),
    );
    warn!("Sync queue consumer started");

    StartupContext {
        storage,
        cache,
        sync_queue,
    }
}
