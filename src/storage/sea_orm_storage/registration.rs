use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{consents, registration_pins};
use crate::errors::{Result, SchulCloudError};
use crate::models::registration::{
    requests::RegistrationRecord,
    responses::{RegistrationPin, RegistrationResponse},
};
use crate::utils::validate::normalize_email;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait, TryIntoModel,
};

impl SeaOrmStorage {
    pub async fn create_registration_pin_impl(
        &self,
        email: &str,
        pin: &str,
    ) -> Result<RegistrationPin> {
        let model = RegistrationPinActiveModel {
            email: Set(normalize_email(email)),
            pin: Set(pin.to_string()),
            verified: Set(false),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("创建注册 PIN 失败: {e}")))?;

        Ok(result.into_registration_pin())
    }

    /// 某邮箱最近一次生成的 PIN
    pub async fn get_latest_registration_pin_impl(
        &self,
        email: &str,
    ) -> Result<Option<RegistrationPin>> {
        let result = RegistrationPins::find()
            .filter(registration_pins::Column::Email.eq(normalize_email(email)))
            .order_by_desc(registration_pins::Column::CreatedAt)
            .order_by_desc(registration_pins::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| SchulCloudError::database_operation(format!("查询注册 PIN 失败: {e}")))?;

        Ok(result.map(|m| m.into_registration_pin()))
    }

    /// 完成注册：更新用户、写入家长、账户与同意书并核销 PIN
    ///
    /// 任一步失败时事务回滚，用户记录保持原样。
    pub async fn complete_registration_impl(
        &self,
        record: RegistrationRecord,
    ) -> Result<RegistrationResponse> {
        let now = chrono::Utc::now().timestamp();
        let email = normalize_email(&record.email);
        let txn = self.db.begin().await?;

        let Some(existing) = Users::find_by_id(record.user_id).one(&txn).await? else {
            return Err(SchulCloudError::not_found(format!(
                "User {} not found",
                record.user_id
            )));
        };

        let mut user = existing.into_active_model();
        user.first_name = Set(record.first_name);
        user.last_name = Set(record.last_name);
        user.email = Set(email.clone());
        if let Some(birthday) = record.birthday {
            user.birthday = Set(Some(birthday.timestamp()));
        }
        user.import_hash = Set(None);
        user.updated_at = Set(now);
        let user = user.update(&txn).await?;

        let mut parents = Vec::new();
        if let Some(parent) = record.parent.as_ref() {
            let model = UserParentActiveModel {
                user_id: Set(user.id),
                first_name: Set(parent.first_name.clone()),
                last_name: Set(parent.last_name.clone()),
                email: Set(normalize_email(&parent.email)),
                created_at: Set(now),
                ..Default::default()
            };
            parents.push(model.insert(&txn).await?.into_user_parent());
        }

        let account = AccountActiveModel {
            user_id: Set(user.id),
            username: Set(email),
            password_hash: Set(Some(record.password_hash)),
            system_id: Set(None),
            activated: Set(true),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 有家长时由家长代为同意
        let has_parent = record.parent.is_some();
        let existing_consent = Consents::find()
            .filter(consents::Column::UserId.eq(user.id))
            .one(&txn)
            .await?;
        let mut consent = match existing_consent {
            Some(consent) => consent.into_active_model(),
            None => ConsentActiveModel {
                user_id: Set(user.id),
                created_at: Set(now),
                ..Default::default()
            },
        };
        consent.user_privacy_consent = Set(record.user_privacy_consent);
        consent.user_terms_consent = Set(record.user_terms_consent);
        consent.parent_privacy_consent = Set(has_parent.then_some(record.user_privacy_consent));
        consent.parent_terms_consent = Set(has_parent.then_some(record.user_terms_consent));
        consent.updated_at = Set(now);
        let consent = consent.save(&txn).await?;
        let consent = consent.try_into_model()?;

        let Some(pin) = RegistrationPins::find_by_id(record.pin_id).one(&txn).await? else {
            return Err(SchulCloudError::not_found("Registration pin not found"));
        };
        let mut pin = pin.into_active_model();
        pin.verified = Set(true);
        pin.update(&txn).await?;

        txn.commit().await?;

        Ok(RegistrationResponse {
            user: user.into_user(),
            account: account.into_account(),
            consent: consent.into_consent(),
            parents,
        })
    }
}
