use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== LDAP 系统表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Systems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Systems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Systems::Alias).string().not_null())
                    .col(ColumnDef::new(Systems::LdapProvider).string().not_null())
                    .col(ColumnDef::new(Systems::LdapUrl).string().not_null())
                    .col(ColumnDef::new(Systems::LdapRootPath).string().not_null())
                    .col(ColumnDef::new(Systems::LdapSearchUser).string().not_null())
                    .col(
                        ColumnDef::new(Systems::LdapSearchPassword)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Systems::ImportUrl).string().null())
                    .col(ColumnDef::new(Systems::ImportUser).string().null())
                    .col(ColumnDef::new(Systems::ImportPassword).string().null())
                    .col(
                        ColumnDef::new(Systems::LdapActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Systems::LastSyncAttempt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Systems::LastSuccessfulFullSync)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Systems::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Systems::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ==================== 学校表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schools::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schools::Name).string().not_null())
                    .col(
                        ColumnDef::new(Schools::LdapSchoolIdentifier)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Schools::SystemId).big_integer().null())
                    .col(ColumnDef::new(Schools::CurrentYear).string().null())
                    .col(ColumnDef::new(Schools::FederalState).string().null())
                    .col(
                        ColumnDef::new(Schools::IsExternal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Schools::InMaintenance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Schools::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Schools::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Schools::Table, Schools::SystemId)
                            .to(Systems::Table, Systems::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 用户表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Birthday).big_integer().null())
                    .col(ColumnDef::new(Users::ImportHash).string().null())
                    .col(ColumnDef::new(Users::LdapDn).string().null())
                    .col(ColumnDef::new(Users::LdapId).string().null())
                    .col(ColumnDef::new(Users::DeletedAt).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Users::Table, Users::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 账户表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::PasswordHash).string().null())
                    .col(ColumnDef::new(Accounts::SystemId).big_integer().null())
                    .col(
                        ColumnDef::new(Accounts::Activated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Accounts::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 家长表 ====================
        manager
            .create_table(
                Table::create()
                    .table(UserParents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserParents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserParents::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserParents::FirstName).string().not_null())
                    .col(ColumnDef::new(UserParents::LastName).string().not_null())
                    .col(ColumnDef::new(UserParents::Email).string().not_null())
                    .col(
                        ColumnDef::new(UserParents::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserParents::Table, UserParents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 同意书表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Consents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Consents::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Consents::UserPrivacyConsent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Consents::UserTermsConsent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Consents::ParentPrivacyConsent)
                            .boolean()
                            .null(),
                    )
                    .col(ColumnDef::new(Consents::ParentTermsConsent).boolean().null())
                    .col(ColumnDef::new(Consents::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Consents::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Consents::Table, Consents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 注册验证码表 ====================
        manager
            .create_table(
                Table::create()
                    .table(RegistrationPins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RegistrationPins::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RegistrationPins::Email).string().not_null())
                    .col(ColumnDef::new(RegistrationPins::Pin).string().not_null())
                    .col(
                        ColumnDef::new(RegistrationPins::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RegistrationPins::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 回收站表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Trashbins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trashbins::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trashbins::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Trashbins::Data).text().not_null())
                    .col(
                        ColumnDef::new(Trashbins::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_school_id")
                    .table(Users::Table)
                    .col(Users::SchoolId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_ldap_id")
                    .table(Users::Table)
                    .col(Users::LdapId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_import_hash")
                    .table(Users::Table)
                    .col(Users::ImportHash)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_registration_pins_email")
                    .table(RegistrationPins::Table)
                    .col(RegistrationPins::Email)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Trashbins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RegistrationPins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Consents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserParents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Systems::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Systems {
    #[sea_orm(iden = "systems")]
    Table,
    Id,
    Alias,
    LdapProvider,
    LdapUrl,
    LdapRootPath,
    LdapSearchUser,
    LdapSearchPassword,
    ImportUrl,
    ImportUser,
    ImportPassword,
    LdapActive,
    LastSyncAttempt,
    LastSuccessfulFullSync,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schools {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
    Name,
    LdapSchoolIdentifier,
    SystemId,
    CurrentYear,
    FederalState,
    IsExternal,
    InMaintenance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    SchoolId,
    FirstName,
    LastName,
    Email,
    Role,
    Birthday,
    ImportHash,
    LdapDn,
    LdapId,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    UserId,
    Username,
    PasswordHash,
    SystemId,
    Activated,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserParents {
    #[sea_orm(iden = "user_parents")]
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Consents {
    #[sea_orm(iden = "consents")]
    Table,
    Id,
    UserId,
    UserPrivacyConsent,
    UserTermsConsent,
    ParentPrivacyConsent,
    ParentTermsConsent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RegistrationPins {
    #[sea_orm(iden = "registration_pins")]
    Table,
    Id,
    Email,
    Pin,
    Verified,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Trashbins {
    #[sea_orm(iden = "trashbins")]
    Table,
    Id,
    UserId,
    Data,
    CreatedAt,
}
