use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 文件表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::Name).string().not_null())
                    .col(ColumnDef::new(Files::Size).big_integer().not_null())
                    .col(ColumnDef::new(Files::FileType).string().not_null())
                    .col(ColumnDef::new(Files::StorageFileName).string().null())
                    .col(
                        ColumnDef::new(Files::IsDirectory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Files::ParentId).big_integer().null())
                    .col(ColumnDef::new(Files::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Files::RefOwnerModel).string().not_null())
                    .col(ColumnDef::new(Files::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Files::LockId).string().null())
                    .col(
                        ColumnDef::new(Files::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Files::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Files::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ==================== 文件权限表 ====================
        manager
            .create_table(
                Table::create()
                    .table(FilePermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FilePermissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FilePermissions::FileId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FilePermissions::RefId).string().not_null())
                    .col(
                        ColumnDef::new(FilePermissions::RefPermModel)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FilePermissions::CanRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FilePermissions::CanWrite)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FilePermissions::CanCreate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FilePermissions::CanDelete)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FilePermissions::Table, FilePermissions::FileId)
                            .to(Files::Table, Files::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_owner")
                    .table(Files::Table)
                    .col(Files::RefOwnerModel)
                    .col(Files::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_file_permissions_file_id")
                    .table(FilePermissions::Table)
                    .col(FilePermissions::FileId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FilePermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Files {
    #[sea_orm(iden = "files")]
    Table,
    Id,
    Name,
    Size,
    FileType,
    StorageFileName,
    IsDirectory,
    ParentId,
    OwnerId,
    RefOwnerModel,
    CreatorId,
    LockId,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FilePermissions {
    #[sea_orm(iden = "file_permissions")]
    Table,
    Id,
    FileId,
    RefId,
    RefPermModel,
    CanRead,
    CanWrite,
    CanCreate,
    CanDelete,
}
