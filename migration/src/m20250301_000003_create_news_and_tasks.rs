use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 新闻表 ====================
        manager
            .create_table(
                Table::create()
                    .table(News::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(News::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(News::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(News::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(News::UpdaterId).big_integer().null())
                    .col(ColumnDef::new(News::Title).string().not_null())
                    .col(ColumnDef::new(News::Content).text().not_null())
                    .col(ColumnDef::new(News::DisplayAt).big_integer().not_null())
                    .col(ColumnDef::new(News::TargetModel).string().not_null())
                    .col(ColumnDef::new(News::TargetId).big_integer().not_null())
                    .col(ColumnDef::new(News::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(News::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(News::Table, News::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 任务表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::SchoolId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::CourseId).big_integer().null())
                    .col(ColumnDef::new(Tasks::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text().null())
                    .col(
                        ColumnDef::new(Tasks::Private)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tasks::AvailableAt).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::DueAt).big_integer().null())
                    .col(ColumnDef::new(Tasks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tasks::Table, Tasks::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaskArchives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskArchives::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskArchives::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskArchives::UserId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskArchives::Table, TaskArchives::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 提交表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(Submissions::SchoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Submissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::Comment).text().null())
                    .col(ColumnDef::new(Submissions::Grade).integer().null())
                    .col(ColumnDef::new(Submissions::GradeComment).text().null())
                    .col(
                        ColumnDef::new(Submissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubmissionMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionMembers::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionMembers::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SubmissionMembers::Table, SubmissionMembers::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubmissionFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionFiles::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionFiles::FileId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubmissionFiles::Kind).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(SubmissionFiles::Table, SubmissionFiles::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_news_target")
                    .table(News::Table)
                    .col(News::TargetModel)
                    .col(News::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_course_id")
                    .table(Tasks::Table)
                    .col(Tasks::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_teacher_id")
                    .table(Tasks::Table)
                    .col(Tasks::TeacherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_task_id")
                    .table(Submissions::Table)
                    .col(Submissions::TaskId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubmissionFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubmissionMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskArchives::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(News::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Schools {
    #[sea_orm(iden = "schools")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum News {
    #[sea_orm(iden = "news")]
    Table,
    Id,
    SchoolId,
    CreatorId,
    UpdaterId,
    Title,
    Content,
    DisplayAt,
    TargetModel,
    TargetId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    SchoolId,
    CourseId,
    TeacherId,
    Name,
    Description,
    Private,
    AvailableAt,
    DueAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaskArchives {
    #[sea_orm(iden = "task_archives")]
    Table,
    Id,
    TaskId,
    UserId,
}

#[derive(DeriveIden)]
enum Submissions {
    #[sea_orm(iden = "submissions")]
    Table,
    Id,
    TaskId,
    SchoolId,
    StudentId,
    Comment,
    Grade,
    GradeComment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SubmissionMembers {
    #[sea_orm(iden = "submission_members")]
    Table,
    Id,
    SubmissionId,
    UserId,
}

#[derive(DeriveIden)]
enum SubmissionFiles {
    #[sea_orm(iden = "submission_files")]
    Table,
    Id,
    SubmissionId,
    FileId,
    Kind,
}
