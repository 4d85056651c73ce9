//! 预导入模块，方便使用

pub use super::accounts::{
    ActiveModel as AccountActiveModel, Entity as Accounts, Model as AccountModel,
};
pub use super::class_users::{
    ActiveModel as ClassUserActiveModel, Entity as ClassUsers, Model as ClassUserModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::consents::{
    ActiveModel as ConsentActiveModel, Entity as Consents, Model as ConsentModel,
};
pub use super::course_users::{
    ActiveModel as CourseUserActiveModel, Entity as CourseUsers, Model as CourseUserModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::file_permissions::{
    ActiveModel as FilePermissionActiveModel, Entity as FilePermissions,
    Model as FilePermissionModel,
};
pub use super::files::{ActiveModel as FileActiveModel, Entity as Files, Model as FileModel};
pub use super::news::{ActiveModel as NewsActiveModel, Entity as News, Model as NewsModel};
pub use super::registration_pins::{
    ActiveModel as RegistrationPinActiveModel, Entity as RegistrationPins,
    Model as RegistrationPinModel,
};
pub use super::schools::{ActiveModel as SchoolActiveModel, Entity as Schools, Model as SchoolModel};
pub use super::submission_files::{
    ActiveModel as SubmissionFileActiveModel, Entity as SubmissionFiles,
    Model as SubmissionFileModel,
};
pub use super::submission_members::{
    ActiveModel as SubmissionMemberActiveModel, Entity as SubmissionMembers,
    Model as SubmissionMemberModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::systems::{ActiveModel as SystemActiveModel, Entity as Systems, Model as SystemModel};
pub use super::task_archives::{
    ActiveModel as TaskArchiveActiveModel, Entity as TaskArchives, Model as TaskArchiveModel,
};
pub use super::tasks::{ActiveModel as TaskActiveModel, Entity as Tasks, Model as TaskModel};
pub use super::team_users::{
    ActiveModel as TeamUserActiveModel, Entity as TeamUsers, Model as TeamUserModel,
};
pub use super::teams::{ActiveModel as TeamActiveModel, Entity as Teams, Model as TeamModel};
pub use super::trashbins::{
    ActiveModel as TrashbinActiveModel, Entity as Trashbins, Model as TrashbinModel,
};
pub use super::user_parents::{
    ActiveModel as UserParentActiveModel, Entity as UserParents, Model as UserParentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
