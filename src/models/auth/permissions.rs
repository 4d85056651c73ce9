use serde::{Deserialize, Serialize};

/// 权限标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    NewsView,
    NewsCreate,
    NewsEdit,
    StudentList,
    StudentCreate,
    StudentEdit,
    StudentDelete,
    TeacherList,
    TeacherCreate,
    TeacherEdit,
    TeacherDelete,
    TaskDashboardView,
    TaskDashboardTeacherView,
    FileCreate,
    SyncStart,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::NewsView => "NEWS_VIEW",
            Permission::NewsCreate => "NEWS_CREATE",
            Permission::NewsEdit => "NEWS_EDIT",
            Permission::StudentList => "STUDENT_LIST",
            Permission::StudentCreate => "STUDENT_CREATE",
            Permission::StudentEdit => "STUDENT_EDIT",
            Permission::StudentDelete => "STUDENT_DELETE",
            Permission::TeacherList => "TEACHER_LIST",
            Permission::TeacherCreate => "TEACHER_CREATE",
            Permission::TeacherEdit => "TEACHER_EDIT",
            Permission::TeacherDelete => "TEACHER_DELETE",
            Permission::TaskDashboardView => "TASK_DASHBOARD_VIEW",
            Permission::TaskDashboardTeacherView => "TASK_DASHBOARD_TEACHER_VIEW",
            Permission::FileCreate => "FILE_CREATE",
            Permission::SyncStart => "SYNC_START",
        }
    }

    pub fn is_news(&self) -> bool {
        self.as_str().contains("NEWS")
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
