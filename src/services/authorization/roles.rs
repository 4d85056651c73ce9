//! 角色权限表

use crate::models::auth::permissions::Permission::{self, *};
use crate::models::groups::entities::{CourseRole, TeamRole};
use crate::models::users::entities::UserRole;

const STUDENT: &[Permission] = &[NewsView, TaskDashboardView, FileCreate];

const TEACHER: &[Permission] = &[
    NewsView,
    NewsCreate,
    NewsEdit,
    StudentList,
    StudentCreate,
    StudentEdit,
    TeacherList,
    TaskDashboardTeacherView,
    FileCreate,
];

const ADMINISTRATOR: &[Permission] = &[
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
    FileCreate,
];

const SUPERHERO: &[Permission] = &[
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
];

const EXPERT: &[Permission] = &[NewsView, FileCreate];
const PARENT: &[Permission] = &[NewsView];
const DEMO_STUDENT: &[Permission] = &[NewsView, TaskDashboardView];
const DEMO_TEACHER: &[Permission] = &[NewsView, StudentList, TaskDashboardTeacherView];

const GROUP_EDITOR: &[Permission] = &[NewsView, NewsCreate, NewsEdit];
const GROUP_READER: &[Permission] = &[NewsView];

pub fn role_permissions(role: UserRole) -> &'static [Permission] {
    match role {
        UserRole::Student => STUDENT,
        UserRole::Teacher => TEACHER,
        UserRole::Administrator => ADMINISTRATOR,
        UserRole::Superhero => SUPERHERO,
        UserRole::Expert => EXPERT,
        UserRole::Parent => PARENT,
        UserRole::DemoStudent => DEMO_STUDENT,
        UserRole::DemoTeacher => DEMO_TEACHER,
    }
}

pub fn course_role_permissions(role: CourseRole) -> &'static [Permission] {
    match role {
        CourseRole::Teacher | CourseRole::SubstituteTeacher => GROUP_EDITOR,
        CourseRole::Student => GROUP_READER,
    }
}

pub fn team_role_permissions(role: TeamRole) -> &'static [Permission] {
    match role {
        TeamRole::Owner | TeamRole::Administrator | TeamRole::Leader => GROUP_EDITOR,
        TeamRole::Expert | TeamRole::Member => GROUP_READER,
    }
}

pub fn has_all(granted: &[Permission], required: &[Permission]) -> bool {
    required.iter().all(|p| granted.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superhero_holds_every_permission() {
        for role in [
            UserRole::Student,
            UserRole::Teacher,
            UserRole::Administrator,
            UserRole::Expert,
            UserRole::Parent,
            UserRole::DemoStudent,
            UserRole::DemoTeacher,
        ] {
            assert!(has_all(role_permissions(UserRole::Superhero), role_permissions(role)));
        }
    }

    #[test]
    fn test_only_editors_create_news_in_groups() {
        assert!(course_role_permissions(CourseRole::SubstituteTeacher).contains(&NewsCreate));
        assert!(!course_role_permissions(CourseRole::Student).contains(&NewsCreate));
        assert!(team_role_permissions(TeamRole::Leader).contains(&NewsEdit));
        assert!(!team_role_permissions(TeamRole::Expert).contains(&NewsEdit));
    }

    #[test]
    fn test_dashboard_views_are_split_by_role() {
        assert!(role_permissions(UserRole::Student).contains(&TaskDashboardView));
        assert!(!role_permissions(UserRole::Student).contains(&TaskDashboardTeacherView));
        assert!(role_permissions(UserRole::Teacher).contains(&TaskDashboardTeacherView));
    }
}
