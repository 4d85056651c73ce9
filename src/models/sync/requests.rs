use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupAction {
    Add,
    Remove,
}

impl GroupAction {
    /// Univention 导入接口路径片段
    pub fn import_method(&self) -> &'static str {
        match self {
            GroupAction::Add => "create",
            GroupAction::Remove => "delete",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// 更新用户全局组请求
#[derive(Debug, Clone, Deserialize)]
pub struct GroupUpdateRequest {
    pub user_id: i64,
    pub action: GroupAction,
    pub groups: Vec<GlobalGroup>,
}
