use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 新闻可以挂载的目标类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NewsTargetModel {
    School,
    Course,
    Team,
}

impl NewsTargetModel {
    pub const ALL: [NewsTargetModel; 3] = [
        NewsTargetModel::School,
        NewsTargetModel::Course,
        NewsTargetModel::Team,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NewsTargetModel::School => "school",
            NewsTargetModel::Course => "course",
            NewsTargetModel::Team => "team",
        }
    }
}

impl std::str::FromStr for NewsTargetModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "school" => Ok(NewsTargetModel::School),
            "course" => Ok(NewsTargetModel::Course),
            "team" => Ok(NewsTargetModel::Team),
            _ => Err(format!("Invalid news target model: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsTarget {
    pub model: NewsTargetModel,
    pub id: i64,
}

// 新闻
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub school_id: i64,
    pub creator_id: i64,
    pub updater_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub display_at: DateTime<Utc>,
    pub target: NewsTarget,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl News {
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.display_at <= now
    }
}
