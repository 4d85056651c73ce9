use std::time::Duration;

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};
use crate::models::schools::entities::LdapSystem;
use crate::models::sync::requests::{GlobalGroup, GroupAction};

/// 导入接口返回的任务状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportJob {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupUpdateOutcome {
    Success,
    Failed,
    Timeout,
}

impl GroupUpdateOutcome {
    pub fn event(&self) -> &'static str {
        match self {
            GroupUpdateOutcome::Success => "ldap:update_user_groups:success",
            GroupUpdateOutcome::Failed => "ldap:update_user_groups:failed",
            GroupUpdateOutcome::Timeout => "ldap:update_user_groups:timeout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    Done(GroupUpdateOutcome),
    Retry,
}

/// 根据任务状态与剩余重试次数决定是否继续轮询
pub fn poll_decision(status: Option<&str>, retries_left: i64) -> PollDecision {
    let status = status.unwrap_or_default().to_lowercase();
    match status.as_str() {
        "finished" => PollDecision::Done(GroupUpdateOutcome::Success),
        "failure" | "aborted" => PollDecision::Done(GroupUpdateOutcome::Failed),
        _ if retries_left >= 0 => PollDecision::Retry,
        _ => PollDecision::Done(GroupUpdateOutcome::Timeout),
    }
}

/// 组文件内容：`[{"entryUUID": ..., "nbc-global-groups": [...]}]`
pub fn group_file(ldap_id: &str, groups: &[GlobalGroup]) -> Result<Vec<u8>> {
    let body = serde_json::json!([{
        "entryUUID": ldap_id,
        "nbc-global-groups": groups,
    }]);
    Ok(serde_json::to_vec(&body)?)
}

/// 通过 Univention 导入接口增删用户的全局组
#[derive(Clone)]
pub struct UniventionGroupUpdater {
    client: Client,
    initial_delay: Duration,
    max_retries: u32,
}

impl UniventionGroupUpdater {
    pub fn from_config() -> Result<Self> {
        let config = &AppConfig::get().ldap;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.group_update_timeout))
            .build()?;

        Ok(Self {
            client,
            initial_delay: Duration::from_millis(config.response_check_initial_delay),
            max_retries: config.response_check_max_retries,
        })
    }

    fn credentials(system: &LdapSystem) -> Result<(&str, &str, &str)> {
        match (
            system.import_url.as_deref(),
            system.import_user.as_deref(),
            system.import_password.as_deref(),
        ) {
            (Some(url), Some(user), Some(password)) => Ok((url, user, password)),
            _ => Err(SchulCloudError::bad_request(format!(
                "System {} has no import API configured",
                system.id
            ))),
        }
    }

    /// 提交导入任务，随后在后台轮询结果
    pub async fn update_user_groups(
        &self,
        system: &LdapSystem,
        ldap_id: &str,
        action: GroupAction,
        groups: &[GlobalGroup],
    ) -> Result<ImportJob> {
        let (url, user, password) = Self::credentials(system)?;

        let file = Part::bytes(group_file(ldap_id, groups)?)
            .file_name("test.json")
            .mime_str("application/json")?;
        let form = Form::new()
            .part("input_file", file)
            .text(
                "school",
                format!("/v1/schools/{}globalgroups/", action.import_method()),
            )
            .text("user_role", "student")
            .text("dryrun", "false");

        let job = self
            .client
            .post(url)
            .basic_auth(user, Some(password))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<ImportJob>()
            .await?;

        info!(
            "Submitted group {} for {} ({} groups), job status: {:?}",
            action.import_method(),
            ldap_id,
            groups.len(),
            job.status
        );

        let updater = self.clone();
        let (user, password) = (user.to_string(), password.to_string());
        let first = job.clone();
        tokio::spawn(async move {
            let outcome = updater.watch(first, &user, &password).await;
            let event = outcome.event();
            match outcome {
                GroupUpdateOutcome::Success => info!(event, "Group update finished"),
                GroupUpdateOutcome::Failed => error!(event, "Group update failed"),
                GroupUpdateOutcome::Timeout => warn!(event, "Group update timed out"),
            }
        });

        Ok(job)
    }

    async fn watch(&self, mut job: ImportJob, user: &str, password: &str) -> GroupUpdateOutcome {
        let mut delay = self.initial_delay;
        let mut retries_left = i64::from(self.max_retries);

        loop {
            match poll_decision(job.status.as_deref(), retries_left) {
                PollDecision::Done(outcome) => return outcome,
                PollDecision::Retry => {
                    let Some(url) = job.url.clone() else {
                        warn!("Import job has no status url, giving up");
                        return GroupUpdateOutcome::Timeout;
                    };

                    sleep(delay).await;
                    debug!("Checking import job at {} ({} retries left)", url, retries_left);

                    match self.fetch_job(&url, user, password).await {
                        Ok(next) => job = next,
                        Err(e) => {
                            // 与上次状态相同，继续按退避重试
                            warn!("Failed to check import job {}: {}", url, e);
                        }
                    }
                    delay = delay.saturating_mul(4);
                    retries_left -= 1;
                }
            }
        }
    }

    async fn fetch_job(&self, url: &str, user: &str, password: &str) -> Result<ImportJob> {
        Ok(self
            .client
            .get(url)
            .basic_auth(user, Some(password))
            .send()
            .await?
            .error_for_status()?
            .json::<ImportJob>()
            .await?)
    }
}
