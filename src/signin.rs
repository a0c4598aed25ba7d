//! The check-in call itself, and the outcome model fed to the result sink.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::auth::Session;
use crate::error::{CheckinError, Result};
use crate::gateway::{Endpoint, GatewayResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninStatus {
    Success,
    AlreadySigned,
    Failure,
}

/// One record per account per batch, never mutated after creation.
#[derive(Debug, Clone)]
pub struct SigninOutcome {
    pub status: SigninStatus,
    pub message: String,
    pub wealth_gained: Option<i64>,
    pub consecutive_days: Option<u32>,
    pub last_signin_time: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl SigninOutcome {
    pub fn failure(err: &CheckinError) -> Self {
        Self {
            status: SigninStatus::Failure,
            message: err.to_string(),
            wealth_gained: None,
            consecutive_days: None,
            last_signin_time: None,
            error: Some(err.to_string()),
        }
    }
}

/// Sign-info payload as served by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInfo {
    last_sign_in_time: Option<String>,
    last_reward: Option<i64>,
    last_sign_in_count: Option<u32>,
}

/// Performs the daily check-in with an authenticated session.
///
/// POST performs the action; the follow-up GET reads reward, streak and last
/// signin time. An "already signed today" rejection is a terminal success,
/// a 401 means the session died mid-call and is worth a retry.
pub async fn sign_in(
    client: &Client,
    resolver: &GatewayResolver,
    session: &Session,
) -> Result<SigninOutcome> {
    let url = resolver.resolve(Endpoint::Signin)?;

    let res = client
        .post(&url)
        .bearer_auth(session.bearer())
        .header(reqwest::header::CONTENT_LENGTH, "0")
        .send()
        .await?;
    let status = res.status();
    let body = res.text().await?;
    debug!(%status, "signin endpoint answered");

    let newly_signed = if status.is_success() {
        true
    } else if status == StatusCode::UNAUTHORIZED {
        return Err(CheckinError::Transient(
            "session no longer valid (401 from signin endpoint)".into(),
        ));
    } else if status.is_client_error() {
        if is_already_signed(&body) {
            false
        } else {
            return Err(CheckinError::Signin(format!(
                "signin rejected ({status}): {body}"
            )));
        }
    } else {
        return Err(CheckinError::Transient(format!("signin returned {status}")));
    };

    let info = sign_info(client, resolver, session).await?;
    Ok(outcome_from(newly_signed, info))
}

async fn sign_info(
    client: &Client,
    resolver: &GatewayResolver,
    session: &Session,
) -> Result<SignInfo> {
    let url = resolver.resolve(Endpoint::Signin)?;
    let res = client.get(&url).bearer_auth(session.bearer()).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(CheckinError::Transient(
            "session no longer valid (401 from sign-info endpoint)".into(),
        ));
    }
    if !status.is_success() {
        return Err(CheckinError::Transient(format!("sign info returned {status}")));
    }
    serde_json::from_str(&body).map_err(|e| {
        CheckinError::ResponseFormat(format!("sign info did not parse ({e}): {body}"))
    })
}

fn outcome_from(newly_signed: bool, info: SignInfo) -> SigninOutcome {
    let last_signin_time = info
        .last_sign_in_time
        .as_deref()
        .and_then(parse_signin_time);
    if newly_signed {
        SigninOutcome {
            status: SigninStatus::Success,
            message: "signed in".into(),
            wealth_gained: info.last_reward,
            consecutive_days: info.last_sign_in_count,
            last_signin_time,
            error: None,
        }
    } else {
        SigninOutcome {
            status: SigninStatus::AlreadySigned,
            message: "already signed in today".into(),
            // 今天已签过，没有新的财富值
            wealth_gained: None,
            consecutive_days: info.last_sign_in_count,
            last_signin_time,
            error: None,
        }
    }
}

fn is_already_signed(body: &str) -> bool {
    body.contains("已经签到") || body.contains("已签到") || body.to_lowercase().contains("already")
}

/// The API mostly emits RFC 3339; older responses come without an offset and
/// are taken as UTC.
fn parse_signin_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}
