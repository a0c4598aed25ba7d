//! One pass over all configured accounts.
//!
//! Accounts are processed sequentially, in config order. A failed account is
//! recorded and the batch moves on; nothing short of cancellation stops the
//! pass. Results go to the sink the moment they exist, so an interrupted run
//! still shows partial progress.

use reqwest::Client;
use tracing::{error, info};

use crate::auth;
use crate::config::Account;
use crate::gateway::GatewayResolver;
use crate::retry::RetryPolicy;
use crate::signin::{self, SigninOutcome, SigninStatus};

#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub username: String,
    pub outcome: SigninOutcome,
}

/// Where per-account results land. Passed in explicitly so tests can capture
/// records instead of grepping log output.
pub trait ResultSink {
    fn record(&self, record: &ResultRecord);
}

/// Production sink: one tracing line per account.
pub struct LogSink;

impl ResultSink for LogSink {
    fn record(&self, r: &ResultRecord) {
        match r.outcome.status {
            SigninStatus::Success => info!(
                user = %r.username,
                wealth = ?r.outcome.wealth_gained,
                streak = ?r.outcome.consecutive_days,
                "签到成功"
            ),
            SigninStatus::AlreadySigned => info!(
                user = %r.username,
                streak = ?r.outcome.consecutive_days,
                last = ?r.outcome.last_signin_time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                "今天已经签到过"
            ),
            SigninStatus::Failure => error!(
                user = %r.username,
                error = ?r.outcome.error,
                "签到失败"
            ),
        }
    }
}

pub struct BatchRunner<'a> {
    client: &'a Client,
    resolver: &'a GatewayResolver,
    retry: RetryPolicy,
}

impl<'a> BatchRunner<'a> {
    pub fn new(client: &'a Client, resolver: &'a GatewayResolver, retry: RetryPolicy) -> Self {
        Self { client, resolver, retry }
    }

    /// Runs one batch: exactly one record per account, in input order.
    pub async fn run(&self, accounts: &[Account], sink: &dyn ResultSink) -> Vec<ResultRecord> {
        info!(total = accounts.len(), "batch starting");
        let mut records = Vec::with_capacity(accounts.len());
        for account in accounts {
            let outcome = match self.process_account(account).await {
                Ok(outcome) => outcome,
                Err(err) => SigninOutcome::failure(&err),
            };
            let record = ResultRecord { username: account.username.clone(), outcome };
            sink.record(&record);
            records.push(record);
        }
        let ok = records
            .iter()
            .filter(|r| r.outcome.status != SigninStatus::Failure)
            .count();
        info!(ok, total = records.len(), "batch finished");
        records
    }

    async fn process_account(&self, account: &Account) -> crate::error::Result<SigninOutcome> {
        let session = self
            .retry
            .run("login", || auth::login(self.client, self.resolver, account))
            .await?;
        info!(user = %account.username, "登录成功");
        self.retry
            .run("signin", || signin::sign_in(self.client, self.resolver, &session))
            .await
    }
}
