//! Read-only client for the etcd registry (`etcdctl`).

use crate::process::{command_line, CommandRunner};
use serde::Serialize;
use std::sync::Arc;

pub const ETCDCTL: &str = "etcdctl";

pub const DEFAULT_ENDPOINTS: &str = "172.17.8.103:2379";

/// Prefix of the service discovery keys.
pub const DISCOVERY_PREFIX: &str = "/skydns";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EtcdOptions {
    pub endpoints: String,
    /// Application namespace, `/{domain}`.
    pub namespace_prefix: String,
    pub discovery_prefix: String,
}

impl EtcdOptions {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            namespace_prefix: format!("/{}", domain),
            ..Default::default()
        }
    }
}

impl Default for EtcdOptions {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.to_string(),
            namespace_prefix: format!("/{}", crate::config::DEFAULT_DOMAIN),
            discovery_prefix: DISCOVERY_PREFIX.to_string(),
        }
    }
}

/// What to pull from the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyQuery {
    /// Read a single key instead of listing.
    pub key: Option<String>,
    /// Include service discovery keys in the listing.
    pub discovery: bool,
    /// Show every key, unfiltered.
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyListing {
    pub lines: Vec<String>,
    pub exit_code: i32,
}

/// `etcdctl` wrapper.
#[derive(Clone)]
pub struct Etcd {
    runner: Arc<dyn CommandRunner>,
    options: EtcdOptions,
}

impl Etcd {
    pub fn new(runner: Arc<dyn CommandRunner>, options: EtcdOptions) -> Self {
        Self { runner, options }
    }

    pub fn argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec!["-C".to_string(), self.options.endpoints.clone()];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        argv
    }

    async fn exec(&self, args: &[&str]) -> (Vec<String>, i32) {
        let argv = self.argv(args);
        tracing::debug!("running {}", command_line(ETCDCTL, &argv));
        let (lines, code) = self.runner.execute(ETCDCTL, &argv).await.collect().await;
        tracing::debug!("exit code: {}", code);
        (lines, code)
    }

    /// List (filtered) keys, or read one key.
    pub async fn pull_keys(&self, query: &KeyQuery) -> KeyListing {
        if let Some(ref key) = query.key {
            let (lines, exit_code) = self.exec(&["get", key]).await;
            let value = lines.join("\n").trim_matches('\n').to_string();
            return KeyListing {
                lines: vec![value],
                exit_code,
            };
        }

        let (lines, exit_code) = self.exec(&["ls", "--recursive", "--sort"]).await;
        let lines = lines
            .into_iter()
            .filter(|line| self.keep(line, query))
            .collect();
        KeyListing { lines, exit_code }
    }

    fn keep(&self, line: &str, query: &KeyQuery) -> bool {
        if query.all {
            return !line.is_empty();
        }
        line.starts_with(&self.options.namespace_prefix)
            || (query.discovery && line.starts_with(&self.options.discovery_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::fake::FakeRunner;

    const KEYS: [&str; 5] = [
        "/coreos.com/network/config",
        "/maestro.io/alice/prod/app1/db/1",
        "/skydns/io/maestro/alice",
        "/maestro.io/alice/prod/app1/web/%i",
        "",
    ];

    fn etcd(runner: Arc<FakeRunner>) -> Etcd {
        Etcd::new(runner, EtcdOptions::default())
    }

    #[tokio::test]
    async fn listing_keeps_namespace_keys() {
        let runner = Arc::new(FakeRunner::new());
        runner.reply("ls", &KEYS, 0);
        let listing = etcd(runner.clone()).pull_keys(&KeyQuery::default()).await;

        assert_eq!(
            listing.lines,
            vec![
                "/maestro.io/alice/prod/app1/db/1",
                "/maestro.io/alice/prod/app1/web/%i"
            ]
        );
        assert_eq!(listing.exit_code, 0);
        assert_eq!(
            runner.calls()[0],
            vec!["-C", "172.17.8.103:2379", "ls", "--recursive", "--sort"]
        );
    }

    #[tokio::test]
    async fn discovery_keys_on_request() {
        let runner = Arc::new(FakeRunner::new());
        runner.reply("ls", &KEYS, 0);
        let query = KeyQuery {
            discovery: true,
            ..Default::default()
        };
        let listing = etcd(runner).pull_keys(&query).await;
        assert_eq!(listing.lines.len(), 3);
        assert!(listing.lines.contains(&"/skydns/io/maestro/alice".to_string()));
    }

    #[tokio::test]
    async fn all_keeps_every_non_empty_line() {
        let runner = Arc::new(FakeRunner::new());
        runner.reply("ls", &KEYS, 0);
        let query = KeyQuery {
            all: true,
            ..Default::default()
        };
        assert_eq!(etcd(runner).pull_keys(&query).await.lines.len(), 4);
    }

    #[tokio::test]
    async fn get_single_key() {
        let runner = Arc::new(FakeRunner::new());
        runner.reply("get", &["{\"host\": \"10.0.0.4\"}", ""], 0);
        let query = KeyQuery {
            key: Some("/maestro.io/alice/prod/app1/db/1".to_string()),
            ..Default::default()
        };
        let listing = etcd(runner.clone()).pull_keys(&query).await;
        assert_eq!(listing.lines, vec!["{\"host\": \"10.0.0.4\"}"]);
        assert_eq!(runner.calls()[0][2..], ["get", "/maestro.io/alice/prod/app1/db/1"]);
    }

    #[tokio::test]
    async fn listing_failure_keeps_exit_code() {
        let runner = Arc::new(FakeRunner::new());
        runner.reply("ls", &["Error: cluster is unavailable"], 4);
        let listing = etcd(runner).pull_keys(&KeyQuery::default()).await;
        assert!(listing.lines.is_empty());
        assert_eq!(listing.exit_code, 4);
    }
}
