//! Gateway configuration read from `ITAM_*` environment variables.

use std::path::PathBuf;

use itam_core::StaticStats;

/// Default bind address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Default directory for uploaded contract files.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads/contracts";

/// Default request body limit: 32 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Which [`FileStore`](crate::storage::FileStore) backs contract uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStoreKind {
    /// Files under [`GatewayConfig::upload_dir`].
    Local,
    /// Process memory; uploads vanish on restart.
    Memory,
}

/// SMS provider for alert messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsProvider {
    Aliyun,
    Tencent,
}

/// Alert channels for asset lifecycle events. Disabled by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Master switch; when off no channel is contacted.
    pub enable: bool,
    /// Feishu custom-bot webhook URL.
    pub feishu_webhook: Option<String>,
    pub sms_provider: Option<SmsProvider>,
    pub sms_template_code: String,
}

/// Runtime configuration for the gateway binary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Socket address to listen on.
    pub listen_addr: String,
    /// Root directory of the local file store.
    pub upload_dir: PathBuf,
    pub file_store: FileStoreKind,
    /// Seed the four sample assets at startup.
    pub seed_sample_data: bool,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Dashboard figures with no backing data.
    pub static_stats: StaticStats,
    pub notify: NotifyConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            file_store: FileStoreKind::Local,
            seed_sample_data: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            static_stats: StaticStats::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults. Set but unparseable values also keep
    /// the default and log a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let file_store = match lookup("ITAM_FILE_STORE").as_deref() {
            None | Some("local") => FileStoreKind::Local,
            Some("memory") => FileStoreKind::Memory,
            Some(other) => {
                tracing::warn!(key = "ITAM_FILE_STORE", value = other, "unknown file store, using local");
                FileStoreKind::Local
            }
        };
        Self {
            listen_addr: lookup("ITAM_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            upload_dir: lookup("ITAM_UPLOAD_DIR").map_or(defaults.upload_dir, PathBuf::from),
            file_store,
            seed_sample_data: parse_bool(&lookup, "ITAM_SEED_SAMPLE_DATA", defaults.seed_sample_data),
            max_upload_bytes: parse_or(&lookup, "ITAM_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            static_stats: StaticStats {
                ueba_score: parse_or(&lookup, "ITAM_UEBA_SCORE", defaults.static_stats.ueba_score),
                pending_audits: parse_or(
                    &lookup,
                    "ITAM_PENDING_AUDITS",
                    defaults.static_stats.pending_audits,
                ),
            },
            notify: notify_from_lookup(&lookup, defaults.notify),
        }
    }
}

fn notify_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
    defaults: NotifyConfig,
) -> NotifyConfig {
    let sms_provider = match lookup("ITAM_SMS_PROVIDER").as_deref().map(str::trim) {
        None | Some("") => defaults.sms_provider,
        Some("aliyun") => Some(SmsProvider::Aliyun),
        Some("tencent") => Some(SmsProvider::Tencent),
        Some(other) => {
            tracing::warn!(key = "ITAM_SMS_PROVIDER", value = other, "unknown sms provider");
            None
        }
    };
    NotifyConfig {
        enable: parse_bool(lookup, "ITAM_NOTIFY_ENABLE", defaults.enable),
        feishu_webhook: lookup("ITAM_FEISHU_WEBHOOK")
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty())
            .or(defaults.feishu_webhook),
        sms_provider,
        sms_template_code: lookup("ITAM_SMS_TEMPLATE_CODE").unwrap_or(defaults.sms_template_code),
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).as_deref() {
        None => default,
        Some("1" | "true" | "TRUE" | "yes" | "YES") => true,
        Some("0" | "false" | "FALSE" | "no" | "NO") => false,
        Some(other) => {
            tracing::warn!(key, value = other, "unparseable boolean, using default");
            default
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = %raw, "unparseable value, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> GatewayConfig {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        GatewayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(config_from(&[]), GatewayConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("ITAM_LISTEN_ADDR", "0.0.0.0:9000"),
            ("ITAM_UPLOAD_DIR", "/srv/itam"),
            ("ITAM_FILE_STORE", "memory"),
            ("ITAM_SEED_SAMPLE_DATA", "false"),
            ("ITAM_MAX_UPLOAD_BYTES", "1024"),
            ("ITAM_UEBA_SCORE", "20"),
            ("ITAM_PENDING_AUDITS", "0"),
        ]);
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/itam"));
        assert_eq!(config.file_store, FileStoreKind::Memory);
        assert!(!config.seed_sample_data);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.static_stats, StaticStats { ueba_score: 20, pending_audits: 0 });
    }

    #[test]
    fn notifications_are_off_unless_enabled() {
        let config = config_from(&[("ITAM_FEISHU_WEBHOOK", "https://open.feishu.cn/hook/x")]);
        assert!(!config.notify.enable);
        assert_eq!(config.notify.feishu_webhook.as_deref(), Some("https://open.feishu.cn/hook/x"));
    }

    #[test]
    fn notify_settings_are_read() {
        let config = config_from(&[
            ("ITAM_NOTIFY_ENABLE", "true"),
            ("ITAM_FEISHU_WEBHOOK", "  "),
            ("ITAM_SMS_PROVIDER", "aliyun"),
            ("ITAM_SMS_TEMPLATE_CODE", "SMS_001"),
        ]);
        assert_eq!(
            config.notify,
            NotifyConfig {
                enable: true,
                feishu_webhook: None,
                sms_provider: Some(SmsProvider::Aliyun),
                sms_template_code: "SMS_001".to_owned(),
            }
        );
        let unknown = config_from(&[("ITAM_SMS_PROVIDER", "carrier-pigeon")]);
        assert_eq!(unknown.notify.sms_provider, None);
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("ITAM_SEED_SAMPLE_DATA", "maybe"),
            ("ITAM_MAX_UPLOAD_BYTES", "lots"),
            ("ITAM_FILE_STORE", "s3"),
        ]);
        assert!(config.seed_sample_data);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.file_store, FileStoreKind::Local);
    }
}
