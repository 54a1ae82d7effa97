use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use zone_render::ErrorPolicy;

pub const CONFIG_ENV: &str = "ZONE_VIEWER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "viewer.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Static index of instances
    Instances,
    /// 3-column live table (id / last / excess)
    Zones,
    /// 4-column live table (key / zone / last / excess)
    ZoneKeys,
}

impl ViewMode {
    pub fn is_live(self) -> bool {
        !matches!(self, ViewMode::Instances)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "instances" => Some(ViewMode::Instances),
            "zones" => Some(ViewMode::Zones),
            "zone-keys" => Some(ViewMode::ZoneKeys),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// `host[:port]` of the control plane internal API
    pub host: String,
    pub instance: Option<String>,
    pub mode: ViewMode,
    /// JSON array of instance names for the index page
    pub instances_data: String,
    /// File receiving the rendered `<tbody>`; stdout when unset
    pub output: Option<PathBuf>,
    pub on_error: ErrorPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8082".into(),
            instance: None,
            mode: ViewMode::ZoneKeys,
            instances_data: "[]".into(),
            output: None,
            on_error: ErrorPolicy::KeepRows,
        }
    }
}

impl ViewerConfig {
    /// Overrides from `ZONE_VIEWER_*` environment variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("ZONE_VIEWER_HOST") {
            self.host = host;
        }
        if let Some(instance) = lookup("ZONE_VIEWER_INSTANCE") {
            self.instance = Some(instance);
        }
        if let Some(mode) = lookup("ZONE_VIEWER_MODE") {
            match ViewMode::parse(&mode) {
                Some(m) => self.mode = m,
                None => warn!("[viewer] ZONE_VIEWER_MODE inconnu: {mode}"),
            }
        }
        if let Some(data) = lookup("ZONE_VIEWER_INSTANCES_DATA") {
            self.instances_data = data;
        }
        if let Some(output) = lookup("ZONE_VIEWER_OUTPUT") {
            self.output = Some(PathBuf::from(output));
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mode.is_live() {
            match self.instance.as_deref() {
                Some(name) if !name.trim().is_empty() => {}
                _ => anyhow::bail!("mode {:?} needs an instance name (ZONE_VIEWER_INSTANCE)", self.mode),
            }
            if self.host.trim().is_empty() {
                anyhow::bail!("empty host");
            }
        }
        Ok(())
    }
}

pub async fn load_config() -> ViewerConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut cfg = load_config_file(&path).await;
    cfg.apply_env(|key| std::env::var(key).ok());
    cfg
}

pub async fn load_config_file<P: AsRef<Path>>(path: P) -> ViewerConfig {
    let path = path.as_ref();
    if path.exists() {
        let txt = fs::read_to_string(path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return ViewerConfig::default();
        }
        serde_yaml::from_str(&txt).unwrap_or_else(|e| {
            warn!("[viewer] config invalide: {e}");
            ViewerConfig::default()
        })
    } else {
        warn!("[viewer] pas de {}, usage config par défaut", path.display());
        ViewerConfig::default()
    }
}
