/**
 * ZONE VIEWER - Point d'entrée du viewer des tables rate-limit
 *
 * RÔLE : Charge la config, choisit le renderer, ouvre le WebSocket et
 * publie la table re-rendue à chaque message (fichier HTML ou stdout).
 *
 * MODES :
 * - instances : index statique des instances (pas de réseau)
 * - zones     : table live 3 colonnes
 * - zone-keys : table live 4 colonnes, timestamps en heure locale
 */

mod config;
mod sink;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zone_render::{
    InstanceListRenderer, LiveRenderer, RenderSink, Renderer, TableBody, WsFrameSource,
    ZoneKeyTableRenderer, ZoneTableRenderer,
};

use crate::config::{load_config, ViewMode, ViewerConfig};
use crate::sink::{HtmlFileSink, StdoutSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let level = std::env::var("ZONE_VIEWER_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let cfg = load_config().await;
    cfg.validate().context("invalid viewer configuration")?;
    info!("zone viewer starting (mode: {:?}, host: {})", cfg.mode, cfg.host);

    match cfg.output.clone() {
        Some(path) => {
            info!("writing table to {}", path.display());
            run(&cfg, HtmlFileSink::new(path)).await
        }
        None => run(&cfg, StdoutSink).await,
    }
}

async fn run<K: RenderSink>(cfg: &ViewerConfig, sink: K) -> Result<()> {
    match cfg.mode {
        ViewMode::Instances => render_instances(cfg, sink),
        ViewMode::Zones => run_live(cfg, ZoneTableRenderer::new(), sink).await,
        ViewMode::ZoneKeys => run_live(cfg, ZoneKeyTableRenderer::new(), sink).await,
    }
}

fn render_instances<K: RenderSink>(cfg: &ViewerConfig, mut sink: K) -> Result<()> {
    let mut body = TableBody::new();
    let count = InstanceListRenderer::new(cfg.instances_data.as_str())
        .render_into(&mut body)
        .context("failed to render instance list")?;
    sink.publish(&body).context("failed to publish instance list")?;
    info!("rendered {} instances", count);
    Ok(())
}

async fn run_live<R: Renderer, K: RenderSink>(cfg: &ViewerConfig, renderer: R, mut sink: K) -> Result<()> {
    let instance = cfg
        .instance
        .as_deref()
        .context("no instance configured")?;

    let mut source = WsFrameSource::connect(&cfg.host, instance)
        .await
        .with_context(|| format!("failed to connect to {}", zone_render::socket_url(&cfg.host, instance)))?;

    let mut live = LiveRenderer::new(renderer).with_policy(cfg.on_error);
    let outcome = tokio::select! {
        res = live.run(&mut source, &mut sink) => res.map(|_| ()),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, stopping live view");
            Ok(())
        }
    };

    let stats = serde_json::to_string(live.stats()).unwrap_or_default();
    info!("live view stats: {}", stats);
    outcome.context("live connection failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_devkit::{spawn_ws_stub, RecordingSink, ZonePayloadBuilder};

    #[test]
    fn test_render_instances_publishes_links() {
        let cfg = ViewerConfig {
            mode: ViewMode::Instances,
            instances_data: ZonePayloadBuilder::instances(&["alpha", "beta"]),
            ..ViewerConfig::default()
        };
        let sink = RecordingSink::new();
        render_instances(&cfg, sink.clone()).unwrap();

        let body = sink.last().unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body.rows()[1].cells[0].href(), Some("/instances/beta"));
    }

    #[test]
    fn test_render_instances_malformed_data_fails() {
        let cfg = ViewerConfig {
            mode: ViewMode::Instances,
            instances_data: "[alpha]".into(),
            ..ViewerConfig::default()
        };
        let sink = RecordingSink::new();
        assert!(render_instances(&cfg, sink.clone()).is_err());
        assert_eq!(sink.publish_count(), 0);
    }

    #[tokio::test]
    async fn test_run_live_against_stub() {
        let mut stub = spawn_ws_stub(vec![
            r#"[{"id":"z1","last":"2024-01-01","excess":5}]"#.to_string(),
            "[]".to_string(),
        ])
        .await
        .unwrap();

        let cfg = ViewerConfig {
            host: stub.host(),
            instance: Some("rpaas-a".into()),
            mode: ViewMode::Zones,
            ..ViewerConfig::default()
        };
        let sink = RecordingSink::new();
        run(&cfg, sink.clone()).await.unwrap();
        stub.finished().await.unwrap();

        assert_eq!(stub.requested_path().as_deref(), Some("/ws/rpaas-a"));
        let snapshots = sink.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].rows()[0].texts(), vec!["z1", "2024-01-01", "5"]);
        assert!(snapshots[1].is_empty());
    }

    #[tokio::test]
    async fn test_run_live_unreachable_host() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let host = listener.local_addr().unwrap().to_string();
        drop(listener);

        let cfg = ViewerConfig {
            host,
            instance: Some("rpaas-a".into()),
            ..ViewerConfig::default()
        };
        let err = run(&cfg, RecordingSink::new()).await.unwrap_err();
        assert!(err.to_string().contains("failed to connect to ws://"));
    }
}
