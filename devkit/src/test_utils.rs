/*!
Test Harness pour les renderers live

Facilite l'écriture de tests avec:
- Setup automatique du transport mock et du sink d'enregistrement
- Assertions sur les lignes publiées
- Statistiques sur les frames échangées
*/

use anyhow::Result;
use zone_render::{LiveRenderer, LiveStats, Renderer, TableBody};

use crate::frame_stub::{mock_channel, MockFrameSender, MockFrameSource, RecordingSink};

/// Harness de test complet pour un renderer live
pub struct TestHarness {
    pub frames: MockFrameSender,
    pub sink: RecordingSink,
    source: MockFrameSource,
}

impl TestHarness {
    /// Crée un nouveau harness de test
    pub fn new() -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        let (frames, source) = mock_channel();
        Self {
            frames,
            sink: RecordingSink::new(),
            source,
        }
    }

    /// Ferme la connexion mock puis fait tourner la boucle live jusqu'au bout
    pub async fn run_to_close<R: Renderer>(&mut self, live: &mut LiveRenderer<R>) -> Result<LiveStats> {
        self.frames.close()?;
        let mut sink = self.sink.clone();
        let stats = live.run(&mut self.source, &mut sink).await?;
        log::info!("✅ Live loop finished: {:?}", stats);
        Ok(stats)
    }

    /// Dernière table publiée
    pub fn last_body(&self) -> Result<TableBody> {
        self.sink
            .last()
            .ok_or_else(|| anyhow::anyhow!("No table body published"))
    }

    /// Assert que la dernière table publiée contient exactement ces lignes
    pub fn assert_rows(&self, expected: &[&[&str]]) -> Result<()> {
        let body = self.last_body()?;
        let actual: Vec<Vec<&str>> = body.rows().iter().map(|r| r.texts()).collect();
        let expected: Vec<Vec<&str>> = expected.iter().map(|r| r.to_vec()).collect();

        if actual != expected {
            anyhow::bail!("Rows mismatch: expected {:?}, got {:?}", expected, actual);
        }
        log::info!("✅ {} rows as expected", actual.len());
        Ok(())
    }

    /// Assert sur le nombre de publications
    pub fn assert_publish_count(&self, expected: usize) -> Result<()> {
        let actual = self.sink.publish_count();
        if actual != expected {
            anyhow::bail!("Expected {} publications, got {}", expected, actual);
        }
        Ok(())
    }

    /// Stats sur les frames et publications collectées
    pub fn get_stats(&self) -> HarnessStats {
        HarnessStats {
            frames_sent: self.frames.sent_frames().len(),
            publications: self.sink.publish_count(),
            row_counts: self.sink.snapshots().iter().map(TableBody::len).collect(),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct HarnessStats {
    pub frames_sent: usize,
    pub publications: usize,
    pub row_counts: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_render::ZoneTableRenderer;

    #[tokio::test]
    async fn test_harness_basic_functionality() {
        let mut harness = TestHarness::new();
        harness.frames.send_text(r#"[{"id":"z1","last":"2024-01-01","excess":5}]"#).unwrap();
        harness.frames.send_text("[]").unwrap();

        let mut live = LiveRenderer::new(ZoneTableRenderer::new());
        let stats = harness.run_to_close(&mut live).await.unwrap();
        assert_eq!(stats.frames_rendered, 2);

        harness.assert_publish_count(2).unwrap();
        harness.assert_rows(&[]).unwrap();

        let stats = harness.get_stats();
        assert_eq!(stats.frames_sent, 3); // 2 frames + close
        assert_eq!(stats.row_counts, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_assert_rows_reports_mismatch() {
        let mut harness = TestHarness::new();
        harness.frames.send_text(r#"[{"id":"z1","last":1,"excess":2}]"#).unwrap();

        let mut live = LiveRenderer::new(ZoneTableRenderer::new());
        harness.run_to_close(&mut live).await.unwrap();

        assert!(harness.assert_rows(&[&["z1", "1", "2"]]).is_ok());
        assert!(harness.assert_rows(&[&["z2", "1", "2"]]).is_err());
    }
}
