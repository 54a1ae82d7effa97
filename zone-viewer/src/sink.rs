use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zone_render::{RenderSink, Result, TableBody};

/// Writes the rendered `<tbody>` to a file, swapping it in with a rename so
/// readers never see a half-written table.
pub struct HtmlFileSink {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl HtmlFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        Self {
            path,
            tmp_path: PathBuf::from(tmp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for HtmlFileSink {
    fn publish(&mut self, body: &TableBody) -> Result<()> {
        std::fs::write(&self.tmp_path, body.to_html())?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        debug!("wrote {} rows to {}", body.len(), self.path.display());
        Ok(())
    }
}

pub struct StdoutSink;

impl RenderSink for StdoutSink {
    fn publish(&mut self, body: &TableBody) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", body.to_html())?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zone_render::{Renderer, ZoneTableRenderer};

    #[test]
    fn test_file_sink_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = HtmlFileSink::new(dir.path().join("table.html"));
        let mut body = TableBody::new();

        ZoneTableRenderer::new()
            .render(&mut body, r#"[{"id":"z1","last":"2024-01-01","excess":5}]"#)
            .unwrap();
        sink.publish(&body).unwrap();
        let html = std::fs::read_to_string(sink.path()).unwrap();
        assert!(html.contains("<td class=\"px-6 py-4\">z1</td>"));

        body.clear();
        sink.publish(&body).unwrap();
        let html = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(html, "<tbody id=\"table-body\">\n</tbody>\n");
        assert!(!dir.path().join("table.html.tmp").exists());
    }

    #[test]
    fn test_file_sink_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = HtmlFileSink::new(dir.path().join("missing").join("table.html"));
        let err = sink.publish(&TableBody::new()).unwrap_err();
        assert!(matches!(err, zone_render::RenderError::Io(_)));
    }
}
