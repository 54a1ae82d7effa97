/**
 * RENDERERS - Construction des lignes de table du dashboard
 *
 * RÔLE :
 * Transforme un payload JSON (liste d'instances ou échantillons de zones)
 * en lignes de `TableBody`, toujours en remplacement complet.
 *
 * FONCTIONNEMENT :
 * - `render_rows` parse et construit toutes les lignes AVANT de toucher la table
 * - `render` remplace les lignes seulement si tout le payload est valide
 * - L'ordre d'affichage suit l'ordre du tableau reçu (pas de tri, pas de dédup)
 *
 * VARIANTES :
 * - InstanceListRenderer : 1 colonne, lien /instances/<id>
 * - ZoneTableRenderer    : 3 colonnes id / last / excess (verbatim)
 * - ZoneKeyTableRenderer : 4 colonnes key / zone / last formaté / excess
 */

use chrono::{Local, TimeZone};
use tracing::debug;

use crate::error::Result;
use crate::models::{cell_text, parse_instances, parse_zone_key_samples, parse_zone_samples};
use crate::table::{Cell, Row, TableBody};
use crate::timefmt::format_timestamp_in;

/// Turns one payload into the complete row set of a table body.
pub trait Renderer {
    fn render_rows(&self, payload: &str) -> Result<Vec<Row>>;

    /// Replace every row of `body` with the rows built from `payload`.
    ///
    /// On error `body` is left exactly as it was.
    fn render(&self, body: &mut TableBody, payload: &str) -> Result<usize> {
        let rows = self.render_rows(payload)?;
        let count = rows.len();
        body.replace_rows(rows);
        Ok(count)
    }
}

pub fn instance_href(instance: &str) -> String {
    format!("/instances/{instance}")
}

/// Renders the instance index from the JSON list embedded in the page.
#[derive(Debug, Clone)]
pub struct InstanceListRenderer {
    instances_data: String,
}

impl InstanceListRenderer {
    pub fn new(instances_data: impl Into<String>) -> Self {
        Self {
            instances_data: instances_data.into(),
        }
    }

    pub fn render_into(&self, body: &mut TableBody) -> Result<usize> {
        self.render(body, &self.instances_data)
    }
}

impl Renderer for InstanceListRenderer {
    fn render_rows(&self, payload: &str) -> Result<Vec<Row>> {
        debug!("instances data: {}", payload);
        let instances = parse_instances(payload)?;
        Ok(instances
            .iter()
            .map(|instance| Row::new(vec![Cell::link(instance_href(instance), instance.as_str())]))
            .collect())
    }
}

/// 3-column live table: `id`, `last`, `excess` shown as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneTableRenderer;

impl ZoneTableRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for ZoneTableRenderer {
    fn render_rows(&self, payload: &str) -> Result<Vec<Row>> {
        let samples = parse_zone_samples(payload)?;
        Ok(samples
            .iter()
            .map(|s| Row::text_cells([cell_text(&s.id), cell_text(&s.last), cell_text(&s.excess)]))
            .collect())
    }
}

/// 4-column live table: `key`, `zone`, formatted `last`, `excess`.
#[derive(Debug, Clone)]
pub struct ZoneKeyTableRenderer<Tz: TimeZone = Local> {
    tz: Tz,
}

impl ZoneKeyTableRenderer<Local> {
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl Default for ZoneKeyTableRenderer<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> ZoneKeyTableRenderer<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }
}

impl<Tz: TimeZone> Renderer for ZoneKeyTableRenderer<Tz> {
    fn render_rows(&self, payload: &str) -> Result<Vec<Row>> {
        let samples = parse_zone_key_samples(payload)?;
        samples
            .iter()
            .map(|s| {
                let last = format_timestamp_in(&s.last, &self.tz)?;
                Ok(Row::text_cells([
                    cell_text(&s.key),
                    cell_text(&s.zone),
                    last,
                    cell_text(&s.excess),
                ]))
            })
            .collect()
    }
}
