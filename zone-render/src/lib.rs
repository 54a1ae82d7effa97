/*!
# Zone Render - Rendu des tables du dashboard rate-limit

Bibliothèque qui construit les lignes des tables du dashboard avec:
- Liste statique des instances (liens `/instances/<id>`)
- Tables live des zones (3 et 4 colonnes) en remplacement complet
- Formatage local des timestamps `DD/MM/YY HH:MM:SS.mmm`
- Boucle live générique sur une source de frames WebSocket
*/

pub mod error;
pub mod live;
pub mod models;
pub mod renderers;
pub mod socket;
pub mod table;
pub mod timefmt;

pub use error::{RenderError, Result};
pub use live::{ErrorPolicy, FrameSource, LiveRenderer, LiveStats, RenderSink};
pub use models::{ZoneKeySample, ZoneSample};
pub use renderers::{InstanceListRenderer, Renderer, ZoneKeyTableRenderer, ZoneTableRenderer};
pub use socket::{socket_url, WsFrameSource};
pub use table::{Cell, CellContent, Row, TableBody};
pub use timefmt::{format_timestamp, format_timestamp_in};
