/*!
# Zone DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le test des renderers du dashboard avec:
- Transport WebSocket mock (frames scriptées, sans serveur)
- Sink d'enregistrement des tables publiées
- Builders de payloads au format du control plane
- Serveur WebSocket local pour tests end-to-end
*/

pub mod frame_stub;
pub mod test_utils;
pub mod ws_stub;

pub use frame_stub::{mock_channel, MockFrameSender, MockFrameSource, RecordingSink, ZonePayloadBuilder};
pub use test_utils::TestHarness;
pub use ws_stub::{spawn_ws_stub, spawn_ws_stub_messages, spawn_ws_stub_with_delay, WsStub};
