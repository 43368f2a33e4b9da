use crate::gui_bridge::model::DisplayModel;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use trafficcore::display_interface::{RenderFrame, Renderer};
use trafficcore::prelude::TrafficConfig;
use trafficcore::receiver_interface::{ButtonEvent, TargetReport};
use trafficcore::tracking::EngineHandle;
use warp::{http::StatusCode, Filter};

pub type SharedModel = Arc<RwLock<DisplayModel>>;
pub type SharedSettings = Arc<RwLock<TrafficConfig>>;

/// Renderer that publishes each frame into the bridge's model.
pub struct BridgeRenderer {
    state: SharedModel,
}

impl Renderer for BridgeRenderer {
    fn present(&mut self, frame: &RenderFrame) {
        if let Ok(mut model) = self.state.write() {
            model.apply(frame);
        }
    }
}

/// HTTP face of the display: serves the latest frame and feeds injected
/// reports, button events and settings back into the engine.
pub struct DisplayBridge {
    state: SharedModel,
}

impl DisplayBridge {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DisplayModel::default())),
        }
    }

    pub fn renderer(&self) -> BridgeRenderer {
        BridgeRenderer {
            state: self.state.clone(),
        }
    }

    pub fn snapshot(&self) -> DisplayModel {
        self.state
            .read()
            .map(|model| model.clone())
            .unwrap_or_default()
    }

    /// Serves the routes from a dedicated thread until the process exits.
    pub fn serve(&self, handle: EngineHandle, settings: SharedSettings, addr: SocketAddr) {
        let api = routes(self.state.clone(), handle, settings);
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("display bridge runtime failed: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(api).run(addr).await;
            });
        });
        info!("display bridge listening on http://{}", addr);
    }
}

impl Default for DisplayBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn reply<T: Serialize>(body: &T, status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

pub fn routes(
    state: SharedModel,
    handle: EngineHandle,
    settings: SharedSettings,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let handle_filter = warp::any().map(move || handle.clone());
    let settings_filter = warp::any().map(move || settings.clone());

    let frame_route = warp::path("frame")
        .and(warp::get())
        .and(state_filter)
        .map(|state: SharedModel| {
            let response = match state.read() {
                Ok(model) => reply(&*model, StatusCode::OK),
                Err(_) => reply(
                    &json!({"error": "display model unavailable"}),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ),
            };
            response
        });

    let ingest_route = warp::path("ingest")
        .and(warp::post())
        .and(warp::body::json())
        .and(handle_filter.clone())
        .map(|report: TargetReport, handle: EngineHandle| match handle.ingest(report) {
            Ok(outcome) => reply(
                &json!({"status": "ok", "outcome": format!("{:?}", outcome).to_lowercase()}),
                StatusCode::OK,
            ),
            Err(err) => {
                warn!("ingest rejected: {}", err);
                reply(
                    &json!({"status": "error", "error": err.to_string()}),
                    StatusCode::UNPROCESSABLE_ENTITY,
                )
            }
        });

    let button_route = warp::path("button")
        .and(warp::post())
        .and(warp::body::json())
        .and(handle_filter.clone())
        .map(|event: ButtonEvent, handle: EngineHandle| {
            let accepted = handle.button(event);
            let status = if accepted {
                StatusCode::ACCEPTED
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            reply(&json!({ "accepted": accepted }), status)
        });

    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .and(handle_filter.clone())
        .map(|handle: EngineHandle| {
            reply(&handle.registry().metrics().snapshot(), StatusCode::OK)
        });

    let config_route = warp::path("config")
        .and(warp::post())
        .and(warp::body::json())
        .and(settings_filter)
        .and(handle_filter)
        .map(
            |config: TrafficConfig, settings: SharedSettings, handle: EngineHandle| {
                let response = match settings.write() {
                    Ok(mut current) => {
                        *current = config;
                        drop(current);
                        handle.notify_config_changed();
                        info!("settings replaced over HTTP");
                        reply(&json!({"status": "ok"}), StatusCode::OK)
                    }
                    Err(_) => reply(
                        &json!({"error": "settings unavailable"}),
                        StatusCode::INTERNAL_SERVER_ERROR,
                    ),
                };
                response
            },
        );

    frame_route
        .or(ingest_route)
        .or(button_route)
        .or(metrics_route)
        .or(config_route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficcore::prelude::{DisplayMode, UnitSystem};
    use trafficcore::tracking::{
        ArbitrationEngine, CueQueue, TargetRegistry, TickOutcome, CUE_QUEUE_DEPTH,
    };

    fn fixture() -> (ArbitrationEngine, DisplayBridge, SharedSettings) {
        let settings: SharedSettings = Arc::new(RwLock::new(TrafficConfig::default()));
        let registry = Arc::new(TargetRegistry::new(settings.clone()));
        let bridge = DisplayBridge::new();
        let (cues, _receiver) = CueQueue::new(CUE_QUEUE_DEPTH);
        let engine = ArbitrationEngine::new(registry, Box::new(bridge.renderer()), cues);
        (engine, bridge, settings)
    }

    fn glider(id: u32) -> TargetReport {
        TargetReport::new(id, 400.0, 0.0, 20.0).with_motion(90.0, 25.0, 1.0)
    }

    #[tokio::test]
    async fn ingest_route_feeds_registry() {
        let (engine, bridge, settings) = fixture();
        let api = routes(bridge.state.clone(), engine.handle(), settings);

        let res = warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&glider(0x4A3))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(engine.registry().len().unwrap(), 1);

        let res = warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&glider(0))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn frame_route_serves_last_pass() {
        let (mut engine, bridge, settings) = fixture();
        let api = routes(bridge.state.clone(), engine.handle(), settings);
        engine.handle().ingest(glider(0x4A3)).unwrap();
        while !matches!(engine.tick().unwrap(), TickOutcome::Pass(_)) {}

        let res = warp::test::request()
            .method("GET")
            .path("/frame")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["frame"]["pass"], 1);
        assert_eq!(body["frame"]["priority"], 0x4A3);
        assert_eq!(bridge.snapshot().frames_seen, 1);
    }

    #[tokio::test]
    async fn button_route_reaches_selection() {
        let (mut engine, bridge, settings) = fixture();
        let api = routes(bridge.state.clone(), engine.handle(), settings);
        engine.handle().ingest(glider(0x1)).unwrap();
        engine.handle().ingest(glider(0x2)).unwrap();
        while !matches!(engine.tick().unwrap(), TickOutcome::Pass(_)) {}

        let res = warp::test::request()
            .method("POST")
            .path("/button")
            .json(&ButtonEvent::Press)
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        engine.tick().unwrap();
        assert!(engine.selection().is_manual());
    }

    #[tokio::test]
    async fn config_route_replaces_settings() {
        let (engine, bridge, settings) = fixture();
        let api = routes(bridge.state.clone(), engine.handle(), settings.clone());
        let update = TrafficConfig {
            display_mode: DisplayMode::Simple,
            units: UnitSystem::Imperial,
            ..Default::default()
        };

        let res = warp::test::request()
            .method("POST")
            .path("/config")
            .json(&update)
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*settings.read().unwrap(), update);
    }

    #[tokio::test]
    async fn metrics_route_reports_counters() {
        let (engine, bridge, settings) = fixture();
        let api = routes(bridge.state.clone(), engine.handle(), settings);
        engine.handle().ingest(glider(0x7)).unwrap();
        engine
            .handle()
            .ingest(TargetReport::new(0x8, 10.0, 0.0, 0.0))
            .unwrap();

        let res = warp::test::request()
            .method("GET")
            .path("/metrics")
            .reply(&api)
            .await;
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["ingested"], 1);
        assert_eq!(body["dropped"], 1);
    }
}
