//! End-to-end widget runs against mock weather and icon servers.

use std::{io::Cursor, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use weather_widget_core::{
    AuthorizationStatus, Coordinate, DisplayMode, DisplayUpdate, FixedLocationSource, Layout,
    Renderer, WidgetConfig, clients_from_config, spawn_widget,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug)]
enum Rendered {
    Update(DisplayUpdate),
    Layout(DisplayMode, Layout),
    Error(String),
}

struct ChannelRenderer(mpsc::UnboundedSender<Rendered>);

impl Renderer for ChannelRenderer {
    fn apply_update(&mut self, update: DisplayUpdate) {
        let _ = self.0.send(Rendered::Update(update));
    }

    fn apply_layout(&mut self, mode: DisplayMode, layout: &Layout) {
        let _ = self.0.send(Rendered::Layout(mode, layout.clone()));
    }

    fn report_error(&mut self, message: &str) {
        let _ = self.0.send(Rendered::Error(message.to_string()));
    }
}

fn weather_json(icon: &str) -> serde_json::Value {
    serde_json::json!({
        "weather": [{ "description": "overcast clouds", "icon": icon }],
        "main": {
            "temp": 12.0,
            "feels_like": 11.2,
            "temp_min": 10.5,
            "temp_max": 14.49,
            "pressure": 1009,
            "humidity": 81
        },
        "name": "Reykjavik"
    })
}

fn png_icon() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn config_for(server: &MockServer) -> WidgetConfig {
    let mut cfg = WidgetConfig {
        weather_api_url: format!("{}/", server.uri()),
        image_api_url: format!("{}/", server.uri()),
        ..Default::default()
    };
    cfg.set_api_key("TEST_KEY".to_string());
    cfg
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Rendered>) -> Rendered {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for the renderer")
        .expect("renderer channel closed")
}

async fn join(task: JoinHandle<()>) {
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("widget should shut down")
        .expect("widget task should not panic");
}

#[tokio::test]
async fn renders_weather_then_icon_for_a_location() {
    let server = MockServer::start().await;
    let body = weather_json("04d");

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "64.1466"))
        .and(query_param("lon", "-21.9426"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/wn/04d@2x.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_icon()))
        .expect(1)
        .mount(&server)
        .await;

    let (weather, images) = clients_from_config(&config_for(&server)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let here = Coordinate::new(64.1466, -21.9426);

    let (handle, task) = spawn_widget(
        DisplayMode::Halfscreen,
        weather,
        images,
        Box::new(FixedLocationSource::new(here)),
        Box::new(ChannelRenderer(tx)),
    );

    match next(&mut rx).await {
        Rendered::Layout(mode, layout) => {
            assert_eq!(mode, DisplayMode::Halfscreen);
            assert!(layout.interaction_enabled);
        }
        other => panic!("expected initial layout, got {other:?}"),
    }

    match next(&mut rx).await {
        Rendered::Update(update) => {
            assert_eq!(update.place.as_deref(), Some("Reykjavik"));
            assert_eq!(update.temperature_text.as_deref(), Some("12.0°C"));
            assert_eq!(update.min_max_text.as_deref(), Some("H: 14°C, L: 11°C"));
            assert_eq!(update.description.as_deref(), Some("Overcast Clouds"));
        }
        other => panic!("expected weather update, got {other:?}"),
    }

    match next(&mut rx).await {
        Rendered::Update(update) => {
            let icon = update.icon.expect("icon update");
            assert_eq!((icon.width, icon.height), (3, 3));
        }
        other => panic!("expected icon update, got {other:?}"),
    }

    assert!(handle.set_mode("compact"));
    match next(&mut rx).await {
        Rendered::Layout(mode, layout) => {
            assert_eq!(mode, DisplayMode::Compact);
            assert!(!layout.interaction_enabled);
        }
        other => panic!("expected compact layout, got {other:?}"),
    }

    drop(handle);
    join(task).await;
}

#[tokio::test]
async fn weather_errors_reach_the_renderer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (weather, images) = clients_from_config(&config_for(&server)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let (handle, _task) = spawn_widget(
        DisplayMode::Compact,
        weather,
        images,
        Box::new(FixedLocationSource::new(Coordinate::new(0.0, 0.0))),
        Box::new(ChannelRenderer(tx)),
    );

    let first = next(&mut rx).await;
    assert!(matches!(first, Rendered::Layout(DisplayMode::Compact, _)));
    match next(&mut rx).await {
        Rendered::Error(message) => assert!(message.contains("500")),
        other => panic!("expected an error report, got {other:?}"),
    }

    drop(handle);
}

#[tokio::test]
async fn repeated_locations_fetch_the_icon_once() {
    let server = MockServer::start().await;
    let body = weather_json("09n");

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(3..)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/wn/09n@2x.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_icon()))
        .expect(1)
        .mount(&server)
        .await;

    let (weather, images) = clients_from_config(&config_for(&server)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let location = FixedLocationSource::new(Coordinate::new(64.1, -21.9))
        .with_refresh(Duration::from_millis(50));
    let (handle, task) = spawn_widget(
        DisplayMode::Compact,
        weather,
        images,
        Box::new(location),
        Box::new(ChannelRenderer(tx)),
    );

    let mut weather_updates = 0;
    let mut icon_updates = 0;
    while weather_updates < 3 || icon_updates < 1 {
        if let Rendered::Update(update) = next(&mut rx).await {
            if update.icon.is_some() {
                icon_updates += 1;
            } else {
                weather_updates += 1;
            }
        }
    }

    drop(handle);
    join(task).await;
    while let Ok(Rendered::Update(update)) = rx.try_recv() {
        if update.icon.is_some() {
            icon_updates += 1;
        }
    }

    assert_eq!(icon_updates, 1);
}

#[tokio::test]
async fn denied_location_never_fetches() {
    let server = MockServer::start().await;
    let body = weather_json("01d");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(0)
        .mount(&server)
        .await;

    let (weather, images) = clients_from_config(&config_for(&server)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let location = FixedLocationSource::new(Coordinate::new(1.0, 1.0))
        .with_authorization(AuthorizationStatus::Denied);
    let (handle, task) = spawn_widget(
        DisplayMode::Compact,
        weather,
        images,
        Box::new(location),
        Box::new(ChannelRenderer(tx)),
    );

    assert!(matches!(next(&mut rx).await, Rendered::Layout(..)));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err());

    drop(handle);
    join(task).await;
}
