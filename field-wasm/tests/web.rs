#![cfg(target_arch = "wasm32")]

use field_wasm::{ParticleField, StaticDotGrid};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn mounted_canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn settings(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

#[wasm_bindgen_test]
fn test_start_and_stop() {
    field_wasm::init(false);
    let field = ParticleField::new(mounted_canvas(), settings(r#"{"count": 25}"#)).unwrap();

    assert!(!field.is_running());
    field.start().unwrap();
    assert!(field.is_running());
    assert_eq!(field.particle_count(), 25);

    field.stop();
    assert!(!field.is_running());
    assert_eq!(field.particle_count(), 0);

    // Stopped is terminal
    field.start().unwrap();
    assert!(!field.is_running());
}

#[wasm_bindgen_test]
fn test_defaults_when_settings_missing() {
    let field = ParticleField::new(mounted_canvas(), JsValue::UNDEFINED).unwrap();
    field.start().unwrap();
    assert_eq!(field.particle_count(), 100);
}

#[wasm_bindgen_test]
fn test_invalid_settings_are_rejected() {
    let result = ParticleField::new(mounted_canvas(), settings(r#"{"speedLimit": 0}"#));
    assert!(result.is_err());

    let result = ParticleField::new(mounted_canvas(), settings(r##"{"boidColor": "#zzzzzz"}"##));
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn test_canvas_sized_for_pixel_ratio() {
    let canvas = mounted_canvas();
    let field = ParticleField::new(canvas.clone(), settings(r#"{"count": 5}"#)).unwrap();
    field.start().unwrap();

    let window = web_sys::window().unwrap();
    let ratio = window.device_pixel_ratio();
    let width = window.inner_width().unwrap().as_f64().unwrap();
    assert_eq!(canvas.width(), (width as f32 * ratio as f32).round() as u32);
    assert_eq!(canvas.style().get_property_value("width").unwrap(), format!("{}px", width));
}

#[wasm_bindgen_test]
fn test_reset_changes_population() {
    let field = ParticleField::new(mounted_canvas(), settings(r#"{"count": 10}"#)).unwrap();
    field.start().unwrap();
    field.reset(settings(r#"{"count": 3}"#)).unwrap();
    assert_eq!(field.particle_count(), 3);
    assert!(field.reset(settings(r#"{"gridSpacing": -4}"#)).is_err());
    assert_eq!(field.particle_count(), 3);
}

#[wasm_bindgen_test]
fn test_static_grid_mount_cycle() {
    let mut grid = StaticDotGrid::new(mounted_canvas(), settings(r#"{"gridSpacing": 30}"#)).unwrap();
    assert!(!grid.is_mounted());
    grid.mount();
    assert!(grid.is_mounted());
    grid.unmount();
    assert!(!grid.is_mounted());
}
