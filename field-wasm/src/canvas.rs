use field_core::{Color, Surface};
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// A `<canvas>` element and its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    // Resizing the canvas resets the context, so the cache is dropped then
    fill_style: Option<Color>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            canvas,
            context,
            fill_style: None,
        })
    }

    fn use_fill(&mut self, color: Color) {
        if self.fill_style != Some(color) {
            self.context.set_fill_style_str(&color.to_string());
            self.fill_style = Some(color);
        }
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, backing_width: u32, backing_height: u32, display_width: f32, display_height: f32) {
        self.canvas.set_width(backing_width);
        self.canvas.set_height(backing_height);
        self.fill_style = None;

        let style = self.canvas.style();
        for (property, value) in [("width", display_width), ("height", display_height)] {
            if let Err(err) = style.set_property(property, &format!("{}px", value)) {
                warn!("failed to set canvas {}: {:?}", property, err);
            }
        }
    }

    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn fill(&mut self, color: Color) {
        self.use_fill(color);
        self.context.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.use_fill(color);
        self.context.begin_path();
        if self
            .context
            .arc(cx as f64, cy as f64, radius as f64, 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            self.context.fill();
        }
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }
}
