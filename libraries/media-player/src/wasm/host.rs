//! Browser implementations of the host traits

use crate::error::{PlayerError, Result};
use crate::host::{
    AudioHost, Control, DrawingSurface, FrameHandle, FrameScheduler, MediaElement, NodeId,
    NodeParam,
};
use crate::types::DisplayValue;
use js_sys::{Function, Reflect};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AnalyserNode, AudioContext, AudioDestinationNode, AudioNode, CanvasRenderingContext2d,
    Element, GainNode, HtmlCanvasElement, HtmlMediaElement, MediaElementAudioSourceNode,
    StereoPannerNode, Window,
};

/// Readable message for a thrown JS value
pub(crate) fn js_error(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

// ===== Media element =====

/// `<audio>`/`<video>` element
pub struct WebMediaElement {
    element: HtmlMediaElement,
}

impl WebMediaElement {
    pub fn new(element: HtmlMediaElement) -> Self {
        Self { element }
    }
}

impl MediaElement for WebMediaElement {
    fn play(&mut self) -> Result<()> {
        // The returned promise rejects asynchronously under autoplay policies;
        // the element then stays paused and the UI follows its events.
        self.element
            .play()
            .map(|_| ())
            .map_err(|e| PlayerError::media(js_error(e)))
    }

    fn pause(&mut self) -> Result<()> {
        self.element
            .pause()
            .map_err(|e| PlayerError::media(js_error(e)))
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.element.duration();
        duration.is_finite().then_some(duration)
    }

    fn volume(&self) -> f64 {
        self.element.volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn is_looping(&self) -> bool {
        self.element.loop_()
    }

    fn set_looping(&mut self, looping: bool) {
        self.element.set_loop(looping);
    }

    fn load(&mut self, src: &str) -> Result<()> {
        self.element.set_src(src);
        self.element.load();
        Ok(())
    }
}

// ===== Web Audio =====

enum WebNode {
    Source(MediaElementAudioSourceNode),
    Gain(GainNode),
    Panner(StereoPannerNode),
    Analyser(AnalyserNode),
    Destination(AudioDestinationNode),
}

impl WebNode {
    fn audio_node(&self) -> &AudioNode {
        match self {
            WebNode::Source(n) => n.as_ref(),
            WebNode::Gain(n) => n.as_ref(),
            WebNode::Panner(n) => n.as_ref(),
            WebNode::Analyser(n) => n.as_ref(),
            WebNode::Destination(n) => n.as_ref(),
        }
    }
}

/// Web Audio context bound to a media element
///
/// The context is created lazily by the first node request, so an
/// environment without Web Audio fails graph construction.
pub struct WebAudioHost {
    media: HtmlMediaElement,
    context: Option<AudioContext>,
    nodes: Vec<WebNode>,
    destination: Option<NodeId>,
}

impl WebAudioHost {
    pub fn new(media: HtmlMediaElement) -> Self {
        Self {
            media,
            context: None,
            nodes: Vec::new(),
            destination: None,
        }
    }

    fn context(&mut self) -> Result<AudioContext> {
        if let Some(context) = &self.context {
            return Ok(context.clone());
        }
        let context = AudioContext::new().map_err(|e| PlayerError::audio_host(js_error(e)))?;
        self.context = Some(context.clone());
        Ok(context)
    }

    fn push(&mut self, node: WebNode) -> NodeId {
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u32)
    }

    fn node(&self, id: NodeId) -> Result<&WebNode> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| PlayerError::audio_host(format!("unknown node {id:?}")))
    }
}

impl AudioHost for WebAudioHost {
    fn create_media_source(&mut self) -> Result<NodeId> {
        let node = self
            .context()?
            .create_media_element_source(&self.media)
            .map_err(|e| PlayerError::audio_host(js_error(e)))?;
        Ok(self.push(WebNode::Source(node)))
    }

    fn create_gain(&mut self) -> Result<NodeId> {
        let node = self
            .context()?
            .create_gain()
            .map_err(|e| PlayerError::audio_host(js_error(e)))?;
        Ok(self.push(WebNode::Gain(node)))
    }

    fn create_stereo_panner(&mut self) -> Result<NodeId> {
        let node = self
            .context()?
            .create_stereo_panner()
            .map_err(|e| PlayerError::audio_host(js_error(e)))?;
        Ok(self.push(WebNode::Panner(node)))
    }

    fn create_analyser(&mut self, fft_size: u32) -> Result<NodeId> {
        let node = self
            .context()?
            .create_analyser()
            .map_err(|e| PlayerError::audio_host(js_error(e)))?;
        node.set_fft_size(fft_size);
        Ok(self.push(WebNode::Analyser(node)))
    }

    fn destination(&mut self) -> Result<NodeId> {
        if let Some(id) = self.destination {
            return Ok(id);
        }
        let node = self.context()?.destination();
        let id = self.push(WebNode::Destination(node));
        self.destination = Some(id);
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        let from = self.node(from)?.audio_node();
        let to = self.node(to)?.audio_node();
        from.connect_with_audio_node(to)
            .map(|_| ())
            .map_err(|e| PlayerError::audio_host(js_error(e)))
    }

    fn set_param(&mut self, node: NodeId, param: NodeParam, value: f32) -> Result<()> {
        match (self.node(node)?, param) {
            (WebNode::Gain(gain), NodeParam::Gain) => gain.gain().set_value(value),
            (WebNode::Panner(panner), NodeParam::Pan) => panner.pan().set_value(value),
            (_, param) => {
                return Err(PlayerError::audio_host(format!(
                    "node {node:?} has no {param:?} parameter"
                )))
            }
        }
        Ok(())
    }

    fn frequency_bin_count(&self, analyser: NodeId) -> usize {
        match self.nodes.get(analyser.0 as usize) {
            Some(WebNode::Analyser(node)) => node.frequency_bin_count() as usize,
            _ => 0,
        }
    }

    fn read_frequency_data(&mut self, analyser: NodeId, out: &mut [u8]) -> Result<()> {
        match self.node(analyser)? {
            WebNode::Analyser(node) => {
                node.get_byte_frequency_data(out);
                Ok(())
            }
            _ => Err(PlayerError::audio_host(format!(
                "{analyser:?} is not an analyser"
            ))),
        }
    }

    fn disconnect(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?
            .audio_node()
            .disconnect()
            .map_err(|e| PlayerError::audio_host(js_error(e)))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(context) = self.context.take() {
            context
                .close()
                .map_err(|e| PlayerError::audio_host(js_error(e)))?;
        }
        Ok(())
    }
}

// ===== Canvas =====

/// 2D canvas
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> std::result::Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d canvas context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, context })
    }
}

impl DrawingSurface for CanvasSurface {
    fn width(&self) -> f64 {
        f64::from(self.canvas.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.canvas.height())
    }

    fn clear(&mut self) {
        self.context
            .clear_rect(0.0, 0.0, self.width(), self.height());
    }

    fn set_fill_style(&mut self, color: &str) {
        self.context.set_fill_style_str(color);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.fill_rect(x, y, width, height);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.context.set_stroke_style_str(color);
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }
}

// ===== Frame scheduling =====

/// Callback invoked by `requestAnimationFrame`, installed after the player
/// exists
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` scheduler
///
/// The browser passes a timestamp rather than the request id, so the last
/// requested handle is shared with the callback.
pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
    last_request: Rc<Cell<Option<FrameHandle>>>,
}

impl RafScheduler {
    pub fn new(
        window: Window,
        callback: FrameCallback,
        last_request: Rc<Cell<Option<FrameHandle>>>,
    ) -> Self {
        Self {
            window,
            callback,
            last_request,
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle> {
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            return Err(PlayerError::Scheduler(
                "frame callback not installed".to_string(),
            ));
        };

        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| PlayerError::Scheduler(js_error(e)))?;
        let handle = FrameHandle(u64::from(id.unsigned_abs()));
        self.last_request.set(Some(handle));
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Ok(id) = i32::try_from(handle.0) {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                warn!("Failed to cancel frame {}: {}", id, js_error(e));
            }
        }
        if self.last_request.get() == Some(handle) {
            self.last_request.set(None);
        }
    }
}

// ===== Controls =====

/// DOM control: a slider/knob custom element, a label or a button
///
/// Numbers go to the element's `setValue()` method when it has one (the
/// knob and slider elements), otherwise to its `value` property. Text
/// replaces the element's content.
pub struct ElementControl {
    element: Element,
}

impl ElementControl {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    fn set_property(&self, name: &str, value: f64) {
        if let Err(e) = Reflect::set(
            &self.element,
            &JsValue::from_str(name),
            &JsValue::from_f64(value),
        ) {
            warn!("Failed to set control {}: {}", name, js_error(e));
        }
    }
}

impl Control for ElementControl {
    fn value(&self) -> DisplayValue {
        let value = Reflect::get(&self.element, &JsValue::from_str("value"))
            .unwrap_or(JsValue::UNDEFINED);
        match value.as_f64() {
            Some(number) => DisplayValue::Number(number),
            None => DisplayValue::Text(self.element.text_content().unwrap_or_default()),
        }
    }

    fn set_value(&mut self, value: DisplayValue) {
        match value {
            DisplayValue::Number(number) => {
                let setter = Reflect::get(&self.element, &JsValue::from_str("setValue"))
                    .ok()
                    .and_then(|f| f.dyn_into::<Function>().ok());
                match setter {
                    Some(setter) => {
                        if let Err(e) = setter.call1(&self.element, &JsValue::from_f64(number)) {
                            warn!("Control setValue failed: {}", js_error(e));
                        }
                    }
                    None => self.set_property("value", number),
                }
            }
            DisplayValue::Text(text) => self.element.set_text_content(Some(&text)),
        }
    }

    fn set_range(&mut self, min: f64, max: f64) {
        self.set_property("min", min);
        self.set_property("max", max);
    }
}
