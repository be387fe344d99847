//! WASM-compatible MediaPlayer wrapper

use super::host::{
    js_error, CanvasSurface, ElementControl, FrameCallback, RafScheduler, WebAudioHost,
    WebMediaElement,
};
use crate::{
    Controls, HostBindings, MediaEvent, MediaPlayer, PlayerConfig, PlayerError, RawValue,
    UiEvent, OBSERVED_ATTRIBUTES,
};
use js_sys::{Array, Reflect};
use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, HtmlCanvasElement, HtmlMediaElement, ShadowRoot};

const MEDIA_SELECTOR: &str = "audio";
const CANVAS_SELECTOR: &str = "#equalizer";

const PROGRESS_SELECTOR: &str = "webaudio-slider[name='progress']";
const VOLUME_SELECTOR: &str = "webaudio-knob[name='volume']";
const GAIN_SELECTOR: &str = "webaudio-knob[name='gain']";
const BALANCE_SELECTOR: &str = "webaudio-knob[name='balance']";
const PLAY_SELECTOR: &str = "button[name='toggle-play']";
const LOOP_SELECTOR: &str = "button[name='toggle-loop']";

/// Value controls and the UI event their `input` event becomes
const INPUT_EVENTS: [(&str, fn(RawValue) -> UiEvent); 4] = [
    (PROGRESS_SELECTOR, UiEvent::ProgressInput),
    (VOLUME_SELECTOR, UiEvent::VolumeInput),
    (GAIN_SELECTOR, UiEvent::GainInput),
    (BALANCE_SELECTOR, UiEvent::BalanceInput),
];

/// Clickable elements and the UI event a click becomes
const CLICK_EVENTS: [(&str, UiEvent); 6] = [
    (PLAY_SELECTOR, UiEvent::PlayClicked),
    (LOOP_SELECTOR, UiEvent::LoopClicked),
    ("button[name='rollback']", UiEvent::RollbackClicked),
    ("button[name='add10sec']", UiEvent::SkipForwardClicked),
    ("button[name='minus10sec']", UiEvent::SkipBackwardClicked),
    (CANVAS_SELECTOR, UiEvent::VisualizationClicked),
];

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// WASM-compatible media player
///
/// Built from the widget's shadow root; the custom element forwards its
/// lifecycle callbacks (`attach`, `detach`, `attributeChanged`).
#[wasm_bindgen]
pub struct WasmMediaPlayer {
    inner: Rc<RefCell<MediaPlayer>>,
    root: ShadowRoot,
    media: HtmlMediaElement,

    /// Kept alive for as long as frames can be requested
    #[allow(dead_code)]
    frame_callback: FrameCallback,

    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl WasmMediaPlayer {
    /// Bind a player to the elements of `root`
    ///
    /// `config` is an optional `PlayerConfig`-shaped object.
    #[wasm_bindgen(constructor)]
    pub fn new(root: ShadowRoot, config: JsValue) -> Result<WasmMediaPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        let media: HtmlMediaElement = query(&root, MEDIA_SELECTOR)?
            .dyn_into()
            .map_err(|_| JsValue::from_str("player element is not a media element"))?;
        let canvas: HtmlCanvasElement = query(&root, CANVAS_SELECTOR)?
            .dyn_into()
            .map_err(|_| JsValue::from_str("visualization element is not a canvas"))?;

        let controls = Controls {
            progress: control(&root, PROGRESS_SELECTOR)?,
            current_time: control(&root, "span[name='current-time']")?,
            duration: control(&root, "span[name='duration']")?,
            volume: control(&root, VOLUME_SELECTOR)?,
            gain: control(&root, GAIN_SELECTOR)?,
            balance: control(&root, BALANCE_SELECTOR)?,
            level_meter: control(&root, "webaudio-knob[name='vu']")?,
            play_button: control(&root, PLAY_SELECTOR)?,
            loop_button: control(&root, LOOP_SELECTOR)?,
        };

        let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
        let last_request = Rc::new(Cell::new(None));

        let bindings = HostBindings {
            media: Box::new(WebMediaElement::new(media.clone())),
            audio: Box::new(WebAudioHost::new(media.clone())),
            surface: Box::new(CanvasSurface::new(canvas)?),
            scheduler: Box::new(RafScheduler::new(
                window,
                frame_callback.clone(),
                last_request.clone(),
            )),
            controls,
        };
        let inner = Rc::new(RefCell::new(MediaPlayer::new(bindings, config)));

        let weak = Rc::downgrade(&inner);
        *frame_callback.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
            let Some(handle) = last_request.take() else {
                return;
            };
            if let Some(player) = weak.upgrade() {
                match player.try_borrow_mut() {
                    Ok(mut player) => player.on_animation_frame(handle),
                    Err(_) => warn!("Player busy, dropping frame {:?}", handle),
                }
            }
        }));

        Ok(Self {
            inner,
            root,
            media,
            frame_callback,
            listeners: Vec::new(),
        })
    }

    /// Names the custom element should list in `observedAttributes`
    #[wasm_bindgen(js_name = observedAttributes)]
    pub fn observed_attributes() -> Array {
        OBSERVED_ATTRIBUTES
            .iter()
            .map(|name| JsValue::from_str(name))
            .collect()
    }

    /// `connectedCallback`: subscribe to the controls and build the graph
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if self.listeners.is_empty() {
            self.add_listeners()?;
        }
        self.player()?.attach().map_err(to_js)
    }

    /// `disconnectedCallback`: unsubscribe and release everything
    pub fn detach(&mut self) -> Result<(), JsValue> {
        self.remove_listeners();
        self.player()?.detach();
        Ok(())
    }

    /// `attributeChangedCallback`
    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&self, name: &str, value: Option<String>) -> Result<(), JsValue> {
        self.player()?
            .attribute_changed(name, value.as_deref())
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) -> Result<(), JsValue> {
        self.player()?.toggle_play().map_err(to_js)
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.borrow().is_playing()
    }

    /// Player state as a plain object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.inner.borrow().snapshot();
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }
}

impl WasmMediaPlayer {
    fn player(&self) -> Result<RefMut<'_, MediaPlayer>, JsValue> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("player is busy"))
    }

    fn add_listeners(&mut self) -> Result<(), JsValue> {
        for (selector, make_event) in INPUT_EVENTS {
            let target = query(&self.root, selector)?;
            self.listen(target.into(), "input", move |player, event| {
                dispatch_ui(player, make_event(event_value(&event)));
            })?;
        }

        for (selector, ui_event) in CLICK_EVENTS {
            let target = query(&self.root, selector)?;
            self.listen(target.into(), "click", move |player, _| {
                dispatch_ui(player, ui_event.clone());
            })?;
        }

        let media = self.media.clone();
        self.listen(self.media.clone().into(), "timeupdate", move |player, _| {
            player.handle_media_event(MediaEvent::TimeUpdate {
                current_time: media.current_time(),
            });
        })?;

        let media = self.media.clone();
        self.listen(self.media.clone().into(), "loadedmetadata", move |player, _| {
            player.handle_media_event(MediaEvent::LoadedMetadata {
                duration: media.duration(),
            });
        })?;

        self.listen(self.media.clone().into(), "ended", |player, _| {
            player.handle_media_event(MediaEvent::Ended);
        })
    }

    fn listen(
        &mut self,
        target: EventTarget,
        event: &'static str,
        mut handler: impl FnMut(&mut MediaPlayer, Event) + 'static,
    ) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        let callback = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
            let Some(player) = weak.upgrade() else {
                return;
            };
            let Ok(mut player) = player.try_borrow_mut() else {
                warn!("Player busy, dropping {} event", e.type_());
                return;
            };
            handler(&mut player, e);
        });

        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target,
            event,
            callback,
        });
        Ok(())
    }

    fn remove_listeners(&mut self) {
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            ) {
                warn!("Failed to remove {} listener: {}", listener.event, js_error(e));
            }
        }
    }
}

impl Drop for WasmMediaPlayer {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

fn dispatch_ui(player: &mut MediaPlayer, event: UiEvent) {
    if let Err(e) = player.handle_ui_event(event) {
        warn!("Control event rejected: {}", e);
    }
}

/// Value carried by an `input` event's target
fn event_value(event: &Event) -> RawValue {
    let value = event
        .target()
        .and_then(|target| Reflect::get(&target, &JsValue::from_str("value")).ok())
        .unwrap_or(JsValue::UNDEFINED);
    match value.as_f64() {
        Some(number) => RawValue::Number(number),
        None => RawValue::Text(value.as_string().unwrap_or_default()),
    }
}

fn query(root: &ShadowRoot, selector: &str) -> Result<Element, JsValue> {
    root.query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("missing element {selector}")))
}

fn control(root: &ShadowRoot, selector: &str) -> Result<Box<dyn crate::host::Control>, JsValue> {
    Ok(Box::new(ElementControl::new(query(root, selector)?)))
}

fn to_js(err: PlayerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
