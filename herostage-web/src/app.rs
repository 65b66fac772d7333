use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, Window};

use herostage_gpu_shared::frame::{FrameDesc, MaterialData, MeshData, MeshHandle};
use herostage_wgpu::{wgpu, Renderer, RendererOptions};

use crate::backend::RenderBackend;
use crate::config::StageConfig;
use crate::controller::SceneController;
use crate::error::{LoadError, StageError};
use crate::frame_loop::{CancellationToken, FrameLoop, FrameScheduler};
use crate::host::{self, HostPage};
use crate::loader::{self, LoadedAsset};
use crate::stage::Stage;

/// wgpu renderer bound to the canvas it draws into.
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    renderer: Renderer,
}

impl CanvasRenderer {
    fn new(canvas: HtmlCanvasElement, renderer: Renderer) -> Self {
        let backend = Self { canvas, renderer };
        backend.sync_canvas();
        backend
    }

    /// Backing store in physical pixels, layout box in CSS pixels.
    fn sync_canvas(&self) {
        let (buffer_w, buffer_h) = self.renderer.drawing_buffer_size();
        self.canvas.set_width(buffer_w);
        self.canvas.set_height(buffer_h);

        let (css_w, css_h) = self.renderer.size();
        let style = self.canvas.style();
        for (name, value) in [
            ("width", format!("{css_w}px")),
            ("height", format!("{css_h}px")),
            ("display", "block".to_string()),
        ] {
            if let Err(e) = style.set_property(name, &value) {
                log::warn!("Failed to set canvas {name}: {e:?}");
            }
        }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl RenderBackend for CanvasRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.renderer.set_size(width, height);
        self.sync_canvas();
    }

    fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.renderer.set_pixel_ratio(pixel_ratio);
        self.sync_canvas();
    }

    fn size(&self) -> (u32, u32) {
        self.renderer.size()
    }

    fn upload_mesh(
        &mut self,
        mesh: &MeshData,
        material: &MaterialData,
    ) -> Result<MeshHandle, String> {
        self.renderer.upload_mesh(mesh, material)
    }

    fn render(&mut self, frame: &FrameDesc) -> Result<(), String> {
        self.renderer.render(frame)
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Schedules the stage's frame callback with requestAnimationFrame.
pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl FrameScheduler for RafScheduler {
    type Request = i32;

    fn request_frame(&mut self) -> Result<i32, StageError> {
        let slot = self.callback.borrow();
        let callback = slot
            .as_ref()
            .ok_or_else(|| StageError::Scheduler("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| StageError::Scheduler(format!("{e:?}")))
    }

    fn cancel_frame(&mut self, request: i32) {
        if let Err(e) = self.window.cancel_animation_frame(request) {
            log::warn!("Failed to cancel animation frame {request}: {e:?}");
        }
    }
}

/// The document a stage mounts into.
struct BrowserPage {
    document: Document,
}

impl HostPage for BrowserPage {
    type Container = HtmlElement;
    type Canvas = HtmlCanvasElement;

    fn find_container(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn container_size(&self, container: &HtmlElement) -> (u32, u32) {
        (
            container.client_width().max(0) as u32,
            container.client_height().max(0) as u32,
        )
    }

    fn append_canvas(&self, container: &HtmlElement) -> Result<HtmlCanvasElement, StageError> {
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(page_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| StageError::Page("Element is not a canvas".into()))?;
        container.append_child(&canvas).map_err(page_error)?;
        Ok(canvas)
    }

    fn remove_canvas(&self, canvas: &HtmlCanvasElement) {
        canvas.remove();
    }
}

fn page_error(e: JsValue) -> StageError {
    StageError::Page(format!("{e:?}"))
}

fn js_error(e: StageError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

type BrowserStage = Stage<CanvasRenderer, RafScheduler>;

struct Mounted {
    stage: BrowserStage,
    resize_listener: Option<Closure<dyn FnMut()>>,
}

/// Handle to a mounted hero stage.
#[wasm_bindgen]
pub struct HeroStage {
    mounted: Rc<RefCell<Mounted>>,
    token: CancellationToken,
    window: Window,
}

#[wasm_bindgen]
impl HeroStage {
    /// Stop the render loop and detach the resize listener. The canvas stays
    /// in the page showing the last frame.
    pub fn stop(&self) {
        self.token.cancel();
        let Ok(mut mounted) = self.mounted.try_borrow_mut() else {
            return;
        };

        mounted.stage.stop();
        if let Some(listener) = mounted.resize_listener.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
            {
                log::warn!("Failed to remove resize listener: {e:?}");
            }
        }
        // Break the callback -> stage reference cycle
        mounted
            .stage
            .frame_loop_mut()
            .scheduler_mut()
            .callback
            .borrow_mut()
            .take();

        log::info!("Hero stage stopped");
    }

    /// Canvas width in physical pixels.
    pub fn width(&self) -> u32 {
        self.mounted
            .try_borrow()
            .map(|m| m.stage.controller().renderer().canvas().width())
            .unwrap_or(0)
    }

    /// Canvas height in physical pixels.
    pub fn height(&self) -> u32 {
        self.mounted
            .try_borrow()
            .map(|m| m.stage.controller().renderer().canvas().height())
            .unwrap_or(0)
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.mounted
            .try_borrow()
            .map(|m| m.stage.is_running())
            .unwrap_or(false)
    }
}

/// Mount a stage into the configured container. Resolves to `None`, with
/// the page untouched, when the container does not exist. A canvas appended
/// for a mount that then fails is removed again.
pub async fn mount(config: StageConfig) -> Result<Option<HeroStage>, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let page = BrowserPage { document };

    let Some(placement) = host::place_canvas(&page, &config.container_id).map_err(js_error)? else {
        return Ok(None);
    };

    let (width, height) = placement.size();
    let options = RendererOptions {
        antialias: config.renderer.antialias,
        pixel_ratio: config
            .renderer
            .pixel_ratio
            .unwrap_or_else(|| window.device_pixel_ratio()),
    };
    let target = wgpu::SurfaceTarget::Canvas(placement.canvas().clone());
    let renderer = Renderer::new(target, width, height, options)
        .await
        .map_err(|e| JsValue::from_str(&format!("Failed to create renderer: {e}")))?;
    let canvas = placement.commit();

    log::info!(
        "Renderer ready: {}x{} CSS px at ratio {}",
        width,
        height,
        options.pixel_ratio
    );

    let asset_url = config.asset_url.clone();
    let container_id = config.container_id.clone();
    let follow_device_ratio = config.renderer.pixel_ratio.is_none();

    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let frame_loop = FrameLoop::new(RafScheduler {
        window: window.clone(),
        callback: callback.clone(),
    });
    let token = frame_loop.token();

    let controller = SceneController::new(config, CanvasRenderer::new(canvas, renderer));
    let mounted = Rc::new(RefCell::new(Mounted {
        stage: Stage::new(controller, frame_loop),
        resize_listener: None,
    }));

    install_frame_callback(&mounted, &callback);
    install_resize_listener(&window, page, container_id, follow_device_ratio, &mounted)?;

    let loading = mounted.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_asset(&asset_url).await;
        let mut mounted = loading.borrow_mut();
        match mounted.stage.settle_load(result) {
            Ok(true) => log::debug!("Render loop started"),
            Ok(false) => log::debug!("Stage stopped before load settled"),
            Err(e) => log::error!("Failed to start render loop: {e}"),
        }
    });

    Ok(Some(HeroStage {
        mounted,
        token,
        window,
    }))
}

fn install_frame_callback(mounted: &Rc<RefCell<Mounted>>, slot: &FrameCallback) {
    let mounted = mounted.clone();
    *slot.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        let Ok(mut mounted) = mounted.try_borrow_mut() else {
            log::warn!("Frame callback re-entered; skipping");
            return;
        };

        // A failed render is not fatal; the next frame is already scheduled
        if let Err(e) = mounted.stage.run_frame(timestamp) {
            log::error!("{e}");
        }
    }));
}

fn install_resize_listener(
    window: &Window,
    page: BrowserPage,
    container_id: String,
    follow_device_ratio: bool,
    mounted: &Rc<RefCell<Mounted>>,
) -> Result<(), JsValue> {
    let target = mounted.clone();
    let listening = window.clone();
    let listener = Closure::<dyn FnMut()>::new(move || {
        let Some(container) = page.find_container(&container_id) else {
            return;
        };
        let (width, height) = page.container_size(&container);
        let pixel_ratio = follow_device_ratio.then(|| listening.device_pixel_ratio());
        if let Ok(mut mounted) = target.try_borrow_mut() {
            mounted.stage.resize(width, height, pixel_ratio);
        }
    });

    window.add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;
    mounted.borrow_mut().resize_listener = Some(listener);
    Ok(())
}

/// Fetch and parse the model asset.
async fn fetch_asset(url: &str) -> Result<LoadedAsset, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::Fetch("No window".into()))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| LoadError::Fetch("fetch did not return a Response".into()))?;

    if !response.ok() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    log::debug!("Fetched {url}: {} bytes", bytes.len());

    loader::parse_asset(&bytes)
}

fn fetch_error(e: JsValue) -> LoadError {
    LoadError::Fetch(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}
