//! Main viewer application — combines the wgpu lot scene with egui panels
//! and a 2D plan-view editor mode.

use crate::panels::{self, ToolbarAction};
use crate::plan_view;
use anyhow::{Context, Result};
use lotline_editor::{EditorController, EditorKey};
use lotline_layout::{load_layout, save_layout};
use lotline_model::LotModel;
use lotline_render::{
    Camera, LotSceneRenderer, RenderContext, RendererConfig, ReservationIntent,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

/// Pointer travel below this counts as a click, not an orbit drag
const CLICK_SLOP: f64 = 5.0;

/// Which surface the viewer is presenting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerMode {
    /// Top-down plan view with element editing
    Edit,
    /// 3D projection with orbit camera and reservation picking
    Visualize,
}

/// Run the viewer, optionally loading a layout file first.
pub fn run(layout_path: Option<String>) -> Result<()> {
    let model = match &layout_path {
        Some(path) => {
            let (model, file) = load_layout(path)
                .with_context(|| format!("Failed to load layout: {}", path))?;
            println!(
                "Loaded layout: {} ({} spots, {} available)",
                path, file.total_spots, file.available_spots
            );
            model
        }
        None => {
            println!("Starting with an empty layout");
            LotModel::new()
        }
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(model, layout_path);
    event_loop.run_app(&mut app)?;

    Ok(())
}

pub struct ViewerApp {
    // Window and GPU state, created in `initialize` and dropped in `stop`
    window: Option<Arc<Window>>,
    render_context: Option<RenderContext>,
    scene_renderer: Option<LotSceneRenderer>,
    egui_ctx: egui::Context,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    model: LotModel,
    model_dirty: Rc<Cell<bool>>,
    editor: EditorController,
    camera: Camera,
    mode: ViewerMode,

    layout_path: Option<String>,
    pending_kind: Option<lotline_model::ElementKind>,
    last_intent: Option<ReservationIntent>,
    status_line: String,

    modifiers: ModifiersState,
    last_mouse_pos: Option<(f64, f64)>,
    left_pressed: bool,
    right_pressed: bool,
    drag_distance: f64,
}

impl ViewerApp {
    pub fn new(model: LotModel, layout_path: Option<String>) -> Self {
        let mut app = Self {
            window: None,
            render_context: None,
            scene_renderer: None,
            egui_ctx: egui::Context::default(),
            egui_winit: None,
            egui_renderer: None,
            model: LotModel::new(),
            model_dirty: Rc::new(Cell::new(true)),
            editor: EditorController::new(),
            camera: Camera::new(),
            mode: ViewerMode::Edit,
            layout_path,
            pending_kind: None,
            last_intent: None,
            status_line: String::new(),
            modifiers: ModifiersState::default(),
            last_mouse_pos: None,
            left_pressed: false,
            right_pressed: false,
            drag_distance: 0.0,
        };
        app.adopt_model(model);
        app
    }

    /// Swap in a model and hook up the dirty-flag observer so the 3D scene
    /// resyncs on the next frame after any mutation.
    fn adopt_model(&mut self, mut model: LotModel) {
        let dirty = Rc::clone(&self.model_dirty);
        model.subscribe(move |_event| dirty.set(true));
        self.model = model;
        self.model_dirty.set(true);

        let config = self.editor.config;
        self.editor = EditorController::new();
        self.editor.config = config;

        if self.mode == ViewerMode::Visualize {
            self.camera.frame_bounds(self.model.bounds());
        }
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("Lotline Viewer")
                    .with_inner_size(PhysicalSize::new(1600, 900)),
            )?,
        );

        let render_context = pollster::block_on(RenderContext::new(window.clone()))
            .context("Failed to create render context")?;

        self.camera.aspect = render_context.aspect_ratio();
        self.camera.frame_bounds(self.model.bounds());

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &render_context.device,
            render_context.config.format,
            None,
            1,
            false,
        );

        let scene_renderer = LotSceneRenderer::new(
            &render_context.device,
            render_context.config.format,
            RendererConfig::default(),
        );

        println!(
            "Viewer initialized ({}x{})",
            render_context.size.width, render_context.size.height
        );

        self.window = Some(window);
        self.render_context = Some(render_context);
        self.scene_renderer = Some(scene_renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        Ok(())
    }

    /// Tear down GPU state ahead of the window. Safe to call mid-init or
    /// more than once; fields that were never created are already None.
    fn stop(&mut self) {
        self.scene_renderer = None;
        self.egui_renderer = None;
        self.egui_winit = None;
        self.render_context = None;
        self.window = None;
        println!("Viewer stopped");
    }

    fn set_mode(&mut self, mode: ViewerMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        match mode {
            ViewerMode::Edit => println!("Switched to plan editor"),
            ViewerMode::Visualize => {
                // Re-frame on the current layout; the model itself is untouched
                self.camera.frame_bounds(self.model.bounds());
                println!("Switched to 3D preview");
            }
        }
    }

    fn save(&mut self) {
        let path = self
            .layout_path
            .clone()
            .unwrap_or_else(|| "lot-layout.json".to_string());
        match save_layout(&path, &self.model) {
            Ok(()) => {
                self.status_line = format!("Saved {}", path);
                self.layout_path = Some(path);
            }
            Err(e) => {
                eprintln!("Save failed: {}", e);
                self.status_line = format!("Save failed: {}", e);
            }
        }
    }

    fn reload(&mut self) {
        let Some(path) = self.layout_path.clone() else {
            return;
        };
        match load_layout(&path) {
            Ok((model, _file)) => {
                self.adopt_model(model);
                self.status_line = format!("Reloaded {}", path);
            }
            Err(e) => {
                eprintln!("Reload failed: {}", e);
                self.status_line = format!("Reload failed: {}", e);
            }
        }
    }

    /// Editor shortcuts. Returns true when the key was handled here and
    /// should not reach egui.
    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };

        match code {
            KeyCode::Escape => {
                if self.pending_kind.is_some() {
                    self.pending_kind = None;
                } else if self.editor.selected().is_some() {
                    self.editor.deselect();
                } else {
                    self.stop();
                    event_loop.exit();
                }
                true
            }
            KeyCode::Tab => {
                let next = match self.mode {
                    ViewerMode::Edit => ViewerMode::Visualize,
                    ViewerMode::Visualize => ViewerMode::Edit,
                };
                self.set_mode(next);
                true
            }
            _ if self.mode == ViewerMode::Edit => {
                let key = match code {
                    KeyCode::ArrowLeft => EditorKey::Left,
                    KeyCode::ArrowRight => EditorKey::Right,
                    KeyCode::ArrowUp => EditorKey::Up,
                    KeyCode::ArrowDown => EditorKey::Down,
                    KeyCode::Delete | KeyCode::Backspace => EditorKey::Delete,
                    KeyCode::KeyR => {
                        if self.modifiers.shift_key() {
                            EditorKey::RotateCcw
                        } else {
                            EditorKey::RotateCw
                        }
                    }
                    _ => return false,
                };
                self.editor.key(&mut self.model, key);
                true
            }
            _ => false,
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(context) = self.render_context.as_mut() {
            // Surface and depth buffer follow the window; the scene buffers
            // and camera target are untouched.
            context.resize(new_size);
            self.camera.aspect = context.aspect_ratio();
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => {
                self.left_pressed = true;
                self.drag_distance = 0.0;
            }
            (MouseButton::Left, ElementState::Released) => {
                self.left_pressed = false;
                if self.mode == ViewerMode::Visualize && self.drag_distance < CLICK_SLOP {
                    if let (Some(context), Some(renderer), Some((x, y))) = (
                        self.render_context.as_ref(),
                        self.scene_renderer.as_mut(),
                        self.last_mouse_pos,
                    ) {
                        // Queues a reservation intent; drained after render
                        renderer.click(
                            &self.model,
                            x as f32,
                            y as f32,
                            context.config.width as f32,
                            context.config.height as f32,
                            &self.camera,
                        );
                    }
                }
            }
            (MouseButton::Right, ElementState::Pressed) => self.right_pressed = true,
            (MouseButton::Right, ElementState::Released) => self.right_pressed = false,
            _ => {}
        }
    }

    fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.last_mouse_pos {
            let dx = (x - last_x) as f32;
            let dy = (y - last_y) as f32;

            if self.mode == ViewerMode::Visualize {
                if self.left_pressed {
                    self.drag_distance += (dx.abs() + dy.abs()) as f64;
                    self.camera.orbit_horizontal(-dx * 0.01);
                    self.camera.orbit_vertical(dy * 0.01);
                } else if self.right_pressed {
                    let speed = self.camera.distance * 0.001;
                    self.camera.pan(-dx * speed, dy * speed);
                }
            }
        }
        self.last_mouse_pos = Some((x, y));

        if self.mode == ViewerMode::Visualize {
            if let (Some(context), Some(renderer)) =
                (self.render_context.as_ref(), self.scene_renderer.as_mut())
            {
                renderer.update_hover(
                    x as f32,
                    y as f32,
                    context.config.width as f32,
                    context.config.height as f32,
                    &self.camera,
                );
            }
        }
    }

    fn render(&mut self) {
        if self.model_dirty.replace(false) {
            if let (Some(context), Some(renderer)) =
                (self.render_context.as_ref(), self.scene_renderer.as_mut())
            {
                renderer.sync_model(&context.device, &context.queue, &self.model);
            }
        }

        let Some(context) = self.render_context.as_ref() else {
            return;
        };

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Surface will be reconfigured on the next resize
                return;
            }
            Err(e) => {
                eprintln!("Failed to get surface texture: {:?}", e);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        match self.mode {
            ViewerMode::Visualize => {
                if let Some(renderer) = self.scene_renderer.as_ref() {
                    renderer.render(context, &view, &self.camera);
                }
            }
            ViewerMode::Edit => {
                // The plan view is pure egui; just clear the frame first
                // since the egui pass loads instead of clearing.
                let mut encoder =
                    context
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Clear Encoder"),
                        });
                {
                    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Clear Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: 0.94,
                                    g: 0.94,
                                    b: 0.94,
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    });
                }
                context.queue.submit(Some(encoder.finish()));
            }
        }

        self.render_egui(&view);
        output.present();

        if let Some(renderer) = self.scene_renderer.as_mut() {
            for intent in renderer.drain_intents() {
                println!(
                    "Reservation requested: spot {} ({:?})",
                    intent.spot_id, intent.previous_status
                );
                self.last_intent = Some(intent);
            }
        }
    }

    fn render_egui(&mut self, view: &wgpu::TextureView) {
        let Some(window) = self.window.clone() else {
            return;
        };
        let raw_input = match self.egui_winit.as_mut() {
            Some(state) => state.take_egui_input(&window),
            None => return,
        };

        let egui_ctx = self.egui_ctx.clone();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            self.draw_ui(ctx);
        });

        if let Some(state) = self.egui_winit.as_mut() {
            state.handle_platform_output(&window, full_output.platform_output);
        }
        let clipped_primitives =
            egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let Some(context) = self.render_context.as_ref() else {
            return;
        };
        let Some(mut egui_renderer) = self.egui_renderer.take() else {
            return;
        };

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [context.config.width, context.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&context.device, &context.queue, *id, image_delta);
        }

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Egui Encoder"),
            });
        egui_renderer.update_buffers(
            &context.device,
            &context.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        context.queue.submit(Some(encoder.finish()));

        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
        self.egui_renderer = Some(egui_renderer);
    }

    fn draw_ui(&mut self, ctx: &egui::Context) {
        let action = panels::toolbar(
            ctx,
            self.mode,
            &self.model,
            self.layout_path.is_some(),
            &self.status_line,
        );
        match action {
            ToolbarAction::None => {}
            ToolbarAction::SetMode(mode) => self.set_mode(mode),
            ToolbarAction::Save => self.save(),
            ToolbarAction::Reload => self.reload(),
        }

        match self.mode {
            ViewerMode::Edit => {
                let selected = self.editor.selected();
                panels::palette(
                    ctx,
                    &mut self.pending_kind,
                    &mut self.editor.config,
                    &mut self.model,
                    selected,
                );
                egui::CentralPanel::default()
                    .frame(egui::Frame::none())
                    .show(ctx, |ui| {
                        plan_view::show(
                            ui,
                            &mut self.model,
                            &mut self.editor,
                            &mut self.pending_kind,
                        );
                    });
            }
            ViewerMode::Visualize => {
                if let Some(renderer) = self.scene_renderer.as_mut() {
                    let config_changed = panels::scene_panel(
                        ctx,
                        &self.model,
                        renderer.hovered(),
                        self.last_intent,
                        &mut renderer.config,
                    );
                    if config_changed {
                        self.model_dirty.set(true);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotline_model::{Element, ElementKind};

    #[test]
    fn test_model_mutations_mark_scene_dirty() {
        let mut app = ViewerApp::new(LotModel::new(), None);
        app.model_dirty.set(false);

        app.model.add(Element::new(ElementKind::spot(), 100.0, 100.0));
        assert!(app.model_dirty.get());
    }

    #[test]
    fn test_adopted_model_starts_dirty_and_unselected() {
        let mut model = LotModel::new();
        model.add(Element::new(ElementKind::spot(), 0.0, 0.0));

        let app = ViewerApp::new(model, None);
        assert!(app.model_dirty.get());
        assert!(app.editor.selected().is_none());
        assert_eq!(app.model.total_spots(), 1);
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            eprintln!("Failed to initialize viewer: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Editor shortcuts run ahead of egui so the panels cannot swallow
        // arrow keys or delete while an element is selected.
        if let WindowEvent::KeyboardInput {
            event: key_event, ..
        } = &event
        {
            if key_event.state == ElementState::Pressed
                && !self.egui_ctx.wants_keyboard_input()
                && self.handle_key(event_loop, key_event)
            {
                return;
            }
        }

        if let (Some(window), Some(egui_winit)) = (self.window.as_ref(), self.egui_winit.as_mut())
        {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.stop();
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if self.mode == ViewerMode::Visualize {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                    };
                    self.camera.zoom(lines * self.camera.distance * 0.1);
                }
            }
            WindowEvent::RedrawRequested => self.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
