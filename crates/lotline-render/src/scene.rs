//! Scene renderer: turns the lot model into draw calls and handles
//! hover/click picking over the rendered spots.

use crate::camera::Camera;
use crate::context::RenderContext;
use crate::picking::{build_pick_targets, pick_spot, PickTarget};
use crate::pipeline::{LightUniforms, MaterialUniforms, RenderPipeline, TransformUniforms};
use crate::primitives::{
    create_box_mesh, create_grid_mesh, create_marker_mesh, create_plane_mesh,
    create_wireframe_box_mesh, Mesh,
};
use lotline_core::{Color, ElementId, Vec2};
use lotline_model::{ElementKind, LotModel, SignKind, SpotStatus};
use wgpu::util::DeviceExt;

/// Spot slab height; the slab is centered at [`SPOT_Y`] so it rests on the ground
pub const SPOT_HEIGHT: f32 = 3.0;
pub const SPOT_Y: f32 = 1.5;

/// Street slabs sit slightly sunk so spots read above them
pub const STREET_HEIGHT: f32 = 5.0;
pub const STREET_Y: f32 = 1.0;

/// Spot border wireframes hover just above the slab top
const BORDER_Y: f32 = 1.0;
const BORDER_MARGIN: f32 = 2.0;

/// Street center line: a thin white strip at y 2, inset from the ends
const CENTER_LINE_Y: f32 = 2.0;
const CENTER_LINE_WIDTH: f32 = 2.0;
const CENTER_LINE_INSET: f32 = 10.0;

/// Entrance/exit markers at street ends
const MARKER_RADIUS: f32 = 8.0;
const MARKER_HEIGHT: f32 = 12.0;
const MARKER_END_INSET: f32 = 10.0;

const LIGHT_HEIGHT: f32 = 300.0;
const GRID_DIVISIONS: u32 = 30;

/// Status palette for spot slabs
pub fn status_color(status: Option<SpotStatus>) -> Color {
    match status {
        Some(SpotStatus::Available) => Color::from_hex(0x2ecc71),
        Some(SpotStatus::Occupied) => Color::from_hex(0xe74c3c),
        Some(SpotStatus::Reserved) => Color::from_hex(0xf39c12),
        None => Color::from_hex(0x95a5a6),
    }
}

fn sign_color(sign: SignKind) -> Color {
    match sign {
        SignKind::Stop => Color::from_hex(0xe74c3c),
        SignKind::Yield => Color::from_hex(0xf1c40f),
        SignKind::OneWay => Color::from_hex(0x3498db),
        SignKind::NoParking => Color::from_hex(0xe67e22),
    }
}

const HOVER_COLOR: u32 = 0xffff00;
const GROUND_COLOR: u32 = 0x333333;
const GRID_COLOR: u32 = 0x555555;
const STREET_COLOR: u32 = 0x444444;
const VEHICLE_COLOR: u32 = 0x2c3e50;
const ENTRANCE_COLOR: u32 = 0x3498db;
const EXIT_COLOR: u32 = 0xe74c3c;

/// A click on a rendered spot, surfaced to the application. Carries the
/// status the spot had at the moment of the click so the consumer can
/// decide what the intent means.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReservationIntent {
    pub spot_id: ElementId,
    pub previous_status: SpotStatus,
}

/// Renderer options
#[derive(Clone, Copy, Debug)]
pub struct RendererConfig {
    pub show_grid: bool,
    pub show_ground: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_ground: true,
        }
    }
}

enum DrawKind {
    Solid,
    Line,
    OverlayLine,
}

/// Per-mesh GPU state
struct DrawCall {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    material_buffer: wgpu::Buffer,
    material_bind_group: wgpu::BindGroup,
    material: MaterialUniforms,
    model: [[f32; 4]; 4],
    spot_id: Option<ElementId>,
    kind: DrawKind,
}

/// Renders the lot scene and owns the hover/reservation picking state.
///
/// `sync_model` rebuilds the draw list from the current model; `render`
/// only writes uniforms and records the pass, so resizes and camera moves
/// never rebuild the scene.
pub struct LotSceneRenderer {
    pipeline: RenderPipeline,
    pub config: RendererConfig,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    draws: Vec<DrawCall>,
    pick_targets: Vec<PickTarget>,
    hovered: Option<ElementId>,
    intents: Vec<ReservationIntent>,
}

impl LotSceneRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: RendererConfig) -> Self {
        let pipeline = RenderPipeline::new(device, format);

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniforms::default_lot_lights()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Light Bind Group"),
            layout: &pipeline.light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            config,
            light_buffer,
            light_bind_group,
            draws: Vec::new(),
            pick_targets: Vec::new(),
            hovered: None,
            intents: Vec::new(),
        }
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Take the reservation intents accumulated since the last drain.
    pub fn drain_intents(&mut self) -> Vec<ReservationIntent> {
        std::mem::take(&mut self.intents)
    }

    /// Rebuild the draw list and pick targets from the model.
    pub fn sync_model(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, model: &LotModel) {
        let bounds = model.bounds();
        let center = bounds.center();
        let size = bounds.size();

        self.draws.clear();

        // Ambient plus one directional light high above the lot center
        let lights = LightUniforms::default_lot_lights().aimed_from(
            [center.x, LIGHT_HEIGHT, center.y],
            [center.x, 0.0, center.y],
        );
        queue.write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[lights]));

        if self.config.show_ground {
            let ground = create_plane_mesh(size * 2.0, size * 2.0, color4(GROUND_COLOR));
            self.push_draw(
                device,
                &ground,
                translation(center, -0.05),
                MaterialUniforms::vertex_colored(),
                None,
                DrawKind::Solid,
            );
        }

        if self.config.show_grid {
            let grid = create_grid_mesh(size * 2.0, GRID_DIVISIONS, color4(GRID_COLOR));
            self.push_draw(
                device,
                &grid,
                translation(center, 0.1),
                MaterialUniforms::unlit(),
                None,
                DrawKind::Line,
            );
        }

        for e in model.iter() {
            let pos = e.center();
            match e.kind {
                ElementKind::Spot { status } => {
                    let slab = create_box_mesh(
                        e.width,
                        SPOT_HEIGHT,
                        e.height,
                        status_color(Some(status)).to_array(),
                    );
                    self.push_draw(
                        device,
                        &slab,
                        model_matrix(pos, SPOT_Y, e.rotation),
                        MaterialUniforms::vertex_colored(),
                        Some(e.id),
                        DrawKind::Solid,
                    );

                    let border = create_wireframe_box_mesh(
                        e.width + BORDER_MARGIN,
                        2.0,
                        e.height + BORDER_MARGIN,
                        Color::WHITE.to_array(),
                    );
                    self.push_draw(
                        device,
                        &border,
                        model_matrix(pos, BORDER_Y, e.rotation),
                        MaterialUniforms::unlit(),
                        None,
                        DrawKind::OverlayLine,
                    );
                }
                ElementKind::Street {
                    has_entrance,
                    has_exit,
                } => {
                    let slab =
                        create_box_mesh(e.width, STREET_HEIGHT, e.height, color4(STREET_COLOR));
                    self.push_draw(
                        device,
                        &slab,
                        model_matrix(pos, STREET_Y, e.rotation),
                        MaterialUniforms::vertex_colored(),
                        None,
                        DrawKind::Solid,
                    );

                    let line_length = (e.height - CENTER_LINE_INSET).max(0.0);
                    if line_length > 0.0 {
                        let line = create_box_mesh(
                            CENTER_LINE_WIDTH,
                            0.2,
                            line_length,
                            Color::WHITE.to_array(),
                        );
                        self.push_draw(
                            device,
                            &line,
                            model_matrix(pos, CENTER_LINE_Y, e.rotation),
                            MaterialUniforms::unlit(),
                            None,
                            DrawKind::Solid,
                        );
                    }

                    let end_offset = e.height / 2.0 - MARKER_END_INSET;
                    if has_entrance {
                        self.push_street_marker(device, e, -end_offset, ENTRANCE_COLOR);
                    }
                    if has_exit {
                        self.push_street_marker(device, e, end_offset, EXIT_COLOR);
                    }
                }
                ElementKind::Sign { sign } => {
                    let post = create_box_mesh(e.width, 20.0, e.height, sign_color(sign).to_array());
                    self.push_draw(
                        device,
                        &post,
                        model_matrix(pos, 10.0, e.rotation),
                        MaterialUniforms::vertex_colored(),
                        None,
                        DrawKind::Solid,
                    );
                }
                ElementKind::Vehicle => {
                    let body = create_box_mesh(e.width, 10.0, e.height, color4(VEHICLE_COLOR));
                    self.push_draw(
                        device,
                        &body,
                        model_matrix(pos, 5.0, e.rotation),
                        MaterialUniforms::vertex_colored(),
                        None,
                        DrawKind::Solid,
                    );
                }
            }
        }

        self.pick_targets = build_pick_targets(model);

        // Drop the hover if its spot went away
        if let Some(id) = self.hovered {
            if !self.pick_targets.iter().any(|t| t.spot_id == id) {
                self.hovered = None;
            }
        }
    }

    fn push_street_marker(
        &mut self,
        device: &wgpu::Device,
        e: &lotline_model::Element,
        offset: f32,
        color: u32,
    ) {
        // Walk along the street's long axis to the end inset
        let (sin, cos) = e.rotation.sin_cos();
        let pos = Vec2::new(e.x - sin * offset, e.y + cos * offset);
        let marker = create_marker_mesh(MARKER_RADIUS, MARKER_HEIGHT, 12, color4(color));
        self.push_draw(
            device,
            &marker,
            translation(pos, 0.0),
            MaterialUniforms::vertex_colored(),
            None,
            DrawKind::Solid,
        );
    }

    fn push_draw(
        &mut self,
        device: &wgpu::Device,
        mesh: &Mesh,
        model: [[f32; 4]; 4],
        material: MaterialUniforms,
        spot_id: Option<ElementId>,
        kind: DrawKind,
    ) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&[TransformUniforms::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: &self.pipeline.transform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[material]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.pipeline.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        self.draws.push(DrawCall {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            transform_buffer,
            transform_bind_group,
            material_buffer,
            material_bind_group,
            material,
            model,
            spot_id,
            kind,
        });
    }

    /// Update the hovered spot from the cursor position.
    pub fn update_hover(
        &mut self,
        screen_x: f32,
        screen_y: f32,
        viewport_width: f32,
        viewport_height: f32,
        camera: &Camera,
    ) {
        self.hovered = pick_spot(
            screen_x,
            screen_y,
            viewport_width,
            viewport_height,
            camera,
            &self.pick_targets,
        )
        .map(|(id, _)| id);
    }

    /// A click: if it lands on a spot, record exactly one reservation
    /// intent carrying the spot's status at click time.
    pub fn click(
        &mut self,
        model: &LotModel,
        screen_x: f32,
        screen_y: f32,
        viewport_width: f32,
        viewport_height: f32,
        camera: &Camera,
    ) -> Option<ReservationIntent> {
        let (spot_id, _) = pick_spot(
            screen_x,
            screen_y,
            viewport_width,
            viewport_height,
            camera,
            &self.pick_targets,
        )?;
        let previous_status = model.get(spot_id)?.status()?;
        let intent = ReservationIntent {
            spot_id,
            previous_status,
        };
        self.intents.push(intent);
        Some(intent)
    }

    /// Record the scene into a render pass on the given target.
    pub fn render(&self, ctx: &RenderContext, target_view: &wgpu::TextureView, camera: &Camera) {
        let view_proj = camera.view_projection_matrix();
        let camera_pos = camera.position_array();

        for draw in &self.draws {
            let uniforms = TransformUniforms {
                view_proj,
                model: draw.model,
                camera_pos,
                _pad: 0.0,
            };
            ctx.queue
                .write_buffer(&draw.transform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

            let material = if draw.spot_id.is_some() && draw.spot_id == self.hovered {
                draw.material.with_tint(color4(HOVER_COLOR))
            } else {
                draw.material
            };
            ctx.queue
                .write_buffer(&draw.material_buffer, 0, bytemuck::cast_slice(&[material]));
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Lot Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lot Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
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
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Lights are shared by every draw (group 2)
            render_pass.set_bind_group(2, &self.light_bind_group, &[]);

            render_pass.set_pipeline(&self.pipeline.pipeline);
            for draw in self.draws.iter().filter(|d| matches!(d.kind, DrawKind::Solid)) {
                draw_one(&mut render_pass, draw);
            }

            render_pass.set_pipeline(&self.pipeline.line_pipeline);
            for draw in self.draws.iter().filter(|d| matches!(d.kind, DrawKind::Line)) {
                draw_one(&mut render_pass, draw);
            }

            // Borders last so the depth bias keeps them visible on the slabs
            render_pass.set_pipeline(&self.pipeline.overlay_line_pipeline);
            for draw in self
                .draws
                .iter()
                .filter(|d| matches!(d.kind, DrawKind::OverlayLine))
            {
                draw_one(&mut render_pass, draw);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn draw_one<'a>(render_pass: &mut wgpu::RenderPass<'a>, draw: &'a DrawCall) {
    render_pass.set_bind_group(0, &draw.transform_bind_group, &[]);
    render_pass.set_bind_group(1, &draw.material_bind_group, &[]);
    render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
    render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
}

fn color4(hex: u32) -> [f32; 4] {
    Color::from_hex(hex).to_array()
}

/// Rotation about the world Y axis plus translation; the plane point
/// (x, y) lands at world (x, height, y).
fn model_matrix(pos: Vec2, height: f32, rotation: f32) -> [[f32; 4]; 4] {
    let (sin, cos) = rotation.sin_cos();
    [
        [cos, 0.0, sin, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-sin, 0.0, cos, 0.0],
        [pos.x, height, pos.y, 1.0],
    ]
}

fn translation(pos: Vec2, height: f32) -> [[f32; 4]; 4] {
    model_matrix(pos, height, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_palette() {
        assert_eq!(
            status_color(Some(SpotStatus::Available)),
            Color::from_hex(0x2ecc71)
        );
        assert_eq!(
            status_color(Some(SpotStatus::Occupied)),
            Color::from_hex(0xe74c3c)
        );
        assert_eq!(
            status_color(Some(SpotStatus::Reserved)),
            Color::from_hex(0xf39c12)
        );
        assert_eq!(status_color(None), Color::from_hex(0x95a5a6));
    }

    #[test]
    fn test_model_matrix_maps_plane_to_world() {
        let m = model_matrix(Vec2::new(100.0, 200.0), 1.5, 0.0);
        assert_eq!(m[3], [100.0, 1.5, 200.0, 1.0]);

        // Quarter turn sends the local long axis onto world x
        let m = model_matrix(Vec2::ZERO, 0.0, std::f32::consts::FRAC_PI_2);
        // local (0, 0, 10) → world (-10, 0, ~0)
        let x = m[0][0] * 0.0 + m[2][0] * 10.0;
        let z = m[0][2] * 0.0 + m[2][2] * 10.0;
        assert!((x - -10.0).abs() < 1e-4);
        assert!(z.abs() < 1e-4);
    }

    #[test]
    fn test_hover_tint_material() {
        let m = MaterialUniforms::vertex_colored().with_tint(color4(HOVER_COLOR));
        assert_eq!(m.use_tint, 1);
        assert!((m.tint[0] - 1.0).abs() < 1e-6);
        assert!((m.tint[1] - 1.0).abs() < 1e-6);
        assert!(m.tint[2].abs() < 1e-6);
    }
}
