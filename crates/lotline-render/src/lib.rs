//! Lotline Render - wgpu 3D projection renderer
//!
//! Projects the 2D lot layout into a 3D scene: ground plane and grid,
//! status-colored spot slabs with wireframe borders, street slabs with
//! center lines and entrance/exit markers, an auto-framing orbit camera,
//! and ray picking for hover highlights and reservation clicks.

mod camera;
mod context;
mod picking;
mod pipeline;
mod primitives;
mod scene;

pub use camera::{Camera, FRAMING_FOV};
pub use context::{RenderContext, RenderError};
pub use picking::{build_pick_targets, pick_spot, Aabb, PickTarget, Ray};
pub use pipeline::{LightUniforms, MaterialUniforms, RenderPipeline, TransformUniforms};
pub use primitives::{
    create_box_mesh, create_grid_mesh, create_marker_mesh, create_plane_mesh,
    create_wireframe_box_mesh, Mesh, Vertex,
};
pub use scene::{
    status_color, LotSceneRenderer, RendererConfig, ReservationIntent, SPOT_HEIGHT, SPOT_Y,
    STREET_HEIGHT, STREET_Y,
};

#[cfg(test)]
mod tests {
    #[test]
    fn test_shader_parses() {
        let source = include_str!("shader.wgsl");
        let result = naga::front::wgsl::parse_str(source);
        assert!(result.is_ok(), "shader.wgsl failed to parse: {:?}", result.err());
    }
}
