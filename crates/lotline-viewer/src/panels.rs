//! egui panels: toolbar, element palette, and 3D scene info

use crate::app::ViewerMode;
use lotline_core::ElementId;
use lotline_editor::EditorConfig;
use lotline_model::{Element, ElementKind, LotModel, SignKind, SpotStatus, StreetFlag};
use lotline_render::{RendererConfig, ReservationIntent};

pub enum ToolbarAction {
    None,
    SetMode(ViewerMode),
    Save,
    Reload,
}

pub fn toolbar(
    ctx: &egui::Context,
    mode: ViewerMode,
    model: &LotModel,
    can_reload: bool,
    status_line: &str,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("Lotline");
            ui.separator();

            if ui
                .selectable_label(mode == ViewerMode::Edit, "Plan editor")
                .clicked()
            {
                action = ToolbarAction::SetMode(ViewerMode::Edit);
            }
            if ui
                .selectable_label(mode == ViewerMode::Visualize, "3D preview")
                .clicked()
            {
                action = ToolbarAction::SetMode(ViewerMode::Visualize);
            }
            ui.separator();

            if ui.button("Save").clicked() {
                action = ToolbarAction::Save;
            }
            if can_reload && ui.button("Reload").clicked() {
                action = ToolbarAction::Reload;
            }
            ui.separator();

            ui.label(format!(
                "{} spots, {} available",
                model.total_spots(),
                model.available_spots()
            ));

            if !status_line.is_empty() {
                ui.separator();
                ui.weak(status_line);
            }
        });
    });

    action
}

/// Left panel in edit mode: element palette, grid settings, and details
/// for the selected element.
pub fn palette(
    ctx: &egui::Context,
    pending: &mut Option<ElementKind>,
    config: &mut EditorConfig,
    model: &mut LotModel,
    selected: Option<ElementId>,
) {
    egui::SidePanel::left("palette")
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Palette");
            ui.label("Pick a kind, then click the plan to place it.");
            ui.add_space(4.0);

            palette_button(ui, pending, "Parking spot", ElementKind::spot());
            palette_button(ui, pending, "Street", ElementKind::street());
            palette_button(ui, pending, "Stop sign", ElementKind::sign(SignKind::Stop));
            palette_button(ui, pending, "Yield sign", ElementKind::sign(SignKind::Yield));
            palette_button(ui, pending, "One-way sign", ElementKind::sign(SignKind::OneWay));
            palette_button(
                ui,
                pending,
                "No-parking sign",
                ElementKind::sign(SignKind::NoParking),
            );
            palette_button(ui, pending, "Vehicle", ElementKind::Vehicle);

            if pending.is_some() && ui.button("Cancel placement").clicked() {
                *pending = None;
            }

            ui.separator();
            ui.checkbox(&mut config.snap_enabled, "Snap to grid");
            ui.add(egui::Slider::new(&mut config.grid_size, 10.0..=200.0).text("Grid size"));

            ui.separator();
            match selected.and_then(|id| model.get(id).copied()) {
                Some(element) => selected_details(ui, model, element),
                None => {
                    ui.weak("Nothing selected");
                }
            }
        });
}

fn palette_button(
    ui: &mut egui::Ui,
    pending: &mut Option<ElementKind>,
    label: &str,
    kind: ElementKind,
) {
    let armed = matches!(pending, Some(p) if *p == kind);
    if ui.selectable_label(armed, label).clicked() {
        *pending = Some(kind);
    }
}

fn selected_details(ui: &mut egui::Ui, model: &mut LotModel, element: Element) {
    ui.heading("Selected");
    ui.label(kind_name(&element.kind));
    ui.monospace(format!("id {}", element.id));
    ui.label(format!("at ({:.0}, {:.0})", element.x, element.y));
    ui.label(format!(
        "{:.0} x {:.0}, {:.0}°",
        element.width,
        element.height,
        element.rotation.to_degrees()
    ));

    if let ElementKind::Street {
        has_entrance,
        has_exit,
    } = element.kind
    {
        ui.add_space(4.0);
        ui.label("Markers");
        let mut entrance = has_entrance;
        if ui.checkbox(&mut entrance, "Entrance").changed() {
            model.toggle_flag(element.id, StreetFlag::Entrance);
        }
        let mut exit = has_exit;
        if ui.checkbox(&mut exit, "Exit").changed() {
            model.toggle_flag(element.id, StreetFlag::Exit);
        }
    }

    if let Some(status) = element.status() {
        ui.add_space(4.0);
        ui.label("Status");
        ui.horizontal(|ui| {
            for (label, value) in [
                ("Available", SpotStatus::Available),
                ("Occupied", SpotStatus::Occupied),
                ("Reserved", SpotStatus::Reserved),
            ] {
                if ui.selectable_label(status == value, label).clicked() {
                    model.set_status(element.id, value);
                }
            }
        });
    }
}

fn kind_name(kind: &ElementKind) -> &'static str {
    match kind {
        ElementKind::Spot { .. } => "Parking spot",
        ElementKind::Street { .. } => "Street",
        ElementKind::Sign { sign: SignKind::Stop } => "Stop sign",
        ElementKind::Sign { sign: SignKind::Yield } => "Yield sign",
        ElementKind::Sign { sign: SignKind::OneWay } => "One-way sign",
        ElementKind::Sign { sign: SignKind::NoParking } => "No-parking sign",
        ElementKind::Vehicle => "Vehicle",
    }
}

/// Right panel in 3D preview mode. Returns true when a renderer config
/// toggle changed and the scene needs a resync.
pub fn scene_panel(
    ctx: &egui::Context,
    model: &LotModel,
    hovered: Option<ElementId>,
    last_intent: Option<ReservationIntent>,
    config: &mut RendererConfig,
) -> bool {
    let mut changed = false;

    egui::SidePanel::right("scene_panel")
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Scene");
            changed |= ui.checkbox(&mut config.show_ground, "Ground plane").changed();
            changed |= ui.checkbox(&mut config.show_grid, "Grid").changed();

            ui.separator();
            ui.label("Hovered spot");
            match hovered.and_then(|id| model.get(id)) {
                Some(spot) => {
                    ui.monospace(format!("id {}", spot.id));
                    if let Some(status) = spot.status() {
                        ui.label(format!("{:?}", status));
                    }
                }
                None => {
                    ui.weak("none");
                }
            }

            ui.separator();
            ui.label("Last reservation request");
            match last_intent {
                Some(intent) => {
                    ui.monospace(format!("spot {}", intent.spot_id));
                    ui.label(format!("was {:?}", intent.previous_status));
                }
                None => {
                    ui.weak("none");
                }
            }

            ui.separator();
            ui.weak("Drag to orbit, right-drag to pan,");
            ui.weak("scroll to zoom, click a spot to reserve.");
        });

    changed
}
