//! The lot model: ordered element storage with change notification

use crate::element::{Element, ElementKind, SpotStatus};
use lotline_core::{compute_bounds, Bounds, ElementId, DEFAULT_LAYOUT_HEIGHT, DEFAULT_LAYOUT_WIDTH};

/// A change that happened to the model. Observers receive exactly one
/// event per successful mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelEvent {
    Added(ElementId),
    Removed(ElementId),
    Moved(ElementId),
    Resized(ElementId),
    Rotated(ElementId),
    StatusChanged(ElementId),
    FlagToggled(ElementId),
}

/// The boolean markers a street carries at its ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreetFlag {
    Entrance,
    Exit,
}

type Observer = Box<dyn Fn(&ModelEvent)>;

/// The full set of placeable elements plus the layout canvas dimensions.
///
/// Elements keep insertion order, which is also draw order in the plan
/// view. All mutations go through the methods here so observers stay in
/// sync; a mutation naming an id that is no longer present does nothing
/// and notifies nobody.
pub struct LotModel {
    elements: Vec<Element>,
    observers: Vec<Observer>,
    pub layout_width: f32,
    pub layout_height: f32,
    pub background_color: String,
}

impl Default for LotModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LotModel {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            observers: Vec::new(),
            layout_width: DEFAULT_LAYOUT_WIDTH,
            layout_height: DEFAULT_LAYOUT_HEIGHT,
            background_color: "#cccccc".to_string(),
        }
    }

    /// Register a change observer. Observers are called synchronously,
    /// after the mutation has been applied.
    pub fn subscribe(&mut self, observer: impl Fn(&ModelEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self, event: ModelEvent) {
        for obs in &self.observers {
            obs(&event);
        }
    }

    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        self.notify(ModelEvent::Added(id));
        id
    }

    pub fn remove(&mut self, id: ElementId) {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() != before {
            self.notify(ModelEvent::Removed(id));
        }
    }

    pub fn move_to(&mut self, id: ElementId, x: f32, y: f32) {
        if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
            e.x = x;
            e.y = y;
            self.notify(ModelEvent::Moved(id));
        }
    }

    pub fn resize_to(&mut self, id: ElementId, width: f32, height: f32) {
        if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
            e.width = width;
            e.height = height;
            self.notify(ModelEvent::Resized(id));
        }
    }

    pub fn rotate_to(&mut self, id: ElementId, rotation: f32) {
        if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
            e.rotation = rotation;
            self.notify(ModelEvent::Rotated(id));
        }
    }

    /// Set a spot's occupancy status. No-op for non-spot elements.
    pub fn set_status(&mut self, id: ElementId, status: SpotStatus) {
        if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
            if let ElementKind::Spot { status: s } = &mut e.kind {
                *s = status;
                self.notify(ModelEvent::StatusChanged(id));
            }
        }
    }

    /// Flip an entrance/exit marker. No-op for non-street elements.
    pub fn toggle_flag(&mut self, id: ElementId, flag: StreetFlag) {
        if let Some(e) = self.elements.iter_mut().find(|e| e.id == id) {
            if let ElementKind::Street {
                has_entrance,
                has_exit,
            } = &mut e.kind
            {
                match flag {
                    StreetFlag::Entrance => *has_entrance = !*has_entrance,
                    StreetFlag::Exit => *has_exit = !*has_exit,
                }
                self.notify(ModelEvent::FlagToggled(id));
            }
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn total_spots(&self) -> usize {
        self.elements.iter().filter(|e| e.is_spot()).count()
    }

    pub fn available_spots(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| e.status() == Some(SpotStatus::Available))
            .count()
    }

    /// Framing bounds of the whole lot, falling back to the layout
    /// rectangle when empty.
    pub fn bounds(&self) -> Bounds {
        compute_bounds(
            self.elements.iter().map(|e| e.footprint()),
            self.layout_width,
            self.layout_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded_events(model: &mut LotModel) -> Rc<RefCell<Vec<ModelEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        model.subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    #[test]
    fn test_one_event_per_mutation() {
        let mut model = LotModel::new();
        let events = recorded_events(&mut model);

        let id = model.add(Element::new(ElementKind::spot(), 100.0, 100.0));
        model.move_to(id, 150.0, 100.0);
        model.resize_to(id, 70.0, 130.0);
        model.set_status(id, SpotStatus::Occupied);
        model.remove(id);

        let events = events.borrow();
        assert_eq!(
            *events,
            vec![
                ModelEvent::Added(id),
                ModelEvent::Moved(id),
                ModelEvent::Resized(id),
                ModelEvent::StatusChanged(id),
                ModelEvent::Removed(id),
            ]
        );
    }

    #[test]
    fn test_missing_id_is_silent() {
        let mut model = LotModel::new();
        let id = model.add(Element::new(ElementKind::spot(), 0.0, 0.0));
        model.remove(id);

        let events = recorded_events(&mut model);
        model.move_to(id, 10.0, 10.0);
        model.resize_to(id, 100.0, 100.0);
        model.rotate_to(id, 1.0);
        model.set_status(id, SpotStatus::Reserved);
        model.remove(id);

        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_status_ignored_on_streets() {
        let mut model = LotModel::new();
        let id = model.add(Element::new(ElementKind::street(), 0.0, 0.0));

        let events = recorded_events(&mut model);
        model.set_status(id, SpotStatus::Occupied);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_toggle_flag_flips_street_markers() {
        let mut model = LotModel::new();
        let id = model.add(Element::new(ElementKind::street(), 0.0, 0.0));

        let events = recorded_events(&mut model);
        model.toggle_flag(id, StreetFlag::Entrance);
        model.toggle_flag(id, StreetFlag::Exit);
        model.toggle_flag(id, StreetFlag::Exit);

        assert!(matches!(
            model.get(id).unwrap().kind,
            ElementKind::Street {
                has_entrance: true,
                has_exit: false
            }
        ));
        assert_eq!(
            *events.borrow(),
            vec![
                ModelEvent::FlagToggled(id),
                ModelEvent::FlagToggled(id),
                ModelEvent::FlagToggled(id),
            ]
        );
    }

    #[test]
    fn test_toggle_flag_ignored_off_streets() {
        let mut model = LotModel::new();
        let spot = model.add(Element::new(ElementKind::spot(), 0.0, 0.0));
        let gone = model.add(Element::new(ElementKind::street(), 0.0, 0.0));
        model.remove(gone);

        let events = recorded_events(&mut model);
        model.toggle_flag(spot, StreetFlag::Entrance);
        model.toggle_flag(gone, StreetFlag::Exit);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_spot_counters() {
        let mut model = LotModel::new();
        let a = model.add(Element::new(ElementKind::spot(), 0.0, 0.0));
        model.add(Element::new(ElementKind::spot(), 100.0, 0.0));
        model.add(Element::new(ElementKind::street(), 0.0, 300.0));

        assert_eq!(model.total_spots(), 2);
        assert_eq!(model.available_spots(), 2);

        model.set_status(a, SpotStatus::Occupied);
        assert_eq!(model.available_spots(), 1);
    }

    #[test]
    fn test_empty_model_bounds_fall_back() {
        let model = LotModel::new();
        let b = model.bounds();
        assert_eq!(b.min.to_array(), [0.0, 0.0]);
        assert_eq!(b.max.to_array(), [1000.0, 800.0]);
    }
}
