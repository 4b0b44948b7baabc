//! Registry of live surface anchors.
//!
//! The registry is the single owner of anchor geometry. Events from the scan
//! source are applied in arrival order; duplicate or out-of-order events are
//! tolerated rather than rejected, since the source is only eventually
//! consistent. Readers get shared borrows or cloned snapshots, never
//! mutable access.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::classifier::{Category, classify_with_hint};
use crate::geometry::{BoundingBox, Transform, Vec3};

/// Opaque anchor identity assigned by the scan source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorId(Arc<str>);

impl AnchorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnchorId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for AnchorId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometry carried by an Added/Updated event. Absent parts are kept from
/// the previous state on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub bbox: Option<BoundingBox>,
    pub transform: Option<Transform>,
    /// The scan source's own surface label, used when geometry alone is inconclusive.
    pub surface: Option<Category>,
}

impl Geometry {
    pub fn new(bbox: BoundingBox, transform: Transform) -> Self {
        Self {
            bbox: Some(bbox),
            transform: Some(transform),
            surface: None,
        }
    }

    pub fn with_surface(mut self, surface: Category) -> Self {
        self.surface = Some(surface);
        self
    }

    fn is_empty(&self) -> bool {
        self.bbox.is_none() && self.transform.is_none() && self.surface.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryEvent {
    Added(AnchorId, Geometry),
    Updated(AnchorId, Geometry),
    Removed(AnchorId),
}

impl GeometryEvent {
    pub fn anchor_id(&self) -> &AnchorId {
        match self {
            GeometryEvent::Added(id, _)
            | GeometryEvent::Updated(id, _)
            | GeometryEvent::Removed(id) => id,
        }
    }
}

/// Display preferences derived for an anchor; consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStyle {
    pub label: &'static str,
    pub wireframe: bool,
}

#[derive(Debug, Clone)]
pub struct Anchor {
    id: AnchorId,
    bbox: Option<BoundingBox>,
    transform: Transform,
    surface: Option<Category>,
    category: Category,
    display: DisplayStyle,
}

impl Anchor {
    fn new(id: AnchorId, geometry: Geometry, wireframe: bool) -> Self {
        let mut a = Self {
            id,
            bbox: geometry.bbox,
            transform: geometry.transform.unwrap_or_default(),
            surface: geometry.surface,
            category: Category::None,
            display: DisplayStyle {
                label: Category::None.label(),
                wireframe,
            },
        };
        a.reclassify();
        a
    }

    fn replace(&mut self, geometry: Geometry) {
        if let Some(b) = geometry.bbox {
            self.bbox = Some(b);
        }
        if let Some(t) = geometry.transform {
            self.transform = t;
        }
        if geometry.surface.is_some() {
            self.surface = geometry.surface;
        }
        self.reclassify();
    }

    fn reclassify(&mut self) {
        self.category = match &self.bbox {
            Some(b) => classify_with_hint(b, self.surface),
            None => Category::None,
        };
        self.display.label = self.category.label();
    }

    pub fn id(&self) -> &AnchorId {
        &self.id
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn display(&self) -> DisplayStyle {
        self.display
    }

    /// World-space center of the bounding box, if the anchor has geometry.
    pub fn world_center(&self) -> Option<Vec3> {
        self.bbox
            .as_ref()
            .map(|b| self.transform.transform_point(b.center()))
    }

    /// Distance from `observer` to the world-space center.
    pub fn distance_from(&self, observer: Vec3) -> Option<f32> {
        self.world_center().map(|c| c.distance(observer))
    }

    pub fn volume(&self) -> f32 {
        self.bbox.as_ref().map_or(0.0, BoundingBox::volume)
    }
}

/// Read-only copy of an anchor handed to collaborators outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSnapshot {
    pub id: AnchorId,
    pub category: Category,
    pub bbox: Option<BoundingBox>,
    pub world_center: Option<Vec3>,
    pub distance_m: Option<f32>,
    pub display: DisplayStyle,
}

/// What an applied event did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryChange {
    Inserted(AnchorId),
    Replaced(AnchorId),
    Removed(AnchorId),
    Ignored,
}

#[derive(Debug, Default)]
pub struct AnchorRegistry {
    anchors: BTreeMap<AnchorId, Anchor>,
    wireframe: bool,
}

impl AnchorRegistry {
    pub fn new(wireframe: bool) -> Self {
        Self {
            anchors: BTreeMap::new(),
            wireframe,
        }
    }

    pub fn apply(&mut self, event: GeometryEvent) -> RegistryChange {
        match event {
            GeometryEvent::Added(id, geometry) => {
                if let Some(existing) = self.anchors.get_mut(&id) {
                    tracing::warn!(anchor = %id, "duplicate add; treating as update");
                    existing.replace(geometry);
                    return RegistryChange::Replaced(id);
                }
                let anchor = Anchor::new(id.clone(), geometry, self.wireframe);
                tracing::debug!(anchor = %id, category = %anchor.category, "anchor added");
                self.anchors.insert(id.clone(), anchor);
                RegistryChange::Inserted(id)
            }
            GeometryEvent::Updated(id, geometry) => {
                if geometry.is_empty() {
                    return RegistryChange::Ignored;
                }
                match self.anchors.get_mut(&id) {
                    Some(anchor) => {
                        let before = anchor.category;
                        anchor.replace(geometry);
                        if before != anchor.category {
                            tracing::debug!(
                                anchor = %id,
                                from = %before,
                                to = %anchor.category,
                                "anchor reclassified"
                            );
                        }
                        RegistryChange::Replaced(id)
                    }
                    None => {
                        tracing::debug!(anchor = %id, "update for unknown anchor ignored");
                        RegistryChange::Ignored
                    }
                }
            }
            GeometryEvent::Removed(id) => {
                if self.anchors.remove(&id).is_some() {
                    tracing::debug!(anchor = %id, "anchor removed");
                    RegistryChange::Removed(id)
                } else {
                    tracing::debug!(anchor = %id, "remove for unknown anchor ignored");
                    RegistryChange::Ignored
                }
            }
        }
    }

    /// Switch the wireframe display preference for every anchor.
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
        for a in self.anchors.values_mut() {
            a.display.wireframe = wireframe;
        }
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn get(&self, id: &AnchorId) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    pub fn contains(&self, id: &AnchorId) -> bool {
        self.anchors.contains_key(id)
    }

    /// Iterate over the live anchors in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.values()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn snapshot(&self, observer: Vec3) -> Vec<AnchorSnapshot> {
        self.anchors
            .values()
            .map(|a| AnchorSnapshot {
                id: a.id.clone(),
                category: a.category,
                bbox: a.bbox,
                world_center: a.world_center(),
                distance_m: a.distance_from(observer),
                display: a.display,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Geometry {
        Geometry::new(
            BoundingBox::from_extents(2.2, 2.1, 0.3),
            Transform::from_translation(Vec3::new(0.0, 0.0, -1.0)),
        )
    }

    #[test]
    fn add_classifies_and_exposes_anchor() {
        let mut r = AnchorRegistry::default();
        let id = AnchorId::from("w");
        assert_eq!(
            r.apply(GeometryEvent::Added(id.clone(), wall())),
            RegistryChange::Inserted(id.clone())
        );
        let a = r.get(&id).expect("anchor");
        assert_eq!(a.category(), Category::Wall);
        assert_eq!(a.display().label, "Wall");
        let c = a.world_center().expect("center");
        assert!((c.y - 1.05).abs() < 1e-6);
        assert_eq!(c.z, -1.0);
    }

    #[test]
    fn duplicate_add_replaces_geometry() {
        let mut r = AnchorRegistry::default();
        let id = AnchorId::from("a");
        r.apply(GeometryEvent::Added(id.clone(), wall()));
        let seat = Geometry::new(BoundingBox::from_extents(0.5, 0.9, 0.5), Transform::IDENTITY);
        assert_eq!(
            r.apply(GeometryEvent::Added(id.clone(), seat)),
            RegistryChange::Replaced(id.clone())
        );
        assert_eq!(r.len(), 1);
        assert_eq!(r.get(&id).map(Anchor::category), Some(Category::Seat));
    }

    #[test]
    fn update_without_bbox_keeps_previous_box() {
        let mut r = AnchorRegistry::default();
        let id = AnchorId::from("w");
        r.apply(GeometryEvent::Added(id.clone(), wall()));
        let moved = Geometry {
            transform: Some(Transform::from_translation(Vec3::new(0.0, 0.0, -3.0))),
            ..Geometry::default()
        };
        r.apply(GeometryEvent::Updated(id.clone(), moved));
        let a = r.get(&id).expect("anchor");
        assert_eq!(a.category(), Category::Wall);
        assert_eq!(a.world_center().map(|c| c.z), Some(-3.0));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut r = AnchorRegistry::default();
        let id = AnchorId::from("ghost");
        assert_eq!(
            r.apply(GeometryEvent::Updated(id.clone(), wall())),
            RegistryChange::Ignored
        );
        assert_eq!(r.apply(GeometryEvent::Removed(id)), RegistryChange::Ignored);
        assert!(r.is_empty());
    }

    #[test]
    fn add_without_geometry_is_category_none() {
        let mut r = AnchorRegistry::default();
        let id = AnchorId::from("blank");
        r.apply(GeometryEvent::Added(id.clone(), Geometry::default()));
        let a = r.get(&id).expect("anchor");
        assert_eq!(a.category(), Category::None);
        assert!(a.world_center().is_none());
    }

    #[test]
    fn wireframe_toggle_reaches_every_anchor() {
        let mut r = AnchorRegistry::new(false);
        r.apply(GeometryEvent::Added(AnchorId::from("a"), wall()));
        r.apply(GeometryEvent::Added(AnchorId::from("b"), wall()));
        r.set_wireframe(true);
        assert!(r.iter().all(|a| a.display().wireframe));
        r.apply(GeometryEvent::Added(AnchorId::from("c"), wall()));
        assert!(r.get(&AnchorId::from("c")).is_some_and(|a| a.display().wireframe));
    }

    #[test]
    fn snapshot_reports_distance_from_observer() {
        let mut r = AnchorRegistry::default();
        let g = Geometry::new(
            BoundingBox::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)),
            Transform::from_translation(Vec3::new(0.0, 0.0, -2.0)),
        );
        r.apply(GeometryEvent::Added(AnchorId::from("box"), g));
        let snap = r.snapshot(Vec3::new(0.0, 0.0, -0.5));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].distance_m, Some(1.5));
    }
}
