use std::collections::HashMap;

use stagehand_core::scene::EntityId;

use crate::mode::GizmoMode;

/// Gizmo setup failures. All of them are fatal: the gizmo cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GizmoError {
    #[error("gizmo prefab must have exactly one root entity, found {0}")]
    RootCount(usize),
    #[error("gizmo prefab has no part named {0}")]
    MissingPart(&'static str),
    #[error("gizmo parts {first} and {second} share entity {entity}")]
    SharedPart {
        first: GizmoMode,
        second: GizmoMode,
        entity: EntityId,
    },
}

/// Entities produced by instantiating the gizmo prefab in the host scene.
#[derive(Debug, Clone, Default)]
pub struct PrefabInstance {
    pub roots: Vec<EntityId>,
    /// Descendants of the root, by entity name.
    pub children: HashMap<String, EntityId>,
}

impl PrefabInstance {
    pub fn new(roots: Vec<EntityId>) -> Self {
        Self {
            roots,
            children: HashMap::new(),
        }
    }

    pub fn with_child(mut self, name: impl Into<String>, entity: EntityId) -> Self {
        self.children.insert(name.into(), entity);
        self
    }

    pub fn find_child(&self, name: &str) -> Option<EntityId> {
        self.children.get(name).copied()
    }
}

/// Binding between the gizmo's scene entities and manipulation modes.
#[derive(Debug, Clone)]
pub struct GizmoRig {
    root: EntityId,
    parts: HashMap<GizmoMode, EntityId>,
    modes: HashMap<EntityId, GizmoMode>,
}

impl GizmoRig {
    /// Bind an instantiated prefab. It must have a single root and one
    /// child per entry of [`GizmoMode::PARTS`].
    pub fn from_prefab(prefab: &PrefabInstance) -> Result<Self, GizmoError> {
        let &[root] = prefab.roots.as_slice() else {
            return Err(GizmoError::RootCount(prefab.roots.len()));
        };

        let mut parts = HashMap::with_capacity(GizmoMode::PARTS.len());
        let mut modes = HashMap::with_capacity(GizmoMode::PARTS.len());
        for mode in GizmoMode::PARTS {
            let Some(name) = mode.part_name() else {
                continue;
            };
            let entity = prefab
                .find_child(name)
                .ok_or(GizmoError::MissingPart(name))?;
            if let Some(&first) = modes.get(&entity) {
                return Err(GizmoError::SharedPart {
                    first,
                    second: mode,
                    entity,
                });
            }
            parts.insert(mode, entity);
            modes.insert(entity, mode);
        }

        log::debug!("Gizmo rig bound to root {root} with {} parts", parts.len());
        Ok(Self { root, parts, modes })
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Entity of the part activating `mode`.
    pub fn part(&self, mode: GizmoMode) -> Option<EntityId> {
        self.parts.get(&mode).copied()
    }

    /// Mode activated by `entity`, or [`GizmoMode::None`] for anything that
    /// is not a gizmo part.
    pub fn mode_for(&self, entity: Option<EntityId>) -> GizmoMode {
        entity
            .and_then(|e| self.modes.get(&e).copied())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_prefab() -> PrefabInstance {
        GizmoMode::PARTS
            .iter()
            .enumerate()
            .fold(PrefabInstance::new(vec![EntityId(100)]), |prefab, (i, mode)| {
                prefab.with_child(mode.part_name().unwrap(), EntityId(i as u64 + 1))
            })
    }

    #[test]
    fn binds_every_part() {
        let rig = GizmoRig::from_prefab(&full_prefab()).unwrap();
        assert_eq!(rig.root(), EntityId(100));
        for mode in GizmoMode::PARTS {
            let entity = rig.part(mode).unwrap();
            assert_eq!(rig.mode_for(Some(entity)), mode);
        }
        assert_eq!(rig.mode_for(Some(EntityId(100))), GizmoMode::None);
        assert_eq!(rig.mode_for(None), GizmoMode::None);
    }

    #[test]
    fn rejects_several_roots() {
        let mut prefab = full_prefab();
        prefab.roots.push(EntityId(101));
        assert_eq!(
            GizmoRig::from_prefab(&prefab).unwrap_err(),
            GizmoError::RootCount(2)
        );
    }

    #[test]
    fn rejects_missing_root() {
        let mut prefab = full_prefab();
        prefab.roots.clear();
        assert_eq!(
            GizmoRig::from_prefab(&prefab).unwrap_err(),
            GizmoError::RootCount(0)
        );
    }

    #[test]
    fn rejects_missing_part() {
        let mut prefab = full_prefab();
        prefab.children.remove("RotationC");
        assert_eq!(
            GizmoRig::from_prefab(&prefab).unwrap_err(),
            GizmoError::MissingPart("RotationC")
        );
    }

    #[test]
    fn rejects_shared_part() {
        let prefab = full_prefab().with_child("TranslationY", EntityId(1));
        assert!(matches!(
            GizmoRig::from_prefab(&prefab),
            Err(GizmoError::SharedPart {
                first: GizmoMode::TranslationX,
                second: GizmoMode::TranslationY,
                ..
            })
        ));
    }
}
