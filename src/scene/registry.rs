//! 刚体注册表
//!
//! 记录具名刚体及其渲染代理（严格一对一）。名称查找只在搭建阶段使用，
//! 每帧同步时按句柄遍历。

use std::collections::HashMap;

use super::visual::VisualProxy;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::{KneeError, Result};

/// 注册表条目
#[derive(Clone, Debug)]
pub struct RegistryEntry {
    pub name: String,
    pub body: BodyHandle,
}

/// 刚体注册表
#[derive(Default)]
pub struct BodyRegistry {
    entries: Vec<RegistryEntry>,
    /// 与 entries 下标对齐，便于整体交给渲染器
    visuals: Vec<VisualProxy>,
    name_to_index: HashMap<String, usize>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册刚体及其渲染代理
    pub fn register(
        &mut self,
        name: impl Into<String>,
        body: BodyHandle,
        visual: VisualProxy,
    ) -> Result<()> {
        let name = name.into();
        if self.name_to_index.contains_key(&name) {
            return Err(KneeError::DuplicateBody(name));
        }
        if self.entries.iter().any(|e| e.body == body) {
            return Err(KneeError::DuplicateBody(format!(
                "{} (body {} already has a visual)",
                name,
                body.index()
            )));
        }

        let index = self.entries.len();
        self.name_to_index.insert(name.clone(), index);
        self.entries.push(RegistryEntry { name, body });
        self.visuals.push(visual);
        Ok(())
    }

    /// 按名称查找刚体句柄
    pub fn find(&self, name: &str) -> Result<BodyHandle> {
        self.name_to_index
            .get(name)
            .map(|&i| self.entries[i].body)
            .ok_or_else(|| KneeError::UnknownBody(name.to_string()))
    }

    pub fn visual(&self, body: BodyHandle) -> Option<&VisualProxy> {
        self.entries
            .iter()
            .position(|e| e.body == body)
            .map(|i| &self.visuals[i])
    }

    /// 所有渲染代理（交给渲染器）
    pub fn visuals(&self) -> &[VisualProxy] {
        &self.visuals
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 把每个刚体的当前位姿复制到渲染代理
    ///
    /// 返回更新的代理数量。
    pub fn sync_visuals(&mut self, world: &PhysicsWorld) -> usize {
        let mut updated = 0;
        for (entry, visual) in self.entries.iter().zip(self.visuals.iter_mut()) {
            if let Some(pose) = world.body_pose(entry.body) {
                visual.copy_pose(pose);
                updated += 1;
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{CylinderShape, PhysicsConfig, SimRigidBody};
    use crate::scene::Color;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn world_with_body(position: Vec3, mass: f32) -> (PhysicsWorld, BodyHandle) {
        let mut world = PhysicsWorld::new(&PhysicsConfig::default()).unwrap();
        let shape = CylinderShape::new(0.3, 2.0, 10).unwrap();
        let body = world
            .add_body(SimRigidBody::new("b", mass, shape, position).unwrap())
            .unwrap();
        (world, body)
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (_, body) = world_with_body(Vec3::ZERO, 0.0);
        let mut registry = BodyRegistry::new();
        registry
            .register("leg", body, VisualProxy::cylinder(0.3, 2.0, Color::BLUE))
            .unwrap();
        let err = registry
            .register("leg", BodyHandle(9), VisualProxy::cylinder(0.3, 2.0, Color::BLUE))
            .unwrap_err();
        assert!(matches!(err, KneeError::DuplicateBody(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_body_paired_once() {
        let (_, body) = world_with_body(Vec3::ZERO, 0.0);
        let mut registry = BodyRegistry::new();
        registry
            .register("a", body, VisualProxy::cylinder(0.3, 2.0, Color::BLUE))
            .unwrap();
        assert!(registry
            .register("b", body, VisualProxy::cylinder(0.3, 2.0, Color::BLUE))
            .is_err());
    }

    #[test]
    fn test_find_unknown_name() {
        let registry = BodyRegistry::new();
        assert!(matches!(registry.find("nope"), Err(KneeError::UnknownBody(_))));
    }

    #[test]
    fn test_sync_copies_pose() {
        let (mut world, body) = world_with_body(Vec3::new(0.0, 10.0, 0.0), 1.0);
        let mut registry = BodyRegistry::new();
        registry
            .register("falling", body, VisualProxy::cylinder(0.3, 2.0, Color::BLUE))
            .unwrap();

        assert_eq!(registry.sync_visuals(&world), 1);
        assert_abs_diff_eq!(registry.visual(body).unwrap().transform.translation.y, 10.0);

        for _ in 0..10 {
            world.step(1.0 / 60.0, 1.0 / 60.0, 3);
        }
        registry.sync_visuals(&world);
        let visual = registry.visual(body).unwrap();
        let pose = world.body_pose(body).unwrap();
        assert_eq!(visual.transform.translation, pose.position);
        assert_eq!(visual.transform.rotation, pose.rotation);
        assert!(visual.transform.translation.y < 10.0);
    }
}
