//! Collision layers + headless environment queries
//!
//! ## Layers (битовая маска):
//! - Layer 1 (0b1 = 1): Ground (платформы, пол)
//! - Layer 2 (0b10 = 2): Actors (агенты, игрок)
//! - Layer 3 (0b100 = 4): Props (разрушаемые объекты, препятствия)
//!
//! Физический backend — внешний collaborator. Controller видит его только через
//! [`EnvironmentQueries`]. [`CollisionScene`] — headless реализация (snapshot
//! всех `Collider2D` на текущий тик), используется binary и тестами.

use bevy::prelude::*;

/// Layer 1: Ground (платформы)
pub const LAYER_GROUND: u32 = 0b1;

/// Layer 2: Actors (агенты + игрок)
pub const LAYER_ACTORS: u32 = 0b10;

/// Layer 3: Props (ящики, стены)
pub const LAYER_PROPS: u32 = 0b100;

/// Mask: ground probe у ног (только пол)
pub const MASK_GROUND_PROBE: u32 = LAYER_GROUND;

/// Mask: луч восприятия (actors + props, props перекрывают обзор)
pub const MASK_SIGHT: u32 = LAYER_ACTORS | LAYER_PROPS;

/// Форма коллайдера в локальных координатах entity
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum Shape2D {
    Circle { radius: f32 },
    /// Axis-aligned box
    Rect { half_extents: Vec2 },
}

impl Default for Shape2D {
    fn default() -> Self {
        Self::Circle { radius: 0.5 }
    }
}

/// Коллайдер entity для headless backend
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Collider2D {
    pub shape: Shape2D,
    /// На каком слое лежит объект (LAYER_*)
    pub layer: u32,
}

impl Collider2D {
    pub fn circle(radius: f32, layer: u32) -> Self {
        Self {
            shape: Shape2D::Circle { radius },
            layer,
        }
    }

    pub fn rect(half_extents: Vec2, layer: u32) -> Self {
        Self {
            shape: Shape2D::Rect { half_extents },
            layer,
        }
    }
}

/// Tag entity (сравнивается с `SensorConfig::target_tag`)
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

/// Результат raycast: ближайший коллайдер вдоль луча
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit<'a> {
    pub entity: Entity,
    pub distance: f32,
    pub tag: Option<&'a str>,
}

/// Запросы к физическому окружению (ground contact + ray probe)
///
/// `exclude` — entity который делает запрос (луч стартует внутри собственного коллайдера).
pub trait EnvironmentQueries {
    fn ground_contact(&self, center: Vec2, radius: f32, mask: u32, exclude: Option<Entity>) -> bool;

    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit<'_>>;
}

#[derive(Debug, Clone)]
struct SceneCollider {
    entity: Entity,
    center: Vec2,
    shape: Shape2D,
    layer: u32,
    tag: Option<String>,
}

/// Snapshot коллайдеров на текущий тик (read-only, пересобирается каждый тик)
#[derive(Debug, Clone, Default)]
pub struct CollisionScene {
    colliders: Vec<SceneCollider>,
}

impl CollisionScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity, center: Vec2, collider: Collider2D, tag: Option<&str>) {
        self.colliders.push(SceneCollider {
            entity,
            center,
            shape: collider.shape,
            layer: collider.layer,
            tag: tag.map(str::to_owned),
        });
    }

    /// Собирает snapshot из ECS query (Transform → центр коллайдера)
    pub fn from_query<'a>(
        colliders: impl IntoIterator<Item = (Entity, &'a Transform, &'a Collider2D, Option<&'a Tag>)>,
    ) -> Self {
        let mut scene = Self::new();
        for (entity, transform, collider, tag) in colliders {
            scene.insert(
                entity,
                transform.translation.truncate(),
                *collider,
                tag.map(|t| t.0.as_str()),
            );
        }
        scene
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Все entities чей коллайдер пересекает круг (для melee strike)
    pub fn overlap_circle(
        &self,
        center: Vec2,
        radius: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Vec<Entity> {
        self.colliders
            .iter()
            .filter(|c| c.layer & mask != 0 && Some(c.entity) != exclude)
            .filter(|c| circle_overlaps(center, radius, c.center, c.shape))
            .map(|c| c.entity)
            .collect()
    }
}

impl EnvironmentQueries for CollisionScene {
    fn ground_contact(&self, center: Vec2, radius: f32, mask: u32, exclude: Option<Entity>) -> bool {
        self.colliders
            .iter()
            .filter(|c| c.layer & mask != 0 && Some(c.entity) != exclude)
            .any(|c| circle_overlaps(center, radius, c.center, c.shape))
    }

    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<RayHit<'_>> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut nearest: Option<RayHit<'_>> = None;
        for c in &self.colliders {
            if c.layer & mask == 0 || Some(c.entity) == exclude {
                continue;
            }

            let Some(distance) = ray_distance(origin, direction, c.center, c.shape) else {
                continue;
            };

            if distance > max_distance {
                continue;
            }

            // При равной дистанции выигрывает первый вставленный (детерминизм)
            if nearest.as_ref().map_or(true, |hit| distance < hit.distance) {
                nearest = Some(RayHit {
                    entity: c.entity,
                    distance,
                    tag: c.tag.as_deref(),
                });
            }
        }

        nearest
    }
}

/// Пересекается ли круг (center, radius) с формой в точке `shape_center`
pub fn circle_overlaps(center: Vec2, radius: f32, shape_center: Vec2, shape: Shape2D) -> bool {
    match shape {
        Shape2D::Circle { radius: other } => {
            let reach = radius + other;
            center.distance_squared(shape_center) <= reach * reach
        }
        Shape2D::Rect { half_extents } => {
            let min = shape_center - half_extents;
            let max = shape_center + half_extents;
            let closest = center.clamp(min, max);
            center.distance_squared(closest) <= radius * radius
        }
    }
}

/// Дистанция вдоль нормализованного луча до формы (0.0 если origin внутри)
pub fn ray_distance(origin: Vec2, direction: Vec2, shape_center: Vec2, shape: Shape2D) -> Option<f32> {
    match shape {
        Shape2D::Circle { radius } => {
            let to_origin = origin - shape_center;
            let c = to_origin.length_squared() - radius * radius;
            if c <= 0.0 {
                return Some(0.0);
            }

            let b = to_origin.dot(direction);
            if b > 0.0 {
                // Луч смотрит от круга
                return None;
            }

            let discriminant = b * b - c;
            if discriminant < 0.0 {
                return None;
            }

            Some(-b - discriminant.sqrt())
        }
        Shape2D::Rect { half_extents } => {
            let min = shape_center - half_extents;
            let max = shape_center + half_extents;

            // Slab method
            let mut t_near = f32::NEG_INFINITY;
            let mut t_far = f32::INFINITY;
            for axis in 0..2 {
                let o = origin[axis];
                let d = direction[axis];
                if d.abs() < f32::EPSILON {
                    if o < min[axis] || o > max[axis] {
                        return None;
                    }
                    continue;
                }

                let t1 = (min[axis] - o) / d;
                let t2 = (max[axis] - o) / d;
                t_near = t_near.max(t1.min(t2));
                t_far = t_far.min(t1.max(t2));
            }

            if t_near > t_far || t_far < 0.0 {
                return None;
            }

            Some(t_near.max(0.0))
        }
    }
}
