//! Entity kinds and the read-only snapshot brains see.

use std::fmt;

use br_core::{BlockPos, Vec3};

/// What kind of mob (or player) an entity is.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Villager,
    Goat,
    Pillager,
    Cat,
    Cow,
    Player,
}

impl EntityKind {
    /// Kinds that villagers flee from and cats avoid.
    pub fn is_hostile(self) -> bool {
        matches!(self, EntityKind::Pillager)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Villager => "villager",
            EntityKind::Goat => "goat",
            EntityKind::Pillager => "pillager",
            EntityKind::Cat => "cat",
            EntityKind::Cow => "cow",
            EntityKind::Player => "player",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A copy of one entity's observable state.
///
/// `age < 0` means the entity is a baby growing up; `age > 0` on an adult is
/// its remaining breeding cooldown.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EntityInfo {
    pub kind:     EntityKind,
    pub position: Vec3,
    pub alive:    bool,
    pub age:      i32,
    pub health:   f32,
    /// The bed the entity is lying in, if any.
    pub sleeping: Option<BlockPos>,
    /// `true` while the entity is following a path.
    pub moving:   bool,
}

impl EntityInfo {
    #[inline]
    pub fn is_baby(&self) -> bool {
        self.age < 0
    }

    /// Adult and out of breeding cooldown.
    #[inline]
    pub fn can_breed(&self) -> bool {
        self.alive && self.age == 0
    }
}
