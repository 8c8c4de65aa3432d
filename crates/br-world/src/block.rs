//! Block kinds the brains care about.

/// Growth stage at which a crop can be harvested.
pub const CROP_MAX_AGE: u8 = 7;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    #[default]
    Air,
    Bed { occupied: bool },
    Workstation,
    Bell,
    Farmland,
    Crop { age: u8 },
}

impl BlockKind {
    #[inline]
    pub fn is_bed(self) -> bool {
        matches!(self, BlockKind::Bed { .. })
    }

    /// The point-of-interest type this block provides, if any.
    pub fn poi_kind(self) -> Option<PoiKind> {
        match self {
            BlockKind::Bed { .. } => Some(PoiKind::Home),
            BlockKind::Workstation => Some(PoiKind::JobSite),
            BlockKind::Bell => Some(PoiKind::Meeting),
            _ => None,
        }
    }

    #[inline]
    pub fn is_mature_crop(self) -> bool {
        matches!(self, BlockKind::Crop { age } if age >= CROP_MAX_AGE)
    }
}

/// Claimable points of interest.  A claimed POI (a "ticket") is not offered
/// to other agents by [`World::find_pois`][crate::World::find_pois].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoiKind {
    Home,
    JobSite,
    Meeting,
}
