//! Point features attached to the network (signals, platforms, …).

use tv_core::{ItemId, WorldLocation};

/// Type-specific payload of a track item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Empty,
    Crossover,
    Signal {
        /// 0: faces along the owning node's chain, anything else: against it.
        direction: u8,
    },
    /// A speed limit sign, a milepost, or both.
    SpeedPost {
        value:       f32,
        is_limit:    bool,
        is_milepost: bool,
    },
    Platform,
    Siding,
    SoundRegion,
    LevelCrossing,
    RoadLevelCrossing,
    Hazard,
    Pickup,
    CarSpawner,
}

impl ItemKind {
    /// Short display name used in status bars and search menus.
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Empty => "empty",
            ItemKind::Crossover => "crossover",
            ItemKind::Signal { .. } => "signal",
            ItemKind::SpeedPost { .. } => "speedpost",
            ItemKind::Platform => "platform",
            ItemKind::Siding => "siding",
            ItemKind::SoundRegion => "soundregion",
            ItemKind::LevelCrossing | ItemKind::RoadLevelCrossing => "crossing",
            ItemKind::Hazard => "hazard",
            ItemKind::Pickup => "pickup",
            ItemKind::CarSpawner => "carspawner",
        }
    }
}

/// One entry of the item table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrItem {
    pub id:       ItemId,
    pub location: WorldLocation,
    pub name:     Option<String>,
    pub kind:     ItemKind,
}

impl TrItem {
    pub fn new(id: ItemId, location: WorldLocation, kind: ItemKind) -> Self {
        Self { id, location, name: None, kind }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn is_signal(&self) -> bool {
        matches!(self.kind, ItemKind::Signal { .. })
    }
}
