use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ClaimId);
id_newtype!(RevealCount);

/// Input modality that triggered a carousel pause. Each source carries its
/// own resume policy (immediate, delayed, or none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSource {
    Hover,
    Focus,
    Click,
    Wheel,
    Touch,
    ArrowKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    Next,
    Previous,
}

/// Prize tiers awarded by the reveal endpoint, in rupees.
pub const PRIZE_TIERS: [i64; 5] = [5_000, 10_000, 15_000, 20_000, 25_000];
