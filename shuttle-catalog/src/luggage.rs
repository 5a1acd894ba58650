use serde::{Deserialize, Serialize};

/// Kinds of luggage a passenger can declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LuggageCategory {
    CarryOn,
    CheckedBag,
    Oversized,
    Special,
}

impl LuggageCategory {
    pub const ALL: [LuggageCategory; 4] = [
        LuggageCategory::CarryOn,
        LuggageCategory::CheckedBag,
        LuggageCategory::Oversized,
        LuggageCategory::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LuggageCategory::CarryOn => "carry-on",
            LuggageCategory::CheckedBag => "checked-bag",
            LuggageCategory::Oversized => "oversized",
            LuggageCategory::Special => "special",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LuggageCategory::CarryOn => "Carry-on Bag",
            LuggageCategory::CheckedBag => "Checked Bag",
            LuggageCategory::Oversized => "Oversized Bag",
            LuggageCategory::Special => "Special Items",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LuggageCategory::CarryOn => "Small bag that fits under seat",
            LuggageCategory::CheckedBag => "Standard suitcase",
            LuggageCategory::Oversized => "Large or heavy items",
            LuggageCategory::Special => "Sports equipment, musical instruments, etc.",
        }
    }
}

/// Display entry for the booking form's luggage picker.
#[derive(Debug, Clone, Serialize)]
pub struct LuggageOption {
    pub id: LuggageCategory,
    pub label: &'static str,
    pub description: &'static str,
}

impl LuggageOption {
    pub fn all() -> Vec<LuggageOption> {
        LuggageCategory::ALL
            .iter()
            .map(|c| LuggageOption {
                id: *c,
                label: c.label(),
                description: c.description(),
            })
            .collect()
    }
}
