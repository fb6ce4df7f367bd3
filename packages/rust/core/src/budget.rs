//! Duration budget: how a module's minutes are split between sections.

use serde::Serialize;

/// Minutes allotted to each section of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationGuide {
    pub intro: u32,
    pub content: u32,
    pub activities: u32,
    pub assessment: u32,
}

impl DurationGuide {
    pub fn total(&self) -> u32 {
        self.intro + self.content + self.activities + self.assessment
    }
}

/// Upper bound of each bucket and its allocation.
const GUIDES: [(u32, DurationGuide); 5] = [
    (
        5,
        DurationGuide {
            intro: 1,
            content: 3,
            activities: 0,
            assessment: 1,
        },
    ),
    (
        15,
        DurationGuide {
            intro: 2,
            content: 8,
            activities: 3,
            assessment: 2,
        },
    ),
    (
        30,
        DurationGuide {
            intro: 3,
            content: 15,
            activities: 8,
            assessment: 4,
        },
    ),
    (
        60,
        DurationGuide {
            intro: 5,
            content: 30,
            activities: 18,
            assessment: 7,
        },
    ),
    (
        90,
        DurationGuide {
            intro: 7,
            content: 45,
            activities: 25,
            assessment: 12,
        },
    ),
];

/// Allocation for a module of `minutes`; anything over an hour uses the 90-minute bucket.
pub fn duration_guide(minutes: u32) -> DurationGuide {
    GUIDES
        .iter()
        .find(|(limit, _)| minutes <= *limit)
        .map(|(_, guide)| *guide)
        .unwrap_or(GUIDES[GUIDES.len() - 1].1)
}
