// ============================================================
// Layer 3 — Discipline Domain Type
// ============================================================
// The ten engineering disciplines a project can be attributed to.
//
// The declaration order is load-bearing: it is the index order of
// both the primary-field probability vector and the contributions
// vector, and it matches the `<Discipline>_Pct` CSV columns.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of disciplines, i.e. the width of the classification and
/// contribution heads.
pub const NUM_DISCIPLINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    Mechanical,
    Electrical,
    Civil,
    Chemical,
    Computer,
    Software,
    Aerospace,
    Materials,
    Environmental,
    Industrial,
}

impl Discipline {
    /// Every discipline, in head/column order.
    pub const ALL: [Discipline; NUM_DISCIPLINES] = [
        Discipline::Mechanical,
        Discipline::Electrical,
        Discipline::Civil,
        Discipline::Chemical,
        Discipline::Computer,
        Discipline::Software,
        Discipline::Aerospace,
        Discipline::Materials,
        Discipline::Environmental,
        Discipline::Industrial,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Discipline::Mechanical    => "Mechanical",
            Discipline::Electrical    => "Electrical",
            Discipline::Civil         => "Civil",
            Discipline::Chemical      => "Chemical",
            Discipline::Computer      => "Computer",
            Discipline::Software      => "Software",
            Discipline::Aerospace     => "Aerospace",
            Discipline::Materials     => "Materials",
            Discipline::Environmental => "Environmental",
            Discipline::Industrial    => "Industrial",
        }
    }

    /// Position of this discipline in the output vectors.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Names in head order, as stored in the artifact manifest.
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|d| d.name().to_string()).collect()
    }

    /// Pick the discipline with the highest score.
    /// Ties resolve to the earliest discipline.
    pub fn argmax(scores: &[f32]) -> Option<Self> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &s) in scores.iter().enumerate().take(NUM_DISCIPLINES) {
            match best {
                Some((_, b)) if s <= b => {}
                _ => best = Some((i, s)),
            }
        }
        best.and_then(|(i, _)| Self::from_index(i))
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Discipline {
    type Err = anyhow::Error;

    /// Case-insensitive; "Civil Engineering" and "civil" both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower   = trimmed.to_lowercase();
        let key     = lower
            .strip_suffix("engineering")
            .map(str::trim_end)
            .unwrap_or(&lower);

        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(key))
            .ok_or_else(|| anyhow::anyhow!("Unknown primary field '{trimmed}'"))
    }
}
