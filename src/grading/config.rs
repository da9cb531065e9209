use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal marks never count for more than this in totals.
pub const DEFAULT_INTERNAL_MAX: u32 = 80;
pub const DEFAULT_UNIT_START_CODE: u32 = 401;
pub const DEFAULT_BASE_MULTIPLIER: f64 = 2.5;
pub const DEFAULT_MULTIPLIER_STEP: f64 = 0.3;
pub const DEFAULT_OFFSET: i64 = 6;
pub const DEFAULT_PASS_MARK: f64 = 40.0;

/// Ceilings a config may lower but never raise.
pub const MAX_INTERNAL_MARKS: u32 = 80;
pub const MAX_UNIT_EXTERNAL_MARKS: u32 = 80;
pub const MAX_SESSIONAL_EXTERNAL_MARKS: u32 = 60;

/// Highest start code that leaves room for a full memo's worth of codes.
pub const MAX_START_CODE: u32 = u32::MAX - 1000;

/// The two mark categories on a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Unit-exam subjects (theory). Raw marks come as two attempts per subject.
    Unit,
    /// Sessional subjects (labs, practicals).
    Sessional,
}

impl Category {
    fn default_paired(self) -> bool {
        matches!(self, Category::Unit)
    }

    fn default_credits(self) -> f64 {
        match self {
            Category::Unit => 2.5,
            Category::Sessional => 1.0,
        }
    }

    fn default_external_max(self) -> u32 {
        self.external_cap()
    }

    /// Largest external mark a subject in this category can carry.
    pub fn external_cap(self) -> u32 {
        match self {
            Category::Unit => MAX_UNIT_EXTERNAL_MARKS,
            Category::Sessional => MAX_SESSIONAL_EXTERNAL_MARKS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Unit => write!(f, "unit"),
            Category::Sessional => write!(f, "sessional"),
        }
    }
}

/// Main grading configuration.
///
/// Every field is optional; [`GradingConfig::default`] carries the values the
/// memo has always been computed with, and the engine falls back to the same
/// constants when a field is left out of a hand-written config.
///
/// Example YAML:
/// ```yaml
/// grading:
///   unit:
///     subjects: 5
///   sessional:
///     paired: false
///   start_code_rules:
///     - { prefix: "24", start_code: 101 }
///   offsets:
///     - { code: 401, offset: 1 }
///   pass_mark: 40
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradingConfig {
    /// Rules for unit-exam subjects
    #[serde(default)]
    pub unit: Option<CategoryConfig>,

    /// Rules for sessional subjects
    #[serde(default)]
    pub sessional: Option<CategoryConfig>,

    /// First unit subject code when no prefix rule matches (default: 401)
    #[serde(default)]
    pub unit_start_code: Option<u32>,

    /// Identifier prefixes that move the unit codes to a different base.
    /// First matching rule wins.
    #[serde(default)]
    pub start_code_rules: Option<Vec<StartCodeRule>>,

    /// Upper clamp for internal marks (default: 80)
    #[serde(default)]
    pub internal_max: Option<u32>,

    /// Multiplier applied to the internal mark before the per-code step
    #[serde(default)]
    pub base_multiplier: Option<f64>,

    /// Added to the multiplier once for every unit of (code mod 10)
    #[serde(default)]
    pub multiplier_step: Option<f64>,

    /// Offset used for codes missing from `offsets`
    #[serde(default)]
    pub default_offset: Option<i64>,

    /// Additive offsets keyed by the last three digits of the subject code
    #[serde(default)]
    pub offsets: Option<Vec<SubjectOffset>>,

    /// Grade bands, highest first. Totals below the last band fail with 0 points.
    #[serde(default)]
    pub bands: Option<Vec<GradeBand>>,

    /// Minimum total for a "P" status (default: 40)
    #[serde(default)]
    pub pass_mark: Option<f64>,
}

/// Per-category rules.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Raw marks arrive as two attempts per subject and are averaged
    #[serde(default)]
    pub paired: Option<bool>,

    /// Declared number of subjects. When set, fewer marks is an error and
    /// extra marks are ignored.
    #[serde(default)]
    pub subjects: Option<usize>,

    /// Credits recorded on each subject of the category
    #[serde(default)]
    pub credits: Option<f64>,

    /// Upper clamp for external marks
    #[serde(default)]
    pub external_max: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StartCodeRule {
    pub prefix: String,
    pub start_code: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SubjectOffset {
    /// Last three digits of the subject code (0-999)
    pub code: u32,
    pub offset: i64,
}

/// Grade band with an inclusive lower bound.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradeBand {
    pub min: f64,
    pub points: u32,
    pub grade: String,
}

/// Category rules with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRules {
    pub category: Category,
    pub paired: bool,
    pub subjects: Option<usize>,
    pub credits: f64,
    pub external_max: u32,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            unit: Some(CategoryConfig {
                paired: Some(true),
                subjects: None,
                credits: Some(Category::Unit.default_credits()),
                external_max: Some(Category::Unit.default_external_max()),
            }),
            sessional: Some(CategoryConfig {
                paired: Some(false),
                subjects: None,
                credits: Some(Category::Sessional.default_credits()),
                external_max: Some(Category::Sessional.default_external_max()),
            }),
            unit_start_code: Some(DEFAULT_UNIT_START_CODE),
            start_code_rules: Some(default_start_code_rules()),
            internal_max: Some(DEFAULT_INTERNAL_MAX),
            base_multiplier: Some(DEFAULT_BASE_MULTIPLIER),
            multiplier_step: Some(DEFAULT_MULTIPLIER_STEP),
            default_offset: Some(DEFAULT_OFFSET),
            offsets: Some(default_offsets()),
            bands: Some(default_bands()),
            pass_mark: Some(DEFAULT_PASS_MARK),
        }
    }
}

impl GradingConfig {
    /// Resolve the rules for one category, filling gaps with built-in defaults.
    pub fn rules_for(&self, category: Category) -> CategoryRules {
        let section = match category {
            Category::Unit => self.unit.as_ref(),
            Category::Sessional => self.sessional.as_ref(),
        };
        let section = section.cloned().unwrap_or_default();

        CategoryRules {
            category,
            paired: section.paired.unwrap_or(category.default_paired()),
            subjects: section.subjects,
            credits: section.credits.unwrap_or(category.default_credits()),
            external_max: section
                .external_max
                .unwrap_or(category.default_external_max())
                .min(category.external_cap()),
        }
    }

    pub fn internal_max(&self) -> u32 {
        self.internal_max
            .unwrap_or(DEFAULT_INTERNAL_MAX)
            .min(MAX_INTERNAL_MARKS)
    }

    pub fn pass_mark(&self) -> f64 {
        self.pass_mark.unwrap_or(DEFAULT_PASS_MARK)
    }

    /// Configured bands, or the standard ten-point scale.
    pub fn bands(&self) -> Vec<GradeBand> {
        self.bands.clone().unwrap_or_else(default_bands)
    }

    /// Offset for a subject code, looked up by its last three digits.
    pub fn offset_for(&self, subject_code: u32) -> i64 {
        let key = subject_code % 1000;
        let default = self.default_offset.unwrap_or(DEFAULT_OFFSET);
        match self.offsets {
            Some(ref table) => table
                .iter()
                .find(|entry| entry.code == key)
                .map(|entry| entry.offset)
                .unwrap_or(default),
            None => default_offsets()
                .into_iter()
                .find(|entry| entry.code == key)
                .map(|entry| entry.offset)
                .unwrap_or(default),
        }
    }

    /// Multiplier for a subject code: base plus one step per unit of (code mod 10).
    pub fn multiplier_for(&self, subject_code: u32) -> f64 {
        let base = self.base_multiplier.unwrap_or(DEFAULT_BASE_MULTIPLIER);
        let step = self.multiplier_step.unwrap_or(DEFAULT_MULTIPLIER_STEP);
        base + (subject_code % 10) as f64 * step
    }
}

fn default_start_code_rules() -> Vec<StartCodeRule> {
    vec![StartCodeRule {
        prefix: "24".to_string(),
        start_code: 101,
    }]
}

fn default_offsets() -> Vec<SubjectOffset> {
    [(401, 1), (402, 4), (403, 13), (404, 2), (405, 5)]
        .into_iter()
        .map(|(code, offset)| SubjectOffset { code, offset })
        .collect()
}

fn default_bands() -> Vec<GradeBand> {
    [
        (90.0, 10, "A+"),
        (80.0, 9, "A"),
        (70.0, 8, "B+"),
        (60.0, 7, "B"),
        (50.0, 6, "C"),
        (40.0, 5, "D"),
    ]
    .into_iter()
    .map(|(min, points, grade)| GradeBand {
        min,
        points,
        grade: grade.to_string(),
    })
    .collect()
}
