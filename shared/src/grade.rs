//! Kellgren-Lawrence grade table.
//!
//! Maps the class index returned by `/predict` onto the fixed display
//! metadata the client renders: label, severity colour tier, the
//! recommended action and the three radiographic findings shown as badges.
//! Everything here is pure and `'static`; resolving the same grade twice
//! yields the very same table entry.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

/// Severity class on the Kellgren-Lawrence scale.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
#[repr(u8)]
pub enum KlGrade {
    #[display(fmt = "KL0")]
    Kl0 = 0,
    #[display(fmt = "KL1")]
    Kl1 = 1,
    #[display(fmt = "KL2")]
    Kl2 = 2,
    #[display(fmt = "KL3")]
    Kl3 = 3,
    #[display(fmt = "KL4")]
    Kl4 = 4,
}

impl KlGrade {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 4;

    /// Clamps any integer into the 0..=4 domain.
    pub fn from_clamped(value: i64) -> Self {
        match value.clamp(Self::MIN, Self::MAX) {
            0 => KlGrade::Kl0,
            1 => KlGrade::Kl1,
            2 => KlGrade::Kl2,
            3 => KlGrade::Kl3,
            _ => KlGrade::Kl4,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn metadata(self) -> &'static GradeMetadata {
        resolve(self)
    }
}

/// How a raw `class` value was turned into a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeCoercion {
    Exact,
    /// Numeric but outside 0..=4.
    Clamped,
    /// Missing or not parseable as an integer; falls back to KL0.
    NotNumeric,
}

/// A class value as it appears on the wire.
///
/// The contract says integers, the reference service sends strings
/// (`"2"`), so both are accepted and forwarded back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeValue {
    Number(serde_json::Number),
    Text(String),
}

impl GradeValue {
    /// Integer reading of the value: numbers are truncated, text is read
    /// like a leading-integer prefix (`"3"`, `" 2abc"`).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            GradeValue::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|v| v.is_finite())
                    .map(|v| v.trunc() as i64)
            }),
            GradeValue::Text(text) => parse_leading_int(text),
        }
    }

    /// Clamps the value into the grade domain. Non-numeric input maps to KL0.
    pub fn coerce(raw: Option<&GradeValue>) -> (KlGrade, GradeCoercion) {
        match raw.and_then(GradeValue::as_integer) {
            Some(v) if (KlGrade::MIN..=KlGrade::MAX).contains(&v) => {
                (KlGrade::from_clamped(v), GradeCoercion::Exact)
            }
            Some(v) => (KlGrade::from_clamped(v), GradeCoercion::Clamped),
            None => (KlGrade::Kl0, GradeCoercion::NotNumeric),
        }
    }
}

impl From<i64> for GradeValue {
    fn from(value: i64) -> Self {
        GradeValue::Number(value.into())
    }
}

impl From<&str> for GradeValue {
    fn from(value: &str) -> Self {
        GradeValue::Text(value.to_string())
    }
}

impl std::fmt::Display for GradeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeValue::Number(n) => write!(f, "{}", n),
            GradeValue::Text(text) => f.write_str(text),
        }
    }
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // saturates on overflow, the caller clamps anyway
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// Colour tier used for the grade heading and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTier {
    Normal,
    Doubtful,
    Mild,
    Moderate,
    Severe,
}

impl SeverityTier {
    pub fn css_class(self) -> &'static str {
        match self {
            SeverityTier::Normal => "text-green-400",
            SeverityTier::Doubtful => "text-yellow-400",
            SeverityTier::Mild => "text-orange-400",
            SeverityTier::Moderate => "text-red-400",
            SeverityTier::Severe => "text-red-500",
        }
    }
}

#[derive(Debug, StrumDisplay, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingLevel {
    None,
    Minimal,
    Possible,
    Definite,
    Multiple,
    Large,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Warn,
    Bad,
}

impl BadgeTone {
    pub fn css_class(self) -> &'static str {
        match self {
            BadgeTone::Neutral => "badge-neutral",
            BadgeTone::Warn => "badge-warn",
            BadgeTone::Bad => "badge-bad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClinicalFlag {
    pub level: FindingLevel,
    pub tone: BadgeTone,
}

impl ClinicalFlag {
    const fn new(level: FindingLevel, bad: bool) -> Self {
        let tone = match level {
            FindingLevel::None => BadgeTone::Neutral,
            _ if bad => BadgeTone::Bad,
            _ => BadgeTone::Warn,
        };
        Self { level, tone }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeMetadata {
    pub grade: KlGrade,
    pub display_label: &'static str,
    pub tier: SeverityTier,
    pub recommendation: &'static str,
    pub osteophytes: ClinicalFlag,
    pub joint_space_narrowing: ClinicalFlag,
    pub sclerosis: ClinicalFlag,
}

impl GradeMetadata {
    pub fn heading(&self) -> String {
        format!("Grade {}", self.grade.index())
    }
}

// Osteophytes turn "bad" above KL1, narrowing and sclerosis above KL2.
static GRADE_TABLE: [GradeMetadata; 5] = [
    GradeMetadata {
        grade: KlGrade::Kl0,
        display_label: "KL0 — Bình thường",
        tier: SeverityTier::Normal,
        recommendation: "Không cần can thiệp đặc biệt. Duy trì vận động và lối sống lành mạnh.",
        osteophytes: ClinicalFlag::new(FindingLevel::None, false),
        joint_space_narrowing: ClinicalFlag::new(FindingLevel::None, false),
        sclerosis: ClinicalFlag::new(FindingLevel::None, false),
    },
    GradeMetadata {
        grade: KlGrade::Kl1,
        display_label: "KL1 — Nghi ngờ",
        tier: SeverityTier::Doubtful,
        recommendation: "Theo dõi định kỳ, điều chỉnh tư thế và tải trọng lên khớp.",
        osteophytes: ClinicalFlag::new(FindingLevel::Possible, false),
        joint_space_narrowing: ClinicalFlag::new(FindingLevel::Minimal, false),
        sclerosis: ClinicalFlag::new(FindingLevel::None, false),
    },
    GradeMetadata {
        grade: KlGrade::Kl2,
        display_label: "KL2 — Nhẹ",
        tier: SeverityTier::Mild,
        recommendation: "Tập phục hồi chức năng, giảm cân nếu thừa cân, hạn chế quá tải khớp.",
        osteophytes: ClinicalFlag::new(FindingLevel::Definite, true),
        joint_space_narrowing: ClinicalFlag::new(FindingLevel::Possible, false),
        sclerosis: ClinicalFlag::new(FindingLevel::None, false),
    },
    GradeMetadata {
        grade: KlGrade::Kl3,
        display_label: "KL3 — Trung bình",
        tier: SeverityTier::Moderate,
        recommendation: "Điều trị nội khoa tích cực, cân nhắc tiêm trong khớp theo chỉ định.",
        osteophytes: ClinicalFlag::new(FindingLevel::Multiple, true),
        joint_space_narrowing: ClinicalFlag::new(FindingLevel::Definite, true),
        sclerosis: ClinicalFlag::new(FindingLevel::Possible, true),
    },
    GradeMetadata {
        grade: KlGrade::Kl4,
        display_label: "KL4 — Nặng",
        tier: SeverityTier::Severe,
        recommendation: "Cân nhắc phẫu thuật thay khớp và phục hồi chức năng chuyên sâu.",
        osteophytes: ClinicalFlag::new(FindingLevel::Large, true),
        joint_space_narrowing: ClinicalFlag::new(FindingLevel::Severe, true),
        sclerosis: ClinicalFlag::new(FindingLevel::Possible, true),
    },
];

/// Display metadata for a grade. Total over [`KlGrade`].
pub fn resolve(grade: KlGrade) -> &'static GradeMetadata {
    &GRADE_TABLE[grade.index() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_resolve_is_identical_across_calls() {
        let first = resolve(KlGrade::Kl2);
        let second = resolve(KlGrade::Kl2);
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.display_label, "KL2 — Nhẹ");
        assert_eq!(first.heading(), "Grade 2");
    }

    #[test]
    fn test_table_is_ordered_by_grade() {
        for grade in KlGrade::iter() {
            assert_eq!(resolve(grade).grade, grade);
            assert!(resolve(grade).display_label.starts_with(&grade.to_string()));
        }
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        assert_eq!(
            GradeValue::coerce(Some(&GradeValue::from(-1))),
            (KlGrade::Kl0, GradeCoercion::Clamped)
        );
        assert_eq!(
            GradeValue::coerce(Some(&GradeValue::from(7))),
            (KlGrade::Kl4, GradeCoercion::Clamped)
        );
        assert_eq!(
            GradeValue::coerce(Some(&GradeValue::from(3))),
            (KlGrade::Kl3, GradeCoercion::Exact)
        );
    }

    #[test]
    fn test_text_and_missing_values() {
        assert_eq!(
            GradeValue::coerce(Some(&GradeValue::from("2"))),
            (KlGrade::Kl2, GradeCoercion::Exact)
        );
        assert_eq!(
            GradeValue::coerce(Some(&GradeValue::from(" 4px"))),
            (KlGrade::Kl4, GradeCoercion::Exact)
        );
        assert_eq!(
            GradeValue::coerce(Some(&GradeValue::from("severe"))),
            (KlGrade::Kl0, GradeCoercion::NotNumeric)
        );
        assert_eq!(GradeValue::coerce(None), (KlGrade::Kl0, GradeCoercion::NotNumeric));
    }

    #[test]
    fn test_fractional_numbers_truncate() {
        let raw: GradeValue = serde_json::from_str("2.7").unwrap();
        assert_eq!(raw.as_integer(), Some(2));
        let raw: GradeValue = serde_json::from_str("-0.5").unwrap();
        assert_eq!(GradeValue::coerce(Some(&raw)).0, KlGrade::Kl0);
    }

    #[test]
    fn test_badge_tones() {
        let kl1 = resolve(KlGrade::Kl1);
        assert_eq!(kl1.osteophytes.tone, BadgeTone::Warn);
        assert_eq!(kl1.sclerosis.tone, BadgeTone::Neutral);

        let kl2 = resolve(KlGrade::Kl2);
        assert_eq!(kl2.osteophytes.tone, BadgeTone::Bad);
        assert_eq!(kl2.joint_space_narrowing.tone, BadgeTone::Warn);

        let kl3 = resolve(KlGrade::Kl3);
        assert_eq!(kl3.sclerosis.level.to_string(), "POSSIBLE");
        assert_eq!(kl3.sclerosis.tone, BadgeTone::Bad);
        assert_eq!(resolve(KlGrade::Kl4).joint_space_narrowing.level.to_string(), "SEVERE");
    }
}
