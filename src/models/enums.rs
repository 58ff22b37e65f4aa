use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Priority {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(AlertLevel {
    Warning => "warning",
    Caution => "caution",
    Info => "info",
});

str_enum!(FindingSeverity {
    Normal => "normal",
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(AnesthesiaType {
    General => "general",
    Neuraxial => "neuraxial",
    NerveBlock => "nerve_block",
    Local => "local",
});

str_enum!(Intubation {
    Yes => "yes",
    No => "no",
    Unknown => "unknown",
});

impl Priority {
    /// Map a free-form priority label (English or Chinese) to a priority.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" | "urgent" | "高" | "高优先级" => Some(Self::High),
            "medium" | "moderate" | "中" | "中优先级" => Some(Self::Medium),
            "low" | "低" | "低优先级" => Some(Self::Low),
            _ => None,
        }
    }
}

impl AlertLevel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "warning" | "critical" | "警告" => Some(Self::Warning),
            "caution" | "attention" | "注意" => Some(Self::Caution),
            "info" | "information" | "信息" => Some(Self::Info),
            _ => None,
        }
    }
}

impl FindingSeverity {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "normal" | "正常" => Some(Self::Normal),
            "mild" | "轻度" => Some(Self::Mild),
            "moderate" | "中度" => Some(Self::Moderate),
            "severe" | "重度" => Some(Self::Severe),
            _ => None,
        }
    }
}

impl AnesthesiaType {
    /// Recognize the anesthesia technique from a form label.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        match lower.as_str() {
            "general" | "general anesthesia" | "ga" | "全身麻醉" | "全麻" => Some(Self::General),
            "neuraxial" | "spinal" | "epidural" | "cse" | "椎管内" | "椎管内麻醉" => {
                Some(Self::Neuraxial)
            }
            "nerve_block" | "nerve-block" | "nerve block" | "regional" | "神经阻滞" => {
                Some(Self::NerveBlock)
            }
            "local" | "local anesthesia" | "infiltration" | "局部" | "局麻" | "局部麻醉" => {
                Some(Self::Local)
            }
            _ => None,
        }
    }
}

impl Intubation {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" | "1" | "intubated" | "是" => Some(Self::Yes),
            "no" | "n" | "false" | "0" | "not intubated" | "否" => Some(Self::No),
            "unknown" | "unsure" | "未知" | "不详" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn is_intubated(self) -> bool {
        self == Self::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn priority_round_trip() {
        for (variant, s) in [
            (Priority::High, "high"),
            (Priority::Medium, "medium"),
            (Priority::Low, "low"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Priority::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn anesthesia_type_round_trip() {
        for (variant, s) in [
            (AnesthesiaType::General, "general"),
            (AnesthesiaType::Neuraxial, "neuraxial"),
            (AnesthesiaType::NerveBlock, "nerve_block"),
            (AnesthesiaType::Local, "local"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AnesthesiaType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_value_is_an_error() {
        let err = Priority::from_str("critical").unwrap_err();
        assert!(err.to_string().contains("critical"));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AnesthesiaType::NerveBlock).unwrap();
        assert_eq!(json, "\"nerve_block\"");
    }

    #[test]
    fn chinese_labels_are_recognized() {
        assert_eq!(Priority::from_label("高"), Some(Priority::High));
        assert_eq!(AnesthesiaType::from_label("全身麻醉"), Some(AnesthesiaType::General));
        assert_eq!(AnesthesiaType::from_label("神经阻滞"), Some(AnesthesiaType::NerveBlock));
        assert_eq!(Intubation::from_label("否"), Some(Intubation::No));
        assert_eq!(AlertLevel::from_label("警告"), Some(AlertLevel::Warning));
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(AnesthesiaType::from_label("  Spinal "), Some(AnesthesiaType::Neuraxial));
        assert_eq!(Intubation::from_label("TRUE"), Some(Intubation::Yes));
        assert_eq!(FindingSeverity::from_label("Severe"), Some(FindingSeverity::Severe));
    }

    #[test]
    fn unknown_labels_yield_none() {
        assert_eq!(AnesthesiaType::from_label("sedation"), None);
        assert_eq!(Intubation::from_label("maybe"), None);
        assert_eq!(Priority::from_label(""), None);
    }
}
