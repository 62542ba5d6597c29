//! Prompt template assembly from named fragments.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;

/// Fragment that opens every assembled prompt.
pub const TASK_DESCRIPTION_FRAGMENT: &str = "1_task_description";
/// Fragment that closes every assembled prompt.
pub const FINAL_INSTRUCTIONS_FRAGMENT: &str = "4_finalInstructions";
/// Separator placed between fragment bodies.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Target software architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Architecture {
    #[serde(rename = "3tier")]
    ThreeTier,
    #[serde(rename = "mvc")]
    Mvc,
    #[serde(rename = "microservices")]
    Microservices,
}

impl Architecture {
    pub const ALL: [Architecture; 3] = [
        Architecture::ThreeTier,
        Architecture::Mvc,
        Architecture::Microservices,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::ThreeTier => "3tier",
            Architecture::Mvc => "mvc",
            Architecture::Microservices => "microservices",
        }
    }

    pub fn fragment_name(&self) -> &'static str {
        match self {
            Architecture::ThreeTier => "3_3tier",
            Architecture::Mvc => "3_mvc",
            Architecture::Microservices => "3_micro",
        }
    }
}

impl FromStr for Architecture {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "3tier" => Ok(Architecture::ThreeTier),
            "mvc" => Ok(Architecture::Mvc),
            "microservices" => Ok(Architecture::Microservices),
            other => Err(ValidationError::InvalidValue {
                field: "arch".to_string(),
                reason: format!("'{}' is not one of 3tier, mvc, microservices", other),
            }),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of requirements document the prompt is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    /// Software requirements specification
    Srs,
    /// Functional / non-functional requirements list
    Frnfr,
}

impl SpecKind {
    pub const ALL: [SpecKind; 2] = [SpecKind::Srs, SpecKind::Frnfr];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecKind::Srs => "srs",
            SpecKind::Frnfr => "frnfr",
        }
    }

    pub fn fragment_name(&self) -> &'static str {
        match self {
            SpecKind::Srs => "2_srs",
            SpecKind::Frnfr => "2_frnfr",
        }
    }
}

impl FromStr for SpecKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srs" => Ok(SpecKind::Srs),
            "frnfr" => Ok(SpecKind::Frnfr),
            other => Err(ValidationError::InvalidValue {
                field: "spec".to_string(),
                reason: format!("'{}' is not one of srs, frnfr", other),
            }),
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fragment names needed for a tag pair, in assembly order.
pub fn fragment_names(arch: Architecture, spec: SpecKind) -> [&'static str; 4] {
    [
        TASK_DESCRIPTION_FRAGMENT,
        spec.fragment_name(),
        arch.fragment_name(),
        FINAL_INSTRUCTIONS_FRAGMENT,
    ]
}

/// Fragments that were required but not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Missing prompt fragments: {}", .missing.join(", "))]
pub struct MissingFragments {
    pub missing: Vec<String>,
}

/// Join the fragments for `arch`/`spec` in their fixed order.
///
/// `fragments` maps fragment name to body; extra entries are ignored.
pub fn assemble(
    arch: Architecture,
    spec: SpecKind,
    fragments: &HashMap<String, String>,
) -> Result<String, MissingFragments> {
    let names = fragment_names(arch, spec);

    let missing: Vec<String> = names
        .iter()
        .filter(|name| !fragments.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MissingFragments { missing });
    }

    let bodies: Vec<&str> = names
        .iter()
        .filter_map(|name| fragments.get(*name).map(String::as_str))
        .collect();
    Ok(bodies.join(FRAGMENT_SEPARATOR))
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arch_strategy() -> impl Strategy<Value = Architecture> {
        prop::sample::select(Architecture::ALL.to_vec())
    }

    fn spec_strategy() -> impl Strategy<Value = SpecKind> {
        prop::sample::select(SpecKind::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// With every fragment stored the output is the four bodies joined by blank lines.
        #[test]
        fn prop_assembly_joins_in_fixed_order(
            arch in arch_strategy(),
            spec in spec_strategy(),
            bodies in prop::collection::vec(".{0,30}", 4),
        ) {
            let names = fragment_names(arch, spec);
            let fragments: HashMap<String, String> = names
                .iter()
                .zip(bodies.iter())
                .map(|(n, b)| (n.to_string(), b.clone()))
                .collect();

            let prompt = assemble(arch, spec, &fragments).unwrap();
            prop_assert_eq!(prompt, bodies.join("\n\n"));
        }

        /// Dropping any subset of required fragments reports exactly that subset.
        #[test]
        fn prop_missing_fragments_reported(
            arch in arch_strategy(),
            spec in spec_strategy(),
            keep in prop::collection::vec(any::<bool>(), 4),
        ) {
            prop_assume!(keep.iter().any(|k| !k));
            let names = fragment_names(arch, spec);
            let fragments: HashMap<String, String> = names
                .iter()
                .zip(keep.iter())
                .filter(|(_, k)| **k)
                .map(|(n, _)| (n.to_string(), "body".to_string()))
                .collect();
            let expected: Vec<String> = names
                .iter()
                .zip(keep.iter())
                .filter(|(_, k)| !**k)
                .map(|(n, _)| n.to_string())
                .collect();

            let err = assemble(arch, spec, &fragments).unwrap_err();
            prop_assert_eq!(err.missing, expected);
        }
    }
}
