use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_json, require, FormErrors, FIELD_REQUIRED};
use crate::age::{AgeRange, CompositeAge};
use crate::forms::ValidationError;

pub const STRUCTURE_INVALID_JSON: &str = "Save failed due to invalid JSON! Please use valid JSON and save again. If you reload this page, all changes will be lost.";
pub const BUILD_INVALID_JSON: &str = "Invalid JSON";

/// Study metadata a researcher edits. Missing fields deserialize to their
/// defaults and are reported by [`StudyEditForm::clean`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyEditForm {
    pub name: String,
    pub image: Option<String>,
    pub short_description: String,
    pub long_description: String,
    pub exit_url: Option<String>,
    pub criteria: String,
    pub min_age_days: u32,
    pub min_age_months: u32,
    pub min_age_years: u32,
    pub max_age_days: u32,
    pub max_age_months: u32,
    pub max_age_years: u32,
    pub duration: String,
    pub contact_info: String,
    pub public: bool,
}

impl StudyEditForm {
    pub fn age_range(&self) -> AgeRange {
        AgeRange::new(
            CompositeAge::new(self.min_age_years, self.min_age_months, self.min_age_days),
            CompositeAge::new(self.max_age_years, self.max_age_months, self.max_age_days),
        )
    }

    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result(())
    }

    fn collect_errors(&self, errors: &mut FormErrors) {
        require(errors, "name", &self.name);
        require(errors, "short_description", &self.short_description);
        require(errors, "long_description", &self.long_description);
        require(errors, "criteria", &self.criteria);
        require(errors, "duration", &self.duration);
        require(errors, "contact_info", &self.contact_info);

        if let Err(e) = self.age_range().validate() {
            errors.add_non_field(e);
        }
    }
}

/// Human readable label for a study field, as shown to researchers.
pub fn field_label(field: &str) -> Option<&'static str> {
    Some(match field {
        "name" => "Name",
        "image" => "Image",
        "short_description" => "Short Description",
        "long_description" => "Purpose",
        "exit_url" => "Exit URL",
        "criteria" => "Participant Eligibility",
        "duration" => "Duration",
        "contact_info" => "Researcher Contact Information",
        "public" => "Discoverable - Do you want this study to be publicly discoverable on Lookit once activated?",
        "structure" => "Build Study - Add JSON",
        "study_type" => "Study Type",
        _ => return None,
    })
}

/// Form used to create a study: metadata plus the experiment structure and
/// the study type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyForm {
    #[serde(flatten)]
    pub study: StudyEditForm,
    pub structure: String,
    pub study_type: Option<i64>,
}

/// A [`StudyForm`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedStudy {
    pub study: StudyEditForm,
    pub structure: Value,
    pub study_type: i64,
}

impl StudyForm {
    pub fn clean(self) -> Result<CleanedStudy, FormErrors> {
        let mut errors = FormErrors::new();

        let structure = match parse_json(&self.structure, STRUCTURE_INVALID_JSON) {
            Ok(value) => Some(value),
            Err(e) => {
                errors.add("structure", e);
                None
            }
        };

        if self.study_type.is_none() {
            errors.add("study_type", ValidationError::new(FIELD_REQUIRED));
        }

        self.study.collect_errors(&mut errors);

        match (structure, self.study_type) {
            (Some(structure), Some(study_type)) if errors.is_empty() => Ok(CleanedStudy {
                study: self.study,
                structure,
                study_type,
            }),
            _ => Err(errors),
        }
    }
}

/// Form used to replace only the structure of an existing study.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyBuildForm {
    pub structure: String,
}

impl StudyBuildForm {
    pub fn clean(self) -> Result<Value, FormErrors> {
        parse_json(&self.structure, BUILD_INVALID_JSON).map_err(|e| {
            let mut errors = FormErrors::new();
            errors.add("structure", e);
            errors
        })
    }
}
