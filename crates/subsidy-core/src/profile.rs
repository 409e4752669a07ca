//! Company profile collected from the form
//!
//! The profile is replaced wholesale on every edit: `set_field` returns a new
//! value and leaves the original untouched.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    self, EQUIPMENT_CATEGORIES, IMPLEMENTATION_TIMES, INDUSTRIES, MEASURE_CATEGORIES,
};
use crate::error::{Error, Result};

/// A company's energy-usage profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub contact_phone: String,
    pub tax_id: String,
    pub industry: String,
    /// Annual electricity bill (NTD)
    pub annual_electricity_bill: f64,
    /// Planned project budget (NTD)
    pub estimated_budget: f64,
    pub project_equipment_type: String,
    pub project_measure_type: String,
    #[serde(default = "default_implementation_time")]
    pub implementation_time: String,
}

fn default_implementation_time() -> String {
    IMPLEMENTATION_TIMES[0].to_string()
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            contact_phone: String::new(),
            tax_id: String::new(),
            industry: INDUSTRIES[0].to_string(),
            annual_electricity_bill: 0.0,
            estimated_budget: 0.0,
            project_equipment_type: EQUIPMENT_CATEGORIES[0].to_string(),
            project_measure_type: MEASURE_CATEGORIES[0].to_string(),
            implementation_time: IMPLEMENTATION_TIMES[0].to_string(),
        }
    }
}

/// Storage type of a profile field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// Profile fields addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    ContactPhone,
    TaxId,
    Industry,
    AnnualElectricityBill,
    EstimatedBudget,
    ProjectEquipmentType,
    ProjectMeasureType,
    ImplementationTime,
}

impl ProfileField {
    /// Wire name (camelCase, as used by the form and the JSON API)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContactPhone => "contactPhone",
            Self::TaxId => "taxId",
            Self::Industry => "industry",
            Self::AnnualElectricityBill => "annualElectricityBill",
            Self::EstimatedBudget => "estimatedBudget",
            Self::ProjectEquipmentType => "projectEquipmentType",
            Self::ProjectMeasureType => "projectMeasureType",
            Self::ImplementationTime => "implementationTime",
        }
    }

    pub fn all() -> &'static [ProfileField] {
        &[
            Self::ContactPhone,
            Self::TaxId,
            Self::Industry,
            Self::AnnualElectricityBill,
            Self::EstimatedBudget,
            Self::ProjectEquipmentType,
            Self::ProjectMeasureType,
            Self::ImplementationTime,
        ]
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::AnnualElectricityBill | Self::EstimatedBudget => FieldKind::Number,
            _ => FieldKind::Text,
        }
    }

    /// Catalog the field's value must come from, if it is a select field
    pub fn catalog(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Industry => Some(INDUSTRIES),
            Self::ProjectEquipmentType => Some(EQUIPMENT_CATEGORIES),
            Self::ProjectMeasureType => Some(MEASURE_CATEGORIES),
            Self::ImplementationTime => Some(IMPLEMENTATION_TIMES),
            _ => None,
        }
    }
}

impl std::str::FromStr for ProfileField {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "contactPhone" | "contact_phone" => Ok(Self::ContactPhone),
            "taxId" | "tax_id" => Ok(Self::TaxId),
            "industry" => Ok(Self::Industry),
            "annualElectricityBill" | "annual_electricity_bill" => {
                Ok(Self::AnnualElectricityBill)
            }
            "estimatedBudget" | "estimated_budget" => Ok(Self::EstimatedBudget),
            "projectEquipmentType" | "project_equipment_type" => Ok(Self::ProjectEquipmentType),
            "projectMeasureType" | "project_measure_type" => Ok(Self::ProjectMeasureType),
            "implementationTime" | "implementation_time" => Ok(Self::ImplementationTime),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coerce a raw form value into a number
///
/// An empty input counts as zero, matching how a browser number input
/// reports a cleared field.
pub fn coerce_number(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidProfile(format!("not a number: {}", raw)))
}

impl CompanyProfile {
    /// Return a copy of this profile with one field replaced
    ///
    /// Numeric fields are coerced to numbers; every other field is stored as
    /// the raw string.
    pub fn set_field(&self, field: ProfileField, raw: &str) -> Result<Self> {
        let mut next = self.clone();
        match field {
            ProfileField::ContactPhone => next.contact_phone = raw.to_string(),
            ProfileField::TaxId => next.tax_id = raw.to_string(),
            ProfileField::Industry => next.industry = raw.to_string(),
            ProfileField::AnnualElectricityBill => {
                next.annual_electricity_bill = coerce_number(raw)?
            }
            ProfileField::EstimatedBudget => next.estimated_budget = coerce_number(raw)?,
            ProfileField::ProjectEquipmentType => next.project_equipment_type = raw.to_string(),
            ProfileField::ProjectMeasureType => next.project_measure_type = raw.to_string(),
            ProfileField::ImplementationTime => next.implementation_time = raw.to_string(),
        }
        Ok(next)
    }

    /// Like `set_field`, resolving the field from its wire name
    pub fn set_field_by_name(&self, name: &str, raw: &str) -> Result<Self> {
        let field: ProfileField = name.parse()?;
        self.set_field(field, raw)
    }

    /// Current value of a field, rendered as a string
    pub fn field_value(&self, field: ProfileField) -> String {
        match field {
            ProfileField::ContactPhone => self.contact_phone.clone(),
            ProfileField::TaxId => self.tax_id.clone(),
            ProfileField::Industry => self.industry.clone(),
            ProfileField::AnnualElectricityBill => format_number(self.annual_electricity_bill),
            ProfileField::EstimatedBudget => format_number(self.estimated_budget),
            ProfileField::ProjectEquipmentType => self.project_equipment_type.clone(),
            ProfileField::ProjectMeasureType => self.project_measure_type.clone(),
            ProfileField::ImplementationTime => self.implementation_time.clone(),
        }
    }

    /// Check the profile before it is submitted
    pub fn validate(&self) -> Result<()> {
        if self.tax_id.trim().is_empty() {
            return Err(Error::InvalidProfile("公司統編為必填".into()));
        }

        for (label, value) in [
            ("年平均電費", self.annual_electricity_bill),
            ("預計投入預算", self.estimated_budget),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidProfile(format!("{}不可為負數", label)));
            }
        }

        for field in ProfileField::all() {
            if let Some(options) = field.catalog() {
                let value = self.field_value(*field);
                if !catalog::contains(options, &value) {
                    return Err(Error::InvalidProfile(format!(
                        "{} 不在選項清單中: {}",
                        field, value
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Format a number without a trailing ".0" for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
