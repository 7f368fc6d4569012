//! The patient form: fields, their allowed values and the order they are
//! written in.

use std::ops::RangeInclusive;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use super::record::{CellValue, Record, RecordError};

pub const AGE_RANGE: RangeInclusive<i64> = 18..=120;
pub const DEFAULT_AGE: i64 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    #[default]
    #[strum(to_string = "Male", serialize = "m")]
    Male,
    #[strum(to_string = "Female", serialize = "f")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Species {
    #[default]
    #[strum(to_string = "E. coli", serialize = "e-coli", serialize = "ecoli")]
    EColi,
    #[strum(to_string = "Klebsiella spp.", serialize = "klebsiella")]
    Klebsiella,
    #[strum(to_string = "Proteus spp.", serialize = "proteus")]
    Proteus,
    #[strum(to_string = "Pseudomonas spp.", serialize = "pseudomonas")]
    Pseudomonas,
    #[strum(to_string = "Acinetobacter spp.", serialize = "acinetobacter")]
    Acinetobacter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Setting {
    #[default]
    #[strum(to_string = "ICU")]
    Icu,
    #[strum(to_string = "Internal Medicine", serialize = "internal-medicine")]
    InternalMedicine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Acquisition {
    #[default]
    Community,
    Hospital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum BsiSource {
    #[default]
    Primary,
    Lung,
    Abdomen,
    #[strum(to_string = "UTI")]
    Uti,
}

/// Yes/no answer, stored in the sheet as 1/0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Indicator {
    #[default]
    #[strum(to_string = "No", serialize = "0", serialize = "n", serialize = "false")]
    No,
    #[strum(to_string = "Yes", serialize = "1", serialize = "y", serialize = "true")]
    Yes,
}

impl Indicator {
    pub fn as_int(&self) -> i64 {
        match self {
            Indicator::No => 0,
            Indicator::Yes => 1,
        }
    }
}

impl From<Indicator> for CellValue {
    fn from(value: Indicator) -> Self {
        CellValue::Integer(value.as_int())
    }
}

impl From<bool> for Indicator {
    fn from(value: bool) -> Self {
        if value {
            Indicator::Yes
        } else {
            Indicator::No
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatientRecordError {
    #[error("Age {0} is outside the accepted range 18..=120")]
    AgeOutOfRange(i64),
    #[error("Could not build record: {0}")]
    Record(#[from] RecordError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub age: i64,
    pub gender: Gender,
    pub species: Species,
    pub rectal_cpe_pos: Indicator,
    pub setting: Setting,
    pub acquisition: Acquisition,
    pub bsi_source: BsiSource,
    pub chf: Indicator,
    pub ckd: Indicator,
    pub tumor: Indicator,
    pub diabetes: Indicator,
    pub immunosuppressed: Indicator,
    pub cr: Indicator,
    pub blbli_r: Indicator,
    pub fqr: Indicator,
    pub three_gc_r: Indicator,
}

impl Default for PatientRecord {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            gender: Gender::default(),
            species: Species::default(),
            rectal_cpe_pos: Indicator::default(),
            setting: Setting::default(),
            acquisition: Acquisition::default(),
            bsi_source: BsiSource::default(),
            chf: Indicator::default(),
            ckd: Indicator::default(),
            tumor: Indicator::default(),
            diabetes: Indicator::default(),
            immunosuppressed: Indicator::default(),
            cr: Indicator::default(),
            blbli_r: Indicator::default(),
            fqr: Indicator::default(),
            three_gc_r: Indicator::default(),
        }
    }
}

impl PatientRecord {
    pub fn validate(&self) -> Result<(), PatientRecordError> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(PatientRecordError::AgeOutOfRange(self.age));
        }
        Ok(())
    }

    /// Validates the form and flattens it into column order.
    pub fn to_record(&self) -> Result<Record, PatientRecordError> {
        self.validate()?;

        let fields: [(&str, CellValue); 16] = [
            ("Age", self.age.into()),
            ("Gender", self.gender.to_string().into()),
            ("Species", self.species.to_string().into()),
            ("Rectal_CPE_Pos", self.rectal_cpe_pos.into()),
            ("Setting", self.setting.to_string().into()),
            ("Acquisition", self.acquisition.to_string().into()),
            ("BSI_Source", self.bsi_source.to_string().into()),
            ("CHF", self.chf.into()),
            ("CKD", self.ckd.into()),
            ("Tumor", self.tumor.into()),
            ("Diabetes", self.diabetes.into()),
            ("Immunosuppressed", self.immunosuppressed.into()),
            ("CR", self.cr.into()),
            ("BLBLI_R", self.blbli_r.into()),
            ("FQR", self.fqr.into()),
            ("3GC_R", self.three_gc_r.into()),
        ];

        Ok(Record::from_fields(fields)?)
    }
}

/// Description of one form field, used to print the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub allowed: Vec<String>,
    pub default: String,
}

fn enum_field<E: IntoEnumIterator + Default + std::fmt::Display>(
    column: &'static str,
    label: &'static str,
) -> FieldSpec {
    FieldSpec {
        column,
        label,
        allowed: E::iter().map(|variant| variant.to_string()).collect(),
        default: E::default().to_string(),
    }
}

fn indicator_field(column: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        column,
        label,
        allowed: Indicator::iter()
            .map(|variant| format!("{} ({})", variant.as_int(), variant))
            .collect(),
        default: Indicator::default().as_int().to_string(),
    }
}

pub fn form_schema() -> Vec<FieldSpec> {
    vec![
        FieldSpec {
            column: "Age",
            label: "Age",
            allowed: vec![format!("{}..={}", AGE_RANGE.start(), AGE_RANGE.end())],
            default: DEFAULT_AGE.to_string(),
        },
        enum_field::<Gender>("Gender", "Gender"),
        enum_field::<Species>("Species", "Species"),
        indicator_field("Rectal_CPE_Pos", "Rectal CPE Positive"),
        enum_field::<Setting>("Setting", "Setting"),
        enum_field::<Acquisition>("Acquisition", "Acquisition"),
        enum_field::<BsiSource>("BSI_Source", "BSI Source"),
        indicator_field("CHF", "CHF"),
        indicator_field("CKD", "CKD"),
        indicator_field("Tumor", "Tumor"),
        indicator_field("Diabetes", "Diabetes"),
        indicator_field("Immunosuppressed", "Immunosuppressed"),
        indicator_field("CR", "Carbapenem Resistance (CR)"),
        indicator_field("BLBLI_R", "BL/BLI Resistance"),
        indicator_field("FQR", "Fluoroquinolone Resistance (FQR)"),
        indicator_field("3GC_R", "3rd Gen Cephalosporin Resistance"),
    ]
}
