//! Credit application payload accepted by the prediction routes.

use std::convert::TryFrom;

use credence_features::table::{Record, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Y,
    N,
}

/// A 0/1 indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Flag {
    No,
    Yes,
}

impl TryFrom<u8> for Flag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Flag::No),
            1 => Ok(Flag::Yes),
            other => Err(format!("flag must be 0 or 1, got {}", other)),
        }
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::No => 0,
            Flag::Yes => 1,
        }
    }
}

/// One applicant. Every field may be omitted or null; absent values are
/// imputed by the served transformer.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub CODE_GENDER: Option<Gender>,
    #[serde(default)]
    pub FLAG_OWN_CAR: Option<YesNo>,
    #[serde(default)]
    pub FLAG_OWN_REALTY: Option<YesNo>,
    #[serde(default)]
    pub CNT_CHILDREN: Option<i64>,
    #[serde(default)]
    pub AMT_INCOME_TOTAL: Option<f64>,
    #[serde(default)]
    pub NAME_INCOME_TYPE: Option<String>,
    #[serde(default)]
    pub NAME_EDUCATION_TYPE: Option<String>,
    #[serde(default)]
    pub NAME_FAMILY_STATUS: Option<String>,
    #[serde(default)]
    pub NAME_HOUSING_TYPE: Option<String>,
    #[serde(default)]
    pub DAYS_BIRTH: Option<i64>,
    #[serde(default)]
    pub DAYS_EMPLOYED: Option<i64>,
    #[serde(default)]
    pub FLAG_MOBIL: Option<Flag>,
    #[serde(default)]
    pub FLAG_WORK_PHONE: Option<Flag>,
    #[serde(default)]
    pub FLAG_PHONE: Option<Flag>,
    #[serde(default)]
    pub FLAG_EMAIL: Option<Flag>,
    #[serde(default)]
    pub OCCUPATION_TYPE: Option<String>,
    #[serde(default)]
    pub CNT_FAM_MEMBERS: Option<i64>,
}

fn gender(v: Gender) -> Value {
    match v {
        Gender::M => "M".into(),
        Gender::F => "F".into(),
    }
}

fn yes_no(v: YesNo) -> Value {
    match v {
        YesNo::Y => "Y".into(),
        YesNo::N => "N".into(),
    }
}

fn flag(v: Flag) -> Value {
    Value::from(f64::from(u8::from(v)))
}

impl Observation {
    /// Feature record with one entry per field; absent fields become
    /// `Value::Missing` so the column still exists.
    pub fn into_record(self) -> Record {
        let entries: [(&str, Value); 17] = [
            ("CODE_GENDER", self.CODE_GENDER.map(gender).into()),
            ("FLAG_OWN_CAR", self.FLAG_OWN_CAR.map(yes_no).into()),
            ("FLAG_OWN_REALTY", self.FLAG_OWN_REALTY.map(yes_no).into()),
            ("CNT_CHILDREN", self.CNT_CHILDREN.into()),
            ("AMT_INCOME_TOTAL", self.AMT_INCOME_TOTAL.into()),
            ("NAME_INCOME_TYPE", self.NAME_INCOME_TYPE.into()),
            ("NAME_EDUCATION_TYPE", self.NAME_EDUCATION_TYPE.into()),
            ("NAME_FAMILY_STATUS", self.NAME_FAMILY_STATUS.into()),
            ("NAME_HOUSING_TYPE", self.NAME_HOUSING_TYPE.into()),
            ("DAYS_BIRTH", self.DAYS_BIRTH.into()),
            ("DAYS_EMPLOYED", self.DAYS_EMPLOYED.into()),
            ("FLAG_MOBIL", self.FLAG_MOBIL.map(flag).into()),
            ("FLAG_WORK_PHONE", self.FLAG_WORK_PHONE.map(flag).into()),
            ("FLAG_PHONE", self.FLAG_PHONE.map(flag).into()),
            ("FLAG_EMAIL", self.FLAG_EMAIL.map(flag).into()),
            ("OCCUPATION_TYPE", self.OCCUPATION_TYPE.into()),
            ("CNT_FAM_MEMBERS", self.CNT_FAM_MEMBERS.into()),
        ];
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}
