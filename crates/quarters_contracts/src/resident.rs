#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::unit::HouseDetails;
use crate::{ContractViolation, SchemaVersion, Validate};

pub const RESIDENT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

fn validate_token(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ContractViolation> {
    if value.is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be non-empty",
        });
    }
    if value.len() > max_len {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "exceeds max length",
        });
    }
    if value
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.'))
    {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must contain token-safe ASCII only",
        });
    }
    Ok(())
}

fn validate_text(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ContractViolation> {
    if value.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be non-empty",
        });
    }
    if value.len() > max_len {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "exceeds max length",
        });
    }
    Ok(())
}

fn validate_email(field: &'static str, value: &str) -> Result<(), ContractViolation> {
    validate_text(field, value, 120)?;
    if !value.contains('@') {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must contain '@'",
        });
    }
    Ok(())
}

fn validate_contact(field: &'static str, value: &str) -> Result<(), ContractViolation> {
    validate_text(field, value, 20)?;
    if value
        .chars()
        .any(|c| !(c.is_ascii_digit() || c == '+' || c == '-' || c == ' '))
    {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must contain digits, '+', '-' or spaces only",
        });
    }
    Ok(())
}

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ResidentId(String);

impl ResidentId {
    pub fn new(value: &str) -> Result<Self, ContractViolation> {
        validate_token("resident_id", value, 64)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidentRole {
    Resident,
    Committee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRecord {
    pub name: String,
    pub age: u8,
}

impl Validate for ChildRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_text("child_record.name", &self.name, 120)?;
        if self.age > 30 {
            return Err(ContractViolation::InvalidRange {
                field: "child_record.age",
                min: 0,
                max: 30,
                got: self.age as i64,
            });
        }
        Ok(())
    }
}

/// A portal account row. Committee members carry no house assignment; the
/// unit-occupancy subsystem only ever assigns units to `Resident` accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentProfile {
    pub schema_version: SchemaVersion,
    pub id: ResidentId,
    pub full_name: String,
    pub police_id: String,
    pub rank: String,
    pub contact_number: String,
    pub email: String,
    pub role: ResidentRole,
    pub house_number: Option<HouseDetails>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub children: Vec<ChildRecord>,
}

impl ResidentProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        id: ResidentId,
        full_name: String,
        police_id: String,
        rank: String,
        contact_number: String,
        email: String,
        role: ResidentRole,
        house_number: Option<HouseDetails>,
        marital_status: Option<String>,
        spouse_name: Option<String>,
        children: Vec<ChildRecord>,
    ) -> Result<Self, ContractViolation> {
        let profile = Self {
            schema_version: RESIDENT_CONTRACT_VERSION,
            id,
            full_name,
            police_id,
            rank,
            contact_number,
            email,
            role,
            house_number,
            marital_status,
            spouse_name,
            children,
        };
        profile.validate()?;
        Ok(profile)
    }
}

impl Validate for ResidentProfile {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != RESIDENT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "resident_profile.schema_version",
                reason: "must match RESIDENT_CONTRACT_VERSION",
            });
        }
        validate_text("resident_profile.full_name", &self.full_name, 120)?;
        validate_token("resident_profile.police_id", &self.police_id, 32)?;
        validate_text("resident_profile.rank", &self.rank, 48)?;
        validate_contact("resident_profile.contact_number", &self.contact_number)?;
        validate_email("resident_profile.email", &self.email)?;
        if self.role == ResidentRole::Committee && self.house_number.is_some() {
            return Err(ContractViolation::InvalidValue {
                field: "resident_profile.house_number",
                reason: "must be None for committee accounts",
            });
        }
        if let Some(house) = &self.house_number {
            house.validate()?;
        }
        if let Some(status) = &self.marital_status {
            validate_text("resident_profile.marital_status", status, 24)?;
        }
        if let Some(spouse) = &self.spouse_name {
            validate_text("resident_profile.spouse_name", spouse, 120)?;
        }
        if self.children.len() > 16 {
            return Err(ContractViolation::InvalidValue {
                field: "resident_profile.children",
                reason: "must contain <= 16 entries",
            });
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }
}

/// Partial profile update. `Some(...)` replaces the field; `None` leaves it
/// untouched. The house assignment moves through the occupancy sync service,
/// never through a raw directory write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentProfileUpdate {
    pub full_name: Option<String>,
    pub rank: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub house_number: Option<HouseDetails>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub children: Option<Vec<ChildRecord>>,
}

impl ResidentProfileUpdate {
    pub fn apply_to(&self, profile: &mut ResidentProfile) {
        if let Some(full_name) = &self.full_name {
            profile.full_name = full_name.clone();
        }
        if let Some(rank) = &self.rank {
            profile.rank = rank.clone();
        }
        if let Some(contact_number) = &self.contact_number {
            profile.contact_number = contact_number.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(house_number) = &self.house_number {
            profile.house_number = Some(house_number.clone());
        }
        if let Some(marital_status) = &self.marital_status {
            profile.marital_status = Some(marital_status.clone());
        }
        if let Some(spouse_name) = &self.spouse_name {
            profile.spouse_name = Some(spouse_name.clone());
        }
        if let Some(children) = &self.children {
            profile.children = children.clone();
        }
    }
}

impl Validate for ResidentProfileUpdate {
    fn validate(&self) -> Result<(), ContractViolation> {
        if let Some(full_name) = &self.full_name {
            validate_text("resident_profile_update.full_name", full_name, 120)?;
        }
        if let Some(rank) = &self.rank {
            validate_text("resident_profile_update.rank", rank, 48)?;
        }
        if let Some(contact_number) = &self.contact_number {
            validate_contact("resident_profile_update.contact_number", contact_number)?;
        }
        if let Some(email) = &self.email {
            validate_email("resident_profile_update.email", email)?;
        }
        if let Some(house_number) = &self.house_number {
            house_number.validate()?;
        }
        if let Some(marital_status) = &self.marital_status {
            validate_text("resident_profile_update.marital_status", marital_status, 24)?;
        }
        if let Some(spouse_name) = &self.spouse_name {
            validate_text("resident_profile_update.spouse_name", spouse_name, 120)?;
        }
        if let Some(children) = &self.children {
            if children.len() > 16 {
                return Err(ContractViolation::InvalidValue {
                    field: "resident_profile_update.children",
                    reason: "must contain <= 16 entries",
                });
            }
            for child in children {
                child.validate()?;
            }
        }
        Ok(())
    }
}
