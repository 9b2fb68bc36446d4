//! Controlled form state for prints, burial records and notices
//!
//! Forms validate locally, then the owning dashboard uploads the optional
//! image and submits the payload built here.

use crate::api::ImageFile;
use crate::calendar;
use crate::error::{CoreError, Result};
use crate::ledger::Totals;
use crate::models::{
    CemeteryPayload, CemeteryRecord, Notice, NoticeKind, NoticePayload, PrintPayload, PrintRecord,
};

pub const REQUIRED_FIELDS: &str = "Please fill required fields";

/// Image URL to submit: a fresh upload wins, else the URL already stored
pub fn resolve_image(uploaded: Option<String>, existing: Option<&str>) -> Option<String> {
    uploaded
        .filter(|u| !u.is_empty())
        .or_else(|| existing.filter(|e| !e.is_empty()).map(str::to_string))
}

// ===== Print form =====

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrintForm {
    pub client_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub total_pages: f64,
    pub charge_per_page: f64,
    pub cost_per_page: f64,
    /// Newly selected file, uploaded on submit
    pub image: Option<ImageFile>,
    /// Image URL of the record being edited
    pub existing_image: Option<String>,
}

impl PrintForm {
    pub fn from_record(record: &PrintRecord) -> Self {
        Self {
            client_name: record.client_name.clone(),
            address: record.address.clone().unwrap_or_default(),
            phone: record.phone.clone().unwrap_or_default(),
            email: record.email.clone().unwrap_or_default(),
            total_pages: record.total_pages,
            charge_per_page: record.charge_per_page,
            cost_per_page: record.cost_per_page,
            image: None,
            existing_image: record.image().map(str::to_string),
        }
    }

    /// Live totals shown while typing
    pub fn preview(&self) -> Totals {
        Totals::compute(self.total_pages, self.charge_per_page, self.cost_per_page)
    }

    /// Client name and all three numbers must be non-zero
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty()
            || self.total_pages == 0.0
            || self.charge_per_page == 0.0
            || self.cost_per_page == 0.0
        {
            return Err(CoreError::validation(REQUIRED_FIELDS));
        }
        Ok(())
    }

    /// Payload with totals derived exactly as [`preview`](Self::preview)
    pub fn to_payload(&self, uploaded: Option<String>) -> PrintPayload {
        let totals = self.preview();
        PrintPayload {
            client_name: self.client_name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            total_pages: self.total_pages,
            charge_per_page: self.charge_per_page,
            cost_per_page: self.cost_per_page,
            total_charge: totals.total_charge,
            total_cost: totals.total_cost,
            profit: totals.profit,
            image: resolve_image(uploaded, self.existing_image.as_deref()),
        }
    }

    /// Clears the fields the dashboard resets after a save
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ===== Burial record form =====

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordForm {
    pub name: String,
    pub address: String,
    pub age: String,
    pub birth_date: String,
    pub death_date: String,
    pub is_native: bool,
    pub father_name: String,
    pub mother_name: String,
    pub guardian_name: String,
    pub grave_number: String,
    pub gender: String,
    pub where_died: String,
    pub description: String,
    pub image: Option<ImageFile>,
    pub existing_image: Option<String>,
    /// Advisory list of unused grave numbers for the selector
    pub grave_options: Vec<String>,
}

impl RecordForm {
    pub fn from_record(record: &CemeteryRecord) -> Self {
        Self {
            name: record.name.clone(),
            address: record.address.clone().unwrap_or_default(),
            age: record
                .age
                .map(crate::ledger::format_amount)
                .unwrap_or_default(),
            birth_date: calendar::input_date(record.birth_date.as_deref()),
            death_date: calendar::input_date(record.death_date.as_deref()),
            is_native: record.is_native(),
            father_name: record.father_name.clone().unwrap_or_default(),
            mother_name: record.mother_name.clone().unwrap_or_default(),
            guardian_name: record.guardian_name.clone().unwrap_or_default(),
            grave_number: record.grave_number.clone().unwrap_or_default(),
            gender: record.gender.clone().unwrap_or_default(),
            where_died: record.where_died.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            image: None,
            existing_image: record.image.clone().filter(|i| !i.is_empty()),
            grave_options: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.grave_number.trim().is_empty() {
            return Err(CoreError::validation(REQUIRED_FIELDS));
        }
        if !self.age.trim().is_empty() && self.age.trim().parse::<f64>().is_err() {
            return Err(CoreError::validation("Age must be a number"));
        }
        Ok(())
    }

    pub fn to_payload(&self, uploaded: Option<String>) -> CemeteryPayload {
        CemeteryPayload {
            name: self.name.trim().to_string(),
            address: self.address.clone(),
            age: self.age.trim().parse::<f64>().ok(),
            birth_date: self.birth_date.clone(),
            death_date: self.death_date.clone(),
            is_native: self.is_native,
            father_name: self.father_name.clone(),
            mother_name: self.mother_name.clone(),
            guardian_name: self.guardian_name.clone(),
            image: resolve_image(uploaded, self.existing_image.as_deref()).unwrap_or_default(),
            grave_number: self.grave_number.trim().to_string(),
            gender: self.gender.clone(),
            where_died: self.where_died.clone(),
            description: self.description.clone(),
        }
    }
}

// ===== Notice form =====

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeForm {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub kind: NoticeKind,
    pub image: Option<ImageFile>,
    pub existing_image: Option<String>,
}

impl NoticeForm {
    pub fn from_notice(notice: &Notice) -> Self {
        Self {
            title: notice.title.clone(),
            description: notice.description.clone(),
            date: calendar::input_date(notice.date.as_deref()),
            kind: notice.kind,
            image: None,
            existing_image: notice.image().map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.date.trim().is_empty()
        {
            return Err(CoreError::validation(REQUIRED_FIELDS));
        }
        Ok(())
    }

    pub fn to_payload(&self, uploaded: Option<String>) -> NoticePayload {
        NoticePayload {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            date: self.date.trim().to_string(),
            image: resolve_image(uploaded, self.existing_image.as_deref()).unwrap_or_default(),
            kind: self.kind,
        }
    }

    /// Back to an empty "notice" form after a successful create
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print_form() -> PrintForm {
        PrintForm {
            client_name: "Amin".to_string(),
            total_pages: 10.0,
            charge_per_page: 5.0,
            cost_per_page: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_preview_matches_payload() {
        let form = print_form();
        let preview = form.preview();
        let payload = form.to_payload(None);
        assert_eq!(preview.total_charge, payload.total_charge);
        assert_eq!(preview.total_cost, payload.total_cost);
        assert_eq!(preview.profit, payload.profit);
        assert_eq!(payload.profit, 20.0);
        assert!(payload.image.is_none());
    }

    #[test]
    fn test_print_validation() {
        assert!(print_form().validate().is_ok());

        let mut form = print_form();
        form.cost_per_page = 0.0;
        let err = form.validate().unwrap_err();
        assert_eq!(err.alert_message(), REQUIRED_FIELDS);

        let mut form = print_form();
        form.client_name = "  ".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_edit_keeps_existing_image() {
        let record = PrintRecord {
            client_name: "Amin".to_string(),
            image: Some("https://img/old.png".to_string()),
            ..Default::default()
        };
        let form = PrintForm::from_record(&record);
        assert_eq!(
            form.to_payload(None).image.as_deref(),
            Some("https://img/old.png")
        );
        assert_eq!(
            form.to_payload(Some("https://img/new.png".to_string()))
                .image
                .as_deref(),
            Some("https://img/new.png")
        );
    }

    #[test]
    fn test_record_form_roundtrip_from_record() {
        let record = CemeteryRecord {
            id: "r1".to_string(),
            name: "Abdul Karim".to_string(),
            age: Some(72.0),
            birth_date: Some("1950-02-01T00:00:00.000Z".to_string()),
            grave_number: Some("B12".to_string()),
            is_native: Some(true),
            ..Default::default()
        };
        let form = RecordForm::from_record(&record);
        assert_eq!(form.age, "72");
        assert_eq!(form.birth_date, "1950-02-01");
        assert!(form.validate().is_ok());

        let payload = form.to_payload(None);
        assert_eq!(payload.age, Some(72.0));
        assert_eq!(payload.grave_number, "B12");
        assert_eq!(payload.image, "");
    }

    #[test]
    fn test_record_form_validation() {
        let form = RecordForm {
            name: "X".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_err());

        let form = RecordForm {
            name: "X".to_string(),
            grave_number: "A1".to_string(),
            age: "old".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err().alert_message(), "Age must be a number");
    }

    #[test]
    fn test_notice_form() {
        let notice = Notice {
            id: "n1".to_string(),
            title: "Eid prayer".to_string(),
            description: "Morning".to_string(),
            date: Some("2024-04-10T00:00:00.000Z".to_string()),
            kind: NoticeKind::Event,
            image: Some("https://img/eid.png".to_string()),
            ..Default::default()
        };
        let form = NoticeForm::from_notice(&notice);
        assert_eq!(form.date, "2024-04-10");
        assert!(form.validate().is_ok());

        let payload = form.to_payload(None);
        assert_eq!(payload.kind, NoticeKind::Event);
        assert_eq!(payload.image, "https://img/eid.png");

        let mut form = form;
        form.reset();
        assert_eq!(form.kind, NoticeKind::Notice);
        assert!(form.validate().is_err());
    }
}
