//! Typed access to url-encoded bodies and query strings, and the
//! conversions from submitted forms to domain inputs.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::disaster::NewDisaster;
use crate::domain::need::{NeedDetails, NeedUpdate, NewNeed, ProblemDetails, ProblemSeverity, ServiceDetails};
use crate::domain::report::{NewReport, ReportReview};
use crate::domain::resource::{NewOrganization, NewResource};
use crate::domain::status::{Priority, Severity};
use crate::domain::target::Target;
use crate::errors::ServerError;

#[derive(Debug, Clone, Default)]
pub struct Form(HashMap<String, String>);

impl Form {
    pub fn parse(bytes: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(bytes).into_owned().collect())
    }

    /// Trimmed value; blank counts as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Checkbox semantics: present and not "off"/"false"/"0".
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| !matches!(v, "off" | "false" | "0"))
    }

    pub fn required<T>(&self, key: &str) -> Result<T, ServerError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key)?
            .ok_or_else(|| ServerError::BadRequest(format!("missing '{key}'")))
    }

    pub fn optional<T>(&self, key: &str) -> Result<Option<T>, ServerError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| ServerError::BadRequest(format!("invalid '{key}': {e}")))
            })
            .transpose()
    }

    /// For edits: `None` when the field was not submitted at all,
    /// `Some(None)` when it was submitted blank.
    pub fn edit<T>(&self, key: &str) -> Result<Option<Option<T>>, ServerError>
    where
        T: FromStr,
        T::Err: Display,
    {
        if self.contains(key) {
            self.optional(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn edit_text(&self, key: &str) -> Option<String> {
        self.contains(key).then(|| self.text(key))
    }

    /// Calendar date as `YYYY-MM-DD`.
    pub fn date(&self, key: &str) -> Result<Option<String>, ServerError> {
        self.get(key)
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .map_err(|_| ServerError::BadRequest(format!("'{key}' must be a YYYY-MM-DD date")))
            })
            .transpose()
    }

    fn coordinate(&self, key: &str, limit: f64) -> Result<Option<f64>, ServerError> {
        match self.optional::<f64>(key)? {
            Some(v) if !(-limit..=limit).contains(&v) => {
                Err(ServerError::BadRequest(format!("'{key}' out of range")))
            }
            v => Ok(v),
        }
    }
}

pub fn new_need(form: &Form, reporter: i64) -> Result<NewNeed, ServerError> {
    let mut need = NewNeed::new(form.required("disaster")?, &form.text("title"), &form.text("description"));
    need.category_id = form.optional("category")?;
    need.location = form.text("location");
    need.latitude = form.coordinate("latitude", 90.0)?;
    need.longitude = form.coordinate("longitude", 180.0)?;
    need.city = form.text("city");
    need.contact_person = form.text("contact_person");
    need.contact_phone = form.text("contact_phone");
    need.priority = form.optional("priority")?.unwrap_or(Priority::Medium);
    need.reported_by = Some(reporter);
    need.details = need_details(form)?;
    Ok(need)
}

fn need_details(form: &Form) -> Result<Option<NeedDetails>, ServerError> {
    match form.get("details") {
        None => Ok(None),
        Some("problem") => Ok(Some(NeedDetails::Problem(ProblemDetails {
            id: 0,
            need_id: 0,
            severity: form.optional("severity")?.unwrap_or(ProblemSeverity::Moderate),
            affected_population: form.optional("affected_population")?,
            infrastructure_type: form.text("infrastructure_type"),
            estimated_repair_cost: form.optional("estimated_repair_cost")?,
            repair_time_estimate: form.text("repair_time_estimate"),
            blocks_access_to: form.text("blocks_access_to"),
        }))),
        Some("service") => Ok(Some(NeedDetails::Service(ServiceDetails {
            id: 0,
            need_id: 0,
            service_type: form.required("service_type")?,
            capacity: form.optional("capacity")?,
            current_occupancy: form.optional("current_occupancy")?.unwrap_or(0),
            operating_hours: form.text("operating_hours"),
            start_date: form.date("start_date")?,
            end_date: form.date("end_date")?,
            eligibility_criteria: form.text("eligibility_criteria"),
            requirements: form.text("requirements"),
            provider_organization_id: form.optional("provider_organization")?,
        }))),
        Some(other) => Err(ServerError::BadRequest(format!("unknown details kind '{other}'"))),
    }
}

/// Only submitted fields end up in the update.
pub fn need_update(form: &Form) -> Result<NeedUpdate, ServerError> {
    Ok(NeedUpdate {
        title: form.edit_text("title"),
        description: form.edit_text("description"),
        location: form.edit_text("location"),
        latitude: if form.contains("latitude") {
            Some(form.coordinate("latitude", 90.0)?)
        } else {
            None
        },
        longitude: if form.contains("longitude") {
            Some(form.coordinate("longitude", 180.0)?)
        } else {
            None
        },
        city: form.edit_text("city"),
        contact_person: form.edit_text("contact_person"),
        contact_phone: form.edit_text("contact_phone"),
        priority: form.edit::<Priority>("priority")?.flatten(),
        category_id: form.edit("category")?,
    })
}

/// `as_self` offers in the signed-in user's name; `organization` offers on
/// behalf of an organization. The pair is validated by the workflow.
pub fn new_resource(form: &Form, need_id: i64, user_id: i64) -> Result<NewResource, ServerError> {
    Ok(NewResource {
        need_id,
        provider_user: form.flag("as_self").then_some(user_id),
        provider_organization: form.optional("organization")?,
        description: form.text("description"),
        quantity: form.text("quantity"),
        availability_date: form.date("availability_date")?,
        contact_info: form.text("contact_info"),
    })
}

pub fn new_organization(form: &Form, created_by: i64) -> Result<NewOrganization, ServerError> {
    let mut org = NewOrganization::new(&form.text("name"), form.required("organization_type")?);
    org.description = form.text("description");
    org.contact_person = form.text("contact_person");
    org.phone = form.text("phone");
    org.email = form.text("email");
    org.website = form.text("website");
    org.address = form.text("address");
    org.created_by = Some(created_by);
    Ok(org)
}

pub fn new_disaster(form: &Form) -> Result<NewDisaster, ServerError> {
    Ok(NewDisaster {
        name: form.text("name"),
        slug: form.text("slug").to_ascii_lowercase(),
        description: form.text("description"),
        affected_areas: form.text("affected_areas"),
        severity: form.optional("severity")?.unwrap_or(Severity::Medium),
        start_date: form
            .date("start_date")?
            .ok_or_else(|| ServerError::BadRequest("missing 'start_date'".into()))?,
        end_date: form.date("end_date")?,
        created_by: None,
    })
}

/// Signed-out reporters must leave an email address instead.
pub fn new_report(form: &Form, target: Target, user_id: Option<i64>) -> Result<NewReport, ServerError> {
    let report_type = form.required("report_type")?;
    let description = form.text("description");
    let mut report = match user_id {
        Some(id) => NewReport::by_user(target, id, report_type, &description),
        None => {
            let email = form.text("reporter_email");
            if !email.contains('@') {
                return Err(ServerError::BadRequest(
                    "an email address is required to report without signing in".into(),
                ));
            }
            NewReport::anonymous(target, &email, report_type, &description)
        }
    };
    report.evidence = form.text("evidence");
    Ok(report)
}

pub fn report_review(form: &Form) -> Result<ReportReview, ServerError> {
    let mut review = ReportReview::new(form.required("status")?);
    review.review_notes = form.text("review_notes");
    review.action_taken = form.text("action_taken");
    Ok(review)
}
