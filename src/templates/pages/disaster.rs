use crate::domain::disaster::{Category, Disaster};
use crate::domain::need::{NeedSummary, ProblemSeverity, ServiceType};
use crate::domain::status::Priority;
use crate::templates::components::{card, need_list};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct DisasterVm {
    pub disaster: Disaster,
    pub problems: Vec<NeedSummary>,
    pub services: Vec<NeedSummary>,
    pub categories: Vec<Category>,
    pub signed_in: bool,
    pub is_moderator: bool,
}

/// Reporting form. Problem or service details are filled in by the
/// `details` selector; other values leave the need without details.
fn report_form(vm: &DisasterVm) -> Markup {
    html! {
        form method="post" action="/needs" {
            input type="hidden" name="disaster" value=(vm.disaster.id);
            input type="text" name="title" placeholder="Title" required;
            textarea name="description" placeholder="What is happening?" {}
            select name="category" {
                option value="" { "No category" }
                @for c in &vm.categories {
                    option value=(c.id) { (c.name) " (" (c.category_type) ")" }
                }
            }
            select name="priority" {
                @for p in Priority::ALL {
                    option value=(p) selected[*p == Priority::Medium] { (p) }
                }
            }
            input type="text" name="location" placeholder="Location";
            input type="text" name="city" placeholder="City";
            input type="text" name="latitude" placeholder="Latitude";
            input type="text" name="longitude" placeholder="Longitude";
            input type="text" name="contact_person" placeholder="Contact";
            input type="text" name="contact_phone" placeholder="Phone";

            select name="details" {
                option value="" { "No details" }
                option value="problem" { "Problem" }
                option value="service" { "Service" }
            }
            fieldset {
                legend { "Problem" }
                select name="severity" {
                    @for s in ProblemSeverity::ALL {
                        option value=(s) { (s) }
                    }
                }
                input type="number" name="affected_population" placeholder="Affected people";
                input type="text" name="infrastructure_type" placeholder="Infrastructure";
                input type="text" name="blocks_access_to" placeholder="Blocks access to";
            }
            fieldset {
                legend { "Service" }
                select name="service_type" {
                    @for s in ServiceType::ALL {
                        option value=(s) { (s) }
                    }
                }
                input type="number" name="capacity" placeholder="Capacity";
                input type="text" name="operating_hours" placeholder="Hours";
                input type="date" name="start_date";
                input type="date" name="end_date";
                input type="number" name="provider_organization" placeholder="Organization id";
            }
            button type="submit" { "Report" }
        }
    }
}

pub fn disaster_page(vm: &DisasterVm) -> Markup {
    let disaster = &vm.disaster;
    desktop_layout(
        &disaster.name,
        vm.is_moderator,
        html! {
            h1 { (disaster.name) }
            p class="meta" {
                "Severity: " strong { (disaster.severity) }
                " · since " (disaster.start_date)
                @if let Some(end) = &disaster.end_date { " until " (end) }
            }
            @if !disaster.description.is_empty() {
                p { (disaster.description) }
            }
            @if !disaster.affected_areas.is_empty() {
                p { "Affected areas: " (disaster.affected_areas) }
            }

            (card("Problems", need_list(&vm.problems)))
            (card("Services", need_list(&vm.services)))

            @if vm.signed_in {
                (card("Report a need", report_form(vm)))
            }
        },
    )
}
