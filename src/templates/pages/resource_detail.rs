use crate::domain::resource::{Provider, ResourceSummary};
use crate::domain::status::ResourceStatus;
use crate::domain::trust::TrustReport;
use crate::templates::components::{card, history_card, timestamp, trust_actions, trust_badges};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct ResourceDetailVm {
    pub summary: ResourceSummary,
    pub trust: TrustReport,
    pub signed_in: bool,
    pub is_moderator: bool,
}

pub fn resource_detail_page(vm: &ResourceDetailVm) -> Markup {
    let r = &vm.summary.resource;
    let next: Vec<ResourceStatus> = ResourceStatus::ALL
        .iter()
        .copied()
        .filter(|s| r.status.can_transition_to(*s))
        .collect();

    desktop_layout(
        &r.description,
        vm.is_moderator,
        html! {
            h1 { (r.description) " " (trust_badges(&vm.trust.state)) }
            p class="meta" {
                (r.status)
                " · for " a href=(format!("/needs/{}", r.need_id)) { (vm.summary.need_title) }
                @if let Some(c) = &vm.summary.category_name { " · " (c) }
                " · offered " (timestamp(r.created_at))
            }
            dl {
                @if !r.quantity.is_empty() { dt { "Quantity" } dd { (r.quantity) } }
                @if let Some(date) = &r.availability_date { dt { "Available from" } dd { (date) } }
                @if !r.contact_info.is_empty() { dt { "Contact" } dd { (r.contact_info) } }
                dt { "Provider" }
                dd {
                    @match (r.provider, &vm.summary.provider_name) {
                        (Some(Provider::Organization(id)), Some(name)) => {
                            a href=(format!("/organizations/{id}")) { (name) }
                        }
                        (_, Some(name)) => (name),
                        (_, None) => "unknown",
                    }
                }
            }

            @if vm.signed_in && !next.is_empty() {
                form method="post" action=(format!("/resources/{}/status", r.id)) {
                    select name="status" {
                        @for s in &next {
                            option value=(s) { (s) }
                        }
                    }
                    button type="submit" { "Update offer" }
                }
            }

            (card("Trust", trust_actions(&vm.trust, vm.signed_in, vm.is_moderator)))
            (history_card(&vm.trust))
        },
    )
}
