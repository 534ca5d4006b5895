use crate::domain::resource::Organization;
use crate::domain::trust::TrustReport;
use crate::templates::components::{card, history_card, trust_actions, trust_badges};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn organization_page(
    org: &Organization,
    trust: &TrustReport,
    signed_in: bool,
    is_moderator: bool,
) -> Markup {
    desktop_layout(
        &org.name,
        is_moderator,
        html! {
            h1 { (org.name) " " (trust_badges(&trust.state)) }
            p class="meta" { (org.organization_type) }
            @if !org.description.is_empty() {
                p { (org.description) }
            }
            dl {
                @if !org.contact_person.is_empty() { dt { "Contact" } dd { (org.contact_person) } }
                @if !org.phone.is_empty() { dt { "Phone" } dd { (org.phone) } }
                @if !org.email.is_empty() { dt { "Email" } dd { (org.email) } }
                @if !org.website.is_empty() { dt { "Website" } dd { a href=(org.website) { (org.website) } } }
                @if !org.address.is_empty() { dt { "Address" } dd { (org.address) } }
            }

            (card("Trust", trust_actions(trust, signed_in, is_moderator)))
            (history_card(trust))
        },
    )
}
