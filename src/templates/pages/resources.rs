use crate::domain::disaster::Category;
use crate::domain::resource::{OrganizationType, ProviderKind, ResourceSummary};
use crate::templates::components::{card, resource_row};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct ResourcesVm {
    pub resources: Vec<ResourceSummary>,
    pub categories: Vec<Category>,
    pub current_category: Option<i64>,
    pub current_kind: Option<ProviderKind>,
    pub search: String,
    pub signed_in: bool,
    pub is_moderator: bool,
}

fn organization_form() -> Markup {
    html! {
        form method="post" action="/organizations" {
            input type="text" name="name" placeholder="Organization name" required;
            select name="organization_type" {
                @for t in OrganizationType::ALL {
                    option value=(t) { (t) }
                }
            }
            textarea name="description" placeholder="What do you do?" {}
            input type="text" name="contact_person" placeholder="Contact person";
            input type="text" name="phone" placeholder="Phone";
            input type="email" name="email" placeholder="Email";
            input type="text" name="website" placeholder="Website";
            input type="text" name="address" placeholder="Address";
            button type="submit" { "Register" }
        }
    }
}

pub fn resources_page(vm: &ResourcesVm) -> Markup {
    desktop_layout(
        "Offered resources",
        vm.is_moderator,
        html! {
            h1 { "Offered resources" }

            form method="get" action="/resources" class="filters" {
                select name="category" {
                    option value="" { "Any category" }
                    @for c in &vm.categories {
                        option value=(c.id) selected[vm.current_category == Some(c.id)] { (c.name) }
                    }
                }
                select name="type" {
                    option value="all" { "Any provider" }
                    @for k in ProviderKind::ALL {
                        option value=(k) selected[vm.current_kind == Some(*k)] { (k) }
                    }
                }
                input type="search" name="q" value=(vm.search) placeholder="Search";
                button type="submit" { "Filter" }
            }

            @if vm.resources.is_empty() {
                p class="empty" { "No open offers match." }
            } @else {
                ul class="resource-list" {
                    @for r in &vm.resources { (resource_row(r)) }
                }
            }

            @if vm.signed_in {
                (card("Register an organization", organization_form()))
            }
        },
    )
}
