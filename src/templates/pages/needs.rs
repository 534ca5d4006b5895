use crate::domain::disaster::{Category, Disaster};
use crate::domain::need::NeedSummary;
use crate::domain::status::CategoryType;
use crate::templates::components::need_list;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct NeedsVm {
    pub needs: Vec<NeedSummary>,
    pub categories: Vec<Category>,
    pub disasters: Vec<Disaster>,
    pub current_type: Option<CategoryType>,
    pub current_category: Option<i64>,
    pub current_disaster: Option<i64>,
    pub is_moderator: bool,
}

pub fn needs_page(vm: &NeedsVm) -> Markup {
    let heading = match vm.current_type {
        Some(CategoryType::Problem) => "Problems",
        Some(CategoryType::Service) => "Services",
        Some(CategoryType::Information) => "Information",
        None => "All open entries",
    };

    desktop_layout(
        heading,
        vm.is_moderator,
        html! {
            h1 { (heading) }

            form method="get" action="/needs" class="filters" {
                @if let Some(t) = vm.current_type {
                    input type="hidden" name="type" value=(t);
                }
                select name="category" {
                    option value="" { "Any category" }
                    @for c in &vm.categories {
                        option value=(c.id) selected[vm.current_category == Some(c.id)] { (c.name) }
                    }
                }
                select name="disaster" {
                    option value="" { "Any disaster" }
                    @for d in &vm.disasters {
                        option value=(d.id) selected[vm.current_disaster == Some(d.id)] { (d.name) }
                    }
                }
                button type="submit" { "Filter" }
            }

            (need_list(&vm.needs))
        },
    )
}
