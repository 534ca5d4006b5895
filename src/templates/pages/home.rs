// templates/pages/home.rs

use crate::domain::disaster::Disaster;
use crate::domain::need::NeedSummary;
use crate::templates::components::{card, need_list};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct HomeVm {
    pub open_problems: i64,
    pub open_services: i64,
    pub recent_problems: Vec<NeedSummary>,
    pub recent_services: Vec<NeedSummary>,
    pub active_disasters: Vec<Disaster>,
    pub is_moderator: bool,
}

pub fn home_page(vm: &HomeVm) -> Markup {
    desktop_layout(
        "Home",
        vm.is_moderator,
        html! {
            h1 { "Relief Board" }

            section class="stats" {
                p { strong { (vm.open_problems) } " open problems" }
                p { strong { (vm.open_services) } " services offered" }
            }

            @if !vm.active_disasters.is_empty() {
                (card("Active disasters", html! {
                    ul {
                        @for d in &vm.active_disasters {
                            li {
                                a href=(format!("/disasters/{}", d.slug)) { (d.name) }
                                " (" (d.severity) ")"
                            }
                        }
                    }
                }))
            }

            (card("Recent problems", need_list(&vm.recent_problems)))
            (card("Recent services", need_list(&vm.recent_services)))
        },
    )
}
