use crate::domain::disaster::Disaster;
use crate::domain::status::Severity;
use crate::templates::components::card;
use crate::templates::desktop_layout;
use maud::{html, Markup};

fn create_form() -> Markup {
    html! {
        form method="post" action="/disasters" {
            input type="text" name="name" placeholder="Name" required;
            input type="text" name="slug" placeholder="url-slug" required;
            textarea name="description" placeholder="Description" {}
            input type="text" name="affected_areas" placeholder="Affected areas";
            select name="severity" {
                @for s in Severity::ALL {
                    option value=(s) selected[*s == Severity::Medium] { (s) }
                }
            }
            input type="date" name="start_date" required;
            input type="date" name="end_date";
            button type="submit" { "Declare" }
        }
    }
}

pub fn disasters_page(disasters: &[Disaster], is_moderator: bool) -> Markup {
    desktop_layout(
        "Disasters",
        is_moderator,
        html! {
            h1 { "Disasters" }
            @if disasters.is_empty() {
                p class="empty" { "No disasters recorded." }
            }
            ul class="disaster-list" {
                @for d in disasters {
                    li {
                        a href=(format!("/disasters/{}", d.slug)) { (d.name) }
                        " · " (d.severity)
                        " · since " (d.start_date)
                        @if let Some(end) = &d.end_date { " until " (end) }
                        @if d.is_active() { " " span class="badge badge-open" { "ongoing" } }
                        @if is_moderator {
                            form method="post" action=(format!("/disasters/{}/delete", d.slug)) class="inline" {
                                button type="submit" { "Delete" }
                            }
                        }
                    }
                }
            }
            @if is_moderator {
                (card("Declare a disaster", create_form()))
            }
        },
    )
}
