use crate::domain::report::Report;
use crate::domain::status::ReportStatus;
use crate::templates::components::{target_path, timestamp};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn moderation_page(queue: &[Report]) -> Markup {
    desktop_layout(
        "Moderation",
        true,
        html! {
            h1 { "Moderation queue" }

            @if queue.is_empty() {
                p class="empty" { "No open reports." }
            } @else {
                table {
                    thead {
                        tr {
                            th { "Filed" }
                            th { "Target" }
                            th { "Type" }
                            th { "Description" }
                            th { "Status" }
                            th { "Decision" }
                        }
                    }
                    tbody {
                        @for r in queue {
                            tr {
                                td { (timestamp(r.created_at)) }
                                td { a href=(target_path(r.target)) { (r.target) } }
                                td { (r.report_type) }
                                td { (r.description) }
                                td { (r.status) }
                                td {
                                    form method="post" action=(format!("/reports/{}/review", r.id)) {
                                        select name="status" {
                                            @for s in ReportStatus::ALL.iter().filter(|s| r.status.can_transition_to(**s)) {
                                                option value=(s) { (s) }
                                            }
                                        }
                                        input type="text" name="review_notes" placeholder="Notes";
                                        input type="text" name="action_taken" placeholder="Action taken";
                                        button type="submit" { "Save" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
