use crate::auth::policy::Actor;
use crate::db::comments::{Comment, Photo};
use crate::domain::disaster::Category;
use crate::domain::need::{Field, FieldType, NeedSummary, ProblemDetails, ServiceDetails};
use crate::domain::resource::Resource;
use crate::domain::status::Priority;
use crate::domain::trust::TrustReport;
use crate::templates::components::{card, history_card, status_badge, timestamp, trust_actions, trust_badges};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct NeedDetailVm {
    pub summary: NeedSummary,
    pub problem: Option<ProblemDetails>,
    pub service: Option<ServiceDetails>,
    /// Needs (id, title) that have to be solved first.
    pub blockers: Vec<(i64, String)>,
    pub fields: Vec<Field>,
    pub photos: Vec<Photo>,
    pub comments: Vec<Comment>,
    pub resources: Vec<Resource>,
    pub categories: Vec<Category>,
    pub trust: TrustReport,
    pub actor: Option<Actor>,
    pub is_moderator: bool,
}

fn problem_card(p: &ProblemDetails, blockers: &[(i64, String)]) -> Markup {
    card("Problem", html! {
        dl {
            dt { "Severity" } dd { (p.severity) }
            @if let Some(n) = p.affected_population { dt { "Affected people" } dd { (n) } }
            @if !p.infrastructure_type.is_empty() { dt { "Infrastructure" } dd { (p.infrastructure_type) } }
            @if let Some(cost) = p.estimated_repair_cost { dt { "Repair cost" } dd { (format!("{cost:.0}")) } }
            @if !p.repair_time_estimate.is_empty() { dt { "Repair time" } dd { (p.repair_time_estimate) } }
            @if !p.blocks_access_to.is_empty() { dt { "Blocks access to" } dd { (p.blocks_access_to) } }
        }
        @if !blockers.is_empty() {
            p { "Blocked by:" }
            ul {
                @for (id, title) in blockers {
                    li { a href=(format!("/needs/{id}")) { (title) } }
                }
            }
        }
    })
}

fn service_card(s: &ServiceDetails) -> Markup {
    card("Service", html! {
        dl {
            dt { "Type" } dd { (s.service_type) }
            @if let Some(cap) = s.capacity {
                dt { "Occupancy" }
                dd {
                    (s.current_occupancy) " / " (cap)
                    @if s.is_at_capacity() { " (full)" }
                    @else if let Some(pct) = s.availability_percentage() { " (" (format!("{pct:.0}")) "%)" }
                }
            }
            @if !s.operating_hours.is_empty() { dt { "Hours" } dd { (s.operating_hours) } }
            @if let Some(start) = &s.start_date {
                dt { "Running" }
                dd { (start) @if let Some(end) = &s.end_date { " to " (end) } }
            }
            @if !s.eligibility_criteria.is_empty() { dt { "Eligibility" } dd { (s.eligibility_criteria) } }
            @if !s.requirements.is_empty() { dt { "Requirements" } dd { (s.requirements) } }
        }
    })
}

fn edit_forms(vm: &NeedDetailVm, base: &str) -> Markup {
    let need = &vm.summary.need;
    html! {
        @if !need.status.next_states().is_empty() {
            form method="post" action=(format!("{base}/status")) {
                select name="status" {
                    @for s in need.status.next_states() {
                        option value=(s) { (s) }
                    }
                }
                button type="submit" { "Change status" }
            }
        }
        form method="post" action=(format!("{base}/assign")) {
            input type="number" name="assignee" placeholder="User id (blank to unassign)"
                value=[need.assigned_to];
            button type="submit" { "Assign" }
        }
        details {
            summary { "Edit" }
            form method="post" action=(format!("{base}/edit")) {
                input type="text" name="title" value=(need.title) required;
                textarea name="description" { (need.description) }
                input type="text" name="location" value=(need.location) placeholder="Location";
                input type="text" name="city" value=(need.city) placeholder="City";
                input type="text" name="latitude" value=[need.latitude] placeholder="Latitude";
                input type="text" name="longitude" value=[need.longitude] placeholder="Longitude";
                input type="text" name="contact_person" value=(need.contact_person) placeholder="Contact";
                input type="text" name="contact_phone" value=(need.contact_phone) placeholder="Phone";
                select name="priority" {
                    @for p in Priority::ALL {
                        option value=(p) selected[*p == need.priority] { (p) }
                    }
                }
                select name="category" {
                    option value="" { "No category" }
                    @for c in &vm.categories {
                        option value=(c.id) selected[need.category_id == Some(c.id)] { (c.name) }
                    }
                }
                button type="submit" { "Save" }
            }
        }
        form method="post" action=(format!("{base}/fields")) {
            input type="text" name="key" placeholder="Field" required;
            input type="text" name="value" placeholder="Value";
            select name="field_type" {
                @for t in FieldType::ALL {
                    option value=(t) { (t) }
                }
            }
            label { input type="checkbox" name="replace"; " replace existing" }
            button type="submit" { "Set field" }
        }
        form method="post" action=(format!("{base}/photos")) {
            input type="text" name="image_path" placeholder="Image path" required;
            input type="text" name="caption" placeholder="Caption";
            button type="submit" { "Add photo" }
        }
        @if vm.problem.is_some() {
            form method="post" action=(format!("{base}/dependencies")) {
                input type="number" name="blocked_by" placeholder="Blocking need id" required;
                button type="submit" { "Add blocker" }
            }
        }
    }
}

fn offer_form(base: &str) -> Markup {
    html! {
        form method="post" action=(format!("{base}/resources")) {
            input type="text" name="description" placeholder="What can you offer?" required;
            input type="text" name="quantity" placeholder="Quantity";
            input type="date" name="availability_date";
            input type="text" name="contact_info" placeholder="How to reach you";
            label { input type="checkbox" name="as_self" checked; " offer myself" }
            input type="number" name="organization" placeholder="or organization id";
            button type="submit" { "Offer" }
        }
    }
}

pub fn need_detail_page(vm: &NeedDetailVm) -> Markup {
    let need = &vm.summary.need;
    let base = format!("/needs/{}", need.id);
    let signed_in = vm.actor.is_some();

    desktop_layout(
        &need.title,
        vm.is_moderator,
        html! {
            h1 { (need.title) " " (status_badge(need.status)) (trust_badges(&vm.trust.state)) }
            p class="meta" {
                (vm.summary.disaster_name)
                @if let Some(c) = &vm.summary.category_name { " · " (c) }
                " · priority " (need.priority)
                " · reported " (timestamp(need.created_at))
            }
            p { (need.description) }

            @if !need.location.is_empty() || !need.city.is_empty() {
                p { "Location: " (need.location) @if !need.city.is_empty() { ", " (need.city) } }
            }
            @if !need.contact_person.is_empty() {
                p { "Contact: " (need.contact_person) " " (need.contact_phone) }
            }
            @if let Some(resolved) = need.resolved_at {
                p { "Resolved " (timestamp(resolved)) }
            }

            @if let Some(p) = &vm.problem { (problem_card(p, &vm.blockers)) }
            @if let Some(s) = &vm.service { (service_card(s)) }

            @if !vm.fields.is_empty() {
                (card("Details", html! {
                    dl {
                        @for f in &vm.fields {
                            dt { (f.key) }
                            dd { (f.value) }
                        }
                    }
                }))
            }

            @if !vm.photos.is_empty() {
                (card("Photos", html! {
                    @for photo in &vm.photos {
                        figure {
                            img src=(format!("/media/{}", photo.image_path)) alt=(photo.caption);
                            @if !photo.caption.is_empty() { figcaption { (photo.caption) } }
                        }
                    }
                }))
            }

            (card("Offered resources", html! {
                @if vm.resources.is_empty() {
                    p class="empty" { "No offers yet." }
                }
                ul {
                    @for r in &vm.resources {
                        li {
                            a href=(format!("/resources/{}", r.id)) { (r.description) }
                            " (" (r.quantity) ") · " (r.status)
                        }
                    }
                }
                @if signed_in { (offer_form(&base)) }
            }))

            (card("Trust", trust_actions(&vm.trust, signed_in, vm.is_moderator)))

            @if signed_in {
                (card("Update", edit_forms(vm, &base)))
            }

            (card("Comments", html! {
                @if vm.comments.is_empty() {
                    p class="empty" { "No comments yet." }
                }
                ul {
                    @for c in &vm.comments {
                        li class=[c.is_status_update.then_some("status-update")] {
                            small { (timestamp(c.created_at)) } " " (c.text)
                        }
                    }
                }
                @if signed_in {
                    form method="post" action=(format!("{base}/comments")) {
                        textarea name="text" required {}
                        label { input type="checkbox" name="is_status_update"; " status update" }
                        button type="submit" { "Comment" }
                    }
                }
            }))

            (history_card(&vm.trust))
        },
    )
}
