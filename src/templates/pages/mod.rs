pub mod disaster;
pub mod disasters;
pub mod home;
pub mod moderation;
pub mod need_detail;
pub mod needs;
pub mod organization;
pub mod resource_detail;
pub mod resources;

pub use disaster::{disaster_page, DisasterVm};
pub use disasters::disasters_page;
pub use home::{home_page, HomeVm};
pub use moderation::moderation_page;
pub use need_detail::{need_detail_page, NeedDetailVm};
pub use needs::{needs_page, NeedsVm};
pub use organization::organization_page;
pub use resource_detail::{resource_detail_page, ResourceDetailVm};
pub use resources::{resources_page, ResourcesVm};
