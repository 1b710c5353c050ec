mod gate;

pub use gate::{
    cooldown_status_handler, passthrough_handler, stamp_submission_handler, survey_page_handler,
    CooldownServiceType,
};
