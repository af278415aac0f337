#![allow(dead_code)]

pub const ANA_FIRST_NAME: &str = "Ana";
pub const ANA_LAST_NAME: &str = "Lee";
pub const ANA_EMAIL: &str = "ana@x.com";
pub const ANA_PASS: &str = "secret1";

pub const OMAR_FIRST_NAME: &str = "Omar";
pub const OMAR_LAST_NAME: &str = "Hassan";
pub const OMAR_EMAIL: &str = "omar@example.eg";
pub const OMAR_PASS: &str = "nile-view-42";

pub const PROPERTY_1_ID: &str = "prop-cairo-001";
pub const PROPERTY_2_ID: &str = "prop-alex-014";
pub const PROPERTY_3_ID: &str = "prop-giza-207";
