use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::Error;

pub const HOME: &str = "web:home";
pub const STUDIES_LIST: &str = "web:studies-list";
pub const PARTICIPANT_SIGNUP: &str = "web:participant-signup";
pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";
pub const EXP_STUDY_LIST: &str = "exp:study-list";

lazy_static! {
    static ref ROUTES: HashMap<&'static str, &'static str> = vec![
        (HOME, "/"),
        (STUDIES_LIST, "/studies/"),
        (PARTICIPANT_SIGNUP, "/signup/"),
        (LOGIN, "/login/"),
        (LOGOUT, "/logout/"),
        (EXP_STUDY_LIST, "/exp/studies/"),
    ]
    .into_iter()
    .collect();
}

/// Resolves a route name such as `web:studies-list` to its path.
pub fn reverse(name: &str) -> Result<String, Error> {
    ROUTES
        .get(name)
        .map(|path| path.to_string())
        .ok_or_else(|| Error::NoReverseMatch(name.to_string()))
}

/// Path of the researcher detail page of a study.
pub fn exp_study_detail(study_id: impl std::fmt::Display) -> String {
    format!("/exp/studies/{}/", study_id)
}
