//! Database access for applications and the transition log

pub mod applications;
pub mod transitions;
