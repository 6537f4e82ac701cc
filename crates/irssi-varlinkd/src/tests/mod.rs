//! Test suites for the varlink service.

pub(crate) mod support;
